//! Loading options from TOML.

use crate::check::{check_err, check_with};
use sml_interp::{ErrorKind, Options};

#[test]
fn defaults() {
  let options = Options::default();
  assert!(options.strict_mode);
  assert!(!options.real_equality);
  assert!(!options.disable_elaboration);
  assert!(!options.disable_evaluation);
  assert_eq!(options.max_frames, 1_000_000);
}

#[test]
fn empty() {
  let options = match Options::from_toml("") {
    Ok(x) => x,
    Err(e) => panic!("{e}"),
  };
  assert!(options.strict_mode);
  assert_eq!(options.max_frames, 1_000_000);
}

#[test]
fn keys() {
  let s = r#"
strict-mode = false
real-equality = true
allow-successor-ml = true
max-frames = 50
"#;
  let options = match Options::from_toml(s) {
    Ok(x) => x,
    Err(e) => panic!("{e}"),
  };
  assert!(!options.strict_mode);
  assert!(options.real_equality);
  assert!(options.allow_successor_ml);
  assert!(!options.allow_long_function_names);
  assert_eq!(options.max_frames, 50);
}

#[test]
fn unknown_key() {
  let Err(e) = Options::from_toml("strict_mode = false") else { panic!("unexpected success") };
  assert!(e.to_string().starts_with("couldn't parse config"), "{e}");
}

#[test]
fn wrong_type() {
  assert!(Options::from_toml("max-frames = \"lots\"").is_err());
}

#[test]
fn options_take_effect() {
  let options = match Options::from_toml("real-equality = true") {
    Ok(x) => x,
    Err(e) => panic!("{e}"),
  };
  check_with(&options, "val b = 1.0 = 1.0");
  check_err(&Options::default(), "val b = 1.0 = 1.0", ErrorKind::Elaboration, "equality");
}
