//! What kind of error each stage reports.

use crate::check::{check_err, check_with, first_state};
use sml_interp::{ErrorKind, Options};

#[test]
fn incomplete() {
  let options = Options::default();
  check_err(&options, "val x =", ErrorKind::Incomplete, "end of input");
  check_err(&options, "val s = \"abc", ErrorKind::Incomplete, "unclosed string");
  check_err(&options, "(* hi", ErrorKind::Incomplete, "unclosed comment");
  check_err(&options, "fun f x = let val y = x in", ErrorKind::Incomplete, "end of input");
}

#[test]
fn lexer() {
  check_err(&Options::default(), "val x = 1073741824", ErrorKind::Lexer, "out of range");
}

#[test]
fn parser() {
  let options = Options::default();
  check_err(&options, "val = 3", ErrorKind::Parser, "expected");
  check_err(&options, "fun f 0 = 1 | g x = 2", ErrorKind::Parser, "function clause for `f`");
  check_err(&options, "fun f 0 = 1 | f x y = 2", ErrorKind::Parser, "expected 1 pattern");
}

#[test]
fn elaboration() {
  let options = Options::default();
  check_err(&options, "val x = 1 + true", ErrorKind::Elaboration, "incompatible types");
  check_err(&options, "val x = {a = 1, a = 2}", ErrorKind::Elaboration, "duplicate label");
  check_err(&options, "val x = nope", ErrorKind::Elaboration, "undefined value: nope");
  check_err(&options, "datatype t = nil", ErrorKind::Elaboration, "cannot re-bind name: nil");
}

#[test]
fn not_implemented() {
  check_err(
    &Options::default(),
    "signature S = sig type t end where type t = int",
    ErrorKind::FeatureNotImplemented,
    "where",
  );
}

#[test]
fn disabled() {
  let options = Options::default();
  check_err(
    &options,
    "datatype t = A of u withtype u = int",
    ErrorKind::FeatureDisabled,
    "withtype",
  );
  check_err(&options, "val _ = if true then ()", ErrorKind::FeatureDisabled, "if");
  check_err(&options, "fun A.f x = x", ErrorKind::FeatureDisabled, "long function names");
}

#[test]
fn successor_ml_allowed() {
  let options = Options { allow_successor_ml: true, ..Options::default() };
  check_with(
    &options,
    r#"
fun f x = case x of | 1 => 2 | _ => 3
val _ = if f 1 = 2 then print "" 
"#,
  );
}

#[test]
fn evaluation_rebind_without_elaboration() {
  let options = Options { disable_elaboration: true, ..Options::default() };
  check_err(&options, "datatype t = nil", ErrorKind::Evaluation, "cannot re-bind name: nil");
}

#[test]
fn internal_unknown_module() {
  match sml_interp::first_state(&["Nope"], &Options::default()) {
    Ok(_) => panic!("loaded a module that does not exist"),
    Err(e) => assert_eq!(e.kind(), ErrorKind::Internal),
  }
}

#[test]
fn state_unchanged_on_error() {
  let options = Options::default();
  let s0 = first_state(&options);
  let s1 = match sml_interp::interpret("val x = 1", &s0, &options) {
    Ok(x) => x.state,
    Err(e) => panic!("unexpected error: {e}"),
  };
  let e = match sml_interp::interpret("val y = 2 val z = true + 1", &s1, &options) {
    Ok(_) => panic!("unexpected success"),
    Err(e) => e,
  };
  assert_eq!(e.kind(), ErrorKind::Elaboration);
  assert!(s1.dynamic_val("x").is_some());
  assert!(s1.dynamic_val("y").is_none());
  assert!(s1.static_val("y").is_none());
  assert!(s0.dynamic_val("x").is_none());
}
