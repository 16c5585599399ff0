//! Printed output.

use crate::check::{check_output, run};
use sml_interp::{Options, Warning};

#[test]
fn in_order() {
  check_output(r#"print "hi\n"; print "there";"#, &["hi\n", "there"]);
}

#[test]
fn from_functions() {
  check_output(r#"val _ = app print ["a", "b", "c"]"#, &["a", "b", "c"]);
  check_output(
    r#"fun count 0 = () | count n = (print (Int.toString n); count (n - 1)) val _ = count 3"#,
    &["3", "2", "1"],
  );
}

#[test]
fn none() {
  check_output("val x = 1", &[]);
}

#[test]
fn before_raise() {
  let got = match run(&Options::default(), r#"print "a"; raise Div; print "b";"#) {
    Ok(x) => x,
    Err(e) => panic!("unexpected error: {e}"),
  };
  assert!(got.evaluation_errored);
  let out: Vec<_> = got
    .warnings
    .iter()
    .filter_map(|w| match w {
      Warning::Output(s) => Some(s.as_str()),
      Warning::Statics(_) => None,
    })
    .collect();
  assert_eq!(out, ["a"]);
}

#[test]
fn after_warnings() {
  let got = match run(&Options::default(), r#"fun f 1 = 2 val _ = print "x""#) {
    Ok(x) => x,
    Err(e) => panic!("unexpected error: {e}"),
  };
  assert!(matches!(got.warnings.as_slice(), [Warning::Statics(_), Warning::Output(_)]));
}
