//! The limit on evaluation frames.

use crate::check::{check_err, check_vals, run};
use sml_interp::{ErrorKind, Options};

fn small() -> Options {
  Options { max_frames: 1000, ..Options::default() }
}

#[test]
fn too_deep() {
  check_err(
    &small(),
    "fun sum 0 = 0 | sum n = n + sum (n - 1) val r = sum 5000",
    ErrorKind::Evaluation,
    "exceeded the limit of 1000 stack frames",
  );
}

#[test]
fn tail_calls_fit() {
  let s = "fun loop (0, ac) = ac | loop (n, ac) = loop (n - 1, ac + 1) val r = loop (100000, 0)";
  match run(&small(), s) {
    Ok(x) => assert!(!x.evaluation_errored),
    Err(e) => panic!("unexpected error: {e}"),
  }
}

#[test]
fn deep_with_default_limit() {
  check_vals("fun sum 0 = 0 | sum n = n + sum (n - 1) val r = sum 10000", &[("r", "50005000")]);
}

#[test]
fn mutual_tail_calls() {
  let s = r#"
fun even 0 = true | even n = odd (n - 1)
and odd 0 = false | odd n = even (n - 1)
val r = even 50001
"#;
  match run(&small(), s) {
    Ok(x) => assert!(!x.evaluation_errored),
    Err(e) => panic!("unexpected error: {e}"),
  }
}
