//! Declaring, raising, and handling exceptions.

use crate::check::{check_raise, check_vals};

#[test]
fn shadowed_is_different() {
  check_raise(
    "exception Blob; fun f x = raise Blob; exception Blob; f 42 handle Blob => false;",
    "Blob",
  );
}

#[test]
fn generation_display() {
  check_vals(
    "exception Blob val a = Blob exception Blob val b = Blob",
    &[("a", "Blob"), ("b", "Blob/1")],
  );
  check_vals("exception Match val m = Match", &[("m", "Match/1")]);
}

#[test]
fn handle_with_arg() {
  check_vals(
    "exception E of int val r = (raise E 5) handle E n => n + 1",
    &[("r", "6")],
  );
  check_vals(r#"val r = (raise Fail "x") handle Fail s => s"#, &[("r", "\"x\"")]);
}

#[test]
fn nested_handlers() {
  check_vals(
    "val r = ((raise Div) handle Overflow => 1) handle Div => 2",
    &[("r", "2")],
  );
  check_vals("val r = (1 div 0) handle _ => 3", &[("r", "3")]);
}

#[test]
fn copy() {
  check_vals("exception A exception B = A val r = (raise B) handle A => 1", &[("r", "1")]);
}

#[test]
fn builtin_raises() {
  check_raise("fun f 1 = 2 val _ = f 3", "Match");
  check_raise("val SOME x = NONE : int option", "Bind");
  check_raise(r#"raise Fail "oops""#, r#"Fail "oops""#);
}

#[test]
fn handle_reraises() {
  check_raise("(raise Div) handle Overflow => 1", "Div");
}
