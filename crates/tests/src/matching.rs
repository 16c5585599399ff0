//! Exhaustiveness and redundancy of patterns.

use crate::check::{check, check_err};
use sml_interp::{ErrorKind, Options};

#[test]
fn not_exhaustive() {
  check(
    r#"
fun f 1 = 2 | f 2 = 10
(** + exact: Pattern matching is not exhaustive. *)
"#,
  );
}

#[test]
fn exhaustive_with_var() {
  check(
    r#"
fun f 1 = 2 | f x = 10
"#,
  );
}

#[test]
fn datatype_cons() {
  check(
    r#"
datatype t = A | B | C
fun f A = 1 | f B = 2
(** + not exhaustive *)
fun g A = 1 | g B = 2 | g C = 3
"#,
  );
}

#[test]
fn lists() {
  check(
    r#"
fun len [] = 0 | len (_ :: xs) = 1 + len xs
fun hd' (x :: _) = x
(** + not exhaustive *)
fun f (SOME (x :: _)) = x | f (SOME []) = 0 | f NONE = 1
"#,
  );
}

#[test]
fn unused() {
  check(
    r#"
fun f x = 1 | f 2 = 3
(** + exact: Rules after "x" unused in pattern matching. *)
"#,
  );
}

#[test]
fn duplicate() {
  check(
    r#"
fun f 1 = 1 | f 1 = 2 | f _ = 3
(** + Duplicate rule *)
"#,
  );
}

#[test]
fn binding() {
  check(
    r#"
val SOME x = SOME 1
(** + exact: Binding is not exhaustive. *)
val (a, b) = (1, 2)
"#,
  );
}

#[test]
fn handle_not_checked() {
  check(
    r#"
val r = (1 div 0) handle Div => 0
"#,
  );
}

#[test]
fn records() {
  check(
    r#"
fun f {a, b = true} = a | f {a, b = false} = a + 1
fun g {a, b = _} = a + 1
"#,
  );
}

#[test]
fn non_linear() {
  check(
    r#"
fun f (x, x) = x
(** + duplicate variable in pattern: x *)
"#,
  );
  cov_mark::check("non_linear_pat");
}

#[test]
fn real_pattern() {
  check_err(
    &Options::default(),
    "fun f 1.0 = 1 | f _ = 2",
    ErrorKind::Elaboration,
    "real literal used as a pattern",
  );
}
