//! Infix declarations, and how they persist between calls.

use crate::check::{check_err, check_vals, first_state};
use pretty_assertions::assert_eq;
use sml_interp::{ErrorKind, Options, interpret};
use sml_state::display_val;

#[test]
fn across_calls() {
  let options = Options::default();
  let mut state = first_state(&options);
  for s in ["infix 6 @@;", "fun a @@ b = a - b;", "10 @@ 3 @@ 2;"] {
    state = match interpret(s, &state, &options) {
      Ok(x) => x.state,
      Err(e) => panic!("{s}: {e}"),
    };
  }
  let Some((val, _)) = state.dynamic_val("it") else { panic!("it not bound") };
  assert_eq!("5", display_val(&val).to_string());
}

#[test]
fn right_assoc() {
  check_vals("infixr 5 ++ fun a ++ b = a - b val x = 10 ++ 3 ++ 2", &[("x", "9")]);
}

#[test]
fn precedence() {
  check_vals("infix 7 ** fun a ** b = a * b val x = 1 + 2 ** 3", &[("x", "7")]);
  check_vals("infix 1 ** fun a ** b = a * b val x = 1 + 2 ** 3", &[("x", "9")]);
}

#[test]
fn nonfix_and_op() {
  check_vals("val a = op + (1, 2) val b = op:: (1, [])", &[("a", "3"), ("b", "[1]")]);
  check_vals("nonfix + val a = + (1, 2)", &[("a", "3")]);
}

#[test]
fn infix_without_op() {
  check_err(&Options::default(), "val f = +", ErrorKind::Parser, "infix");
}

#[test]
fn parenthesized_infix_fun() {
  check_vals("infix ## fun (a ## b) = a * b val x = 3 ## 4", &[("x", "12")]);
  cov_mark::check("parenthesized_infix_fun");
}

#[test]
fn same_fixity_diff_assoc() {
  check_err(
    &Options::default(),
    "infix 5 <<< infixr 5 >>> fun a <<< b = a fun a >>> b = b val x = 1 <<< 2 >>> 3",
    ErrorKind::Parser,
    "associativity",
  );
  cov_mark::check("same_fixity_diff_assoc");
}

#[test]
fn local_fixity() {
  check_vals(
    "val x = let infix 5 // fun a // b = a - b in 7 // 2 end val y = op - (7, 2)",
    &[("x", "5"), ("y", "5")],
  );
}
