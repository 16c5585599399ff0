//! `local`, `let`, and `abstype` scoping.

use crate::check::{check, check_vals};

#[test]
fn local_hides() {
  check(
    r#"
local val x = 1 in val y = x end
val z = x
(** + undefined value: x *)
"#,
  );
}

#[test]
fn local_exports() {
  check_vals("local val x = 1 in val y = x end", &[("y", "1")]);
  check_vals(
    "local val a = 10 fun f x = x + a in fun g x = f x * 2 end val r = g 1",
    &[("r", "22")],
  );
}

#[test]
fn local_shadow() {
  check_vals("val x = 5 local val x = 1 in val y = x end val z = x", &[("y", "1"), ("z", "5")]);
}

#[test]
fn nested_local() {
  check_vals(
    "local val a = 1 in local val b = a + 1 in val c = b + 1 end val d = a end",
    &[("c", "3"), ("d", "1")],
  );
}

#[test]
fn let_scope() {
  check_vals(
    "val x = 3 val r = let val x = 2 val y = x * x in y + x end val s = x",
    &[("r", "6"), ("s", "3")],
  );
}

#[test]
fn abstype() {
  check_vals(
    "abstype t = T of int with fun mk n = T n fun get (T n) = n end val r = get (mk 3)",
    &[("r", "3")],
  );
  check(
    r#"
abstype t = T of int with fun mk n = T n end
val _ = T 1
(** + undefined value: T *)
"#,
  );
}
