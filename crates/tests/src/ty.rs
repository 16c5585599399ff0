//! Type inference.

use crate::check::{check, check_err, check_tys, check_with};
use sml_interp::{ErrorKind, Options};

#[test]
fn polymorphic() {
  check_tys(
    "fun id x = x fun eq x = x = x val l = [1, 2] fun pair x y = (x, y)",
    &[
      ("id", "'a -> 'a"),
      ("eq", "''a -> bool"),
      ("l", "int list"),
      ("pair", "'a -> 'b -> 'a * 'b"),
    ],
  );
}

#[test]
fn higher_order() {
  check_tys(
    "fun map' f [] = [] | map' f (x :: xs) = f x :: map' f xs",
    &[("map'", "('a -> 'b) -> 'a list -> 'b list")],
  );
}

#[test]
fn let_polymorphism() {
  check_tys("val p = let fun id x = x in (id 1, id true) end", &[("p", "int * bool")]);
}

#[test]
fn lambda_not_generalized() {
  check_err(
    &Options::default(),
    "val p = (fn id => (id 1, id true)) (fn x => x)",
    ErrorKind::Elaboration,
    "incompatible types",
  );
}

#[test]
fn datatype() {
  check_tys(
    "datatype 'a tree = Leaf | Node of 'a tree * 'a * 'a tree val t = Node (Leaf, 1, Leaf)",
    &[("t", "int tree"), ("Node", "'a tree * 'a * 'a tree -> 'a tree")],
  );
}

#[test]
fn alias() {
  check_tys("type point = int * int val p : point = (1, 2) val x = #1 p", &[("x", "int")]);
}

#[test]
fn records() {
  check_tys("val r = {a = 1, b = true} val x = #b r", &[("x", "bool")]);
}

#[test]
fn equality() {
  check(
    r#"
val _ = (fn x => x) = (fn x => x)
(** + not an equality type *)
"#,
  );
  let options = Options::default();
  check_err(&options, "fun f x = x = 1.0", ErrorKind::Elaboration, "not an equality type");
  check_with(&Options { real_equality: true, ..Options::default() }, "fun f x = x = 1.0");
}

#[test]
fn value_restriction() {
  check(
    r#"
val r = ref []
(** + not generalized *)
"#,
  );
  cov_mark::check("dummy_tys");
}

#[test]
fn circularity() {
  check_err(&Options::default(), "fun f x = f", ErrorKind::Elaboration, "circular type");
  cov_mark::check("circularity");
}

#[test]
fn annotations() {
  check_tys(
    "fun f (x : real) = x val g = fn (s : string) => s",
    &[("f", "real -> real"), ("g", "string -> string")],
  );
  let options = Options::default();
  check_err(&options, "val x : int = true", ErrorKind::Elaboration, "incompatible types");
}

#[test]
fn exception_ty_var() {
  let options = Options::default();
  check_err(&options, "exception E of 'a", ErrorKind::Elaboration, "Unguarded type variable");
  check_err(&options, "exception E of 'a list", ErrorKind::Elaboration, "Unguarded type variable");
  check_tys("exception E of int list val e = E [1]", &[("E", "int list -> exn"), ("e", "exn")]);
}
