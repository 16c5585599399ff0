//! Structures, signatures, and functors.

use crate::check::{check, check_err, check_vals};
use sml_interp::{ErrorKind, Options};

#[test]
fn structure() {
  check_vals("structure S = struct val x = 1 fun f y = y + x end val r = S.f 2", &[("r", "3")]);
}

#[test]
fn nested() {
  check_vals(
    "structure A = struct structure B = struct val x = 5 end end val r = A.B.x",
    &[("r", "5")],
  );
}

#[test]
fn open() {
  check_vals("structure S = struct val x = 7 end open S val r = x", &[("r", "7")]);
}

#[test]
fn datatype_and_exn() {
  check_vals(
    r#"
structure S = struct
  datatype t = A | B of int
  exception E
end
val r = S.B 3
val s = (raise S.E) handle S.E => 1
"#,
    &[("r", "B 3"), ("s", "1")],
  );
}

#[test]
fn transparent_filters() {
  check_vals(
    r#"
signature SIG = sig val x : int end
structure S : SIG = struct
  val x = 1
  val y = 2
end
val r = S.x
"#,
    &[("r", "1")],
  );
  check(
    r#"
structure S : sig val x : int end = struct val x = 1 val y = 2 end
val r = S.y
(** + undefined value: S.y *)
"#,
  );
}

#[test]
fn filters_without_elaboration() {
  let options = Options { disable_elaboration: true, ..Options::default() };
  check_err(
    &options,
    "structure S : sig val x : int end = struct val x = 1 val y = 2 end val r = S.y",
    ErrorKind::Evaluation,
    "undefined",
  );
}

#[test]
fn opaque() {
  let sig = "sig type t val mk : int -> t val get : t -> int end";
  let body = "struct type t = int fun mk x = x fun get x = x end";
  check_vals(&format!("structure S :> {sig} = {body} val r = S.get (S.mk 4)"), &[("r", "4")]);
  check_err(
    &Options::default(),
    &format!("structure S :> {sig} = {body} val bad = S.mk 1 + 1"),
    ErrorKind::Elaboration,
    "incompatible types",
  );
}

#[test]
fn missing() {
  check_err(
    &Options::default(),
    "structure S : sig val z : int end = struct end",
    ErrorKind::Elaboration,
    "missing value required by signature: z",
  );
}

#[test]
fn functor() {
  check_vals(
    r#"
functor F (X : sig val n : int end) = struct val m = X.n * 2 end
structure A = F (struct val n = 21 end)
val r = A.m
"#,
    &[("r", "42")],
  );
}

#[test]
fn functor_twice() {
  check_vals(
    r#"
functor Counter (X : sig val start : int end) = struct
  val c = ref X.start
  fun next () = (c := !c + 1; !c)
end
structure A = Counter (struct val start = 0 end)
structure B = Counter (struct val start = 10 end)
val a = (A.next (); A.next ())
val b = B.next ()
"#,
    &[("a", "2"), ("b", "11")],
  );
}

#[test]
fn undefined_structure() {
  let options = Options::default();
  check_err(&options, "val x = Nope.x", ErrorKind::Elaboration, "undefined structure: Nope");
}

#[test]
fn sharing() {
  check_err(
    &Options::default(),
    "signature S = sig type t type u sharing type t = u end",
    ErrorKind::FeatureNotImplemented,
    "sharing",
  );
}
