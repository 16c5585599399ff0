//! Tests that don't fit anywhere else.

use crate::check::{check_err, check_vals};
use sml_interp::{ErrorKind, Options};

#[test]
fn factorial() {
  check_vals("fun fact 0 = 1 | fact n = n * fact (n - 1) val r = fact 10", &[("r", "3628800")]);
}

#[test]
fn closures() {
  check_vals(
    "fun adder n = fn x => x + n val add3 = adder 3 val n = 100 val r = add3 4",
    &[("r", "7")],
  );
}

#[test]
fn mutual_recursion() {
  check_vals(
    r#"
fun even 0 = true | even n = odd (n - 1) and odd 0 = false | odd n = even (n - 1)
val a = even 10
val b = odd 10
"#,
    &[("a", "true"), ("b", "false")],
  );
}

#[test]
fn val_rec() {
  check_vals("val rec f = fn 0 => 1 | n => n * f (n - 1) val r = f 5", &[("r", "120")]);
}

#[test]
fn records() {
  check_vals(
    "val r = {a = 1, b = \"x\"} val a = #a r val t = (1, true) val s = #2 t",
    &[("r", "{ a = 1, b = \"x\" }"), ("a", "1"), ("t", "(1, true)"), ("s", "true")],
  );
  check_vals("val {a, b = c} = {a = 1, b = 2}", &[("a", "1"), ("c", "2")]);
}

#[test]
fn refs() {
  check_vals(
    "val r = ref 0 val _ = r := !r + 5 val a = !r val b = r",
    &[("a", "5"), ("b", "ref 5")],
  );
}

#[test]
fn while_loop() {
  check_vals(
    r#"
val i = ref 0
val sum = ref 0
val _ = while !i < 10 do (i := !i + 1; sum := !sum + !i)
val r = !sum
"#,
    &[("r", "55")],
  );
}

#[test]
fn case_and_if() {
  check_vals(
    r#"
fun f x = case x of 0 => "zero" | 1 => "one" | _ => "many"
val a = f 0
val b = f 7
val c = if 1 < 2 then 3 else 4
"#,
    &[("a", "\"zero\""), ("b", "\"many\""), ("c", "3")],
  );
}

#[test]
fn andalso_orelse() {
  check_vals(
    "val a = true andalso false val b = false orelse true val c = false andalso (1 div 0 = 0)",
    &[("a", "false"), ("b", "true"), ("c", "false")],
  );
}

#[test]
fn as_pat() {
  check_vals("val (x as (a, _)) = (1, 2)", &[("x", "(1, 2)"), ("a", "1")]);
}

#[test]
fn it() {
  check_vals("1 + 2;", &[("it", "3")]);
  check_vals("val it = 4 val x = it", &[("x", "4")]);
}

#[test]
fn constructors() {
  check_vals(
    r#"
datatype t = A | B of int * t
val x = B (1, B (2, A))
fun sum A = 0 | sum (B (n, r)) = n + sum r
val s = sum x
"#,
    &[("x", "B (1, B (2, A))"), ("s", "3")],
  );
  check_vals("val l = 1 :: 2 :: nil", &[("l", "[1, 2]")]);
}

#[test]
fn closures_print_as_fn() {
  check_vals("fun f x = x val g = f", &[("g", "fn")]);
}

#[test]
fn cannot_rebind() {
  let options = Options::default();
  check_err(&options, "val it = 1 exception it", ErrorKind::Elaboration, "cannot re-bind name: it");
  check_err(&options, "fun nil x = x", ErrorKind::Elaboration, "cannot re-bind name: nil");
}
