//! Numbers and the builtin operators on them.

use crate::check::{check_raise, check_tys, check_vals};

#[test]
fn int_boundary() {
  check_vals(
    "val x = 1073741823 val y = ~1073741824",
    &[("x", "1073741823"), ("y", "~1073741824")],
  );
  check_raise("1073741823 + 1", "Overflow");
  check_raise("~1073741824 - 1", "Overflow");
  check_raise("~ ~1073741824", "Overflow");
  check_raise("65536 * 65536", "Overflow");
}

#[test]
fn div_mod() {
  check_vals(
    "val a = 7 div 2 val b = 7 div ~2 val c = 7 mod ~2 val d = ~7 mod 2",
    &[("a", "3"), ("b", "~4"), ("c", "~1"), ("d", "1")],
  );
  check_raise("1 div 0", "Div");
  check_raise("1 mod 0", "Div");
}

#[test]
fn real() {
  check_vals(
    "val a = 1.0 / 2.0 val b = 3.0 * 1.0 val c = ~2.5 + 1.0",
    &[("a", "0.5"), ("b", "3.0"), ("c", "~1.5")],
  );
  check_vals(
    "val a = floor 2.5 val b = ceil 2.1 val c = round 2.5 val d = round 3.5 val e = trunc ~2.7",
    &[("a", "2"), ("b", "3"), ("c", "2"), ("d", "4"), ("e", "~2")],
  );
  check_vals("val a = real 3 val b = abs ~2.0", &[("a", "3.0"), ("b", "2.0")]);
}

#[test]
fn word() {
  check_vals(
    "val a = 0w3 + 0w4 val b = Word.fromInt ~1 val c = Word.toString 0w255",
    &[("a", "0w7"), ("b", "0w2147483647"), ("c", "\"FF\"")],
  );
  check_raise("0w2147483647 + 0w1", "Overflow");
  check_raise("0w1 - 0w2", "Overflow");
  check_vals(
    "val a = Word.<< (0w1, 0w3) val b = Word.>> (0w16, 0w2)",
    &[("a", "0w8"), ("b", "0w4")],
  );
}

#[test]
fn compare() {
  check_vals(
    r#"val a = 1 < 2 val b = "b" <= "a" val c = #"a" > #"A" val d = 2.0 >= 2.0"#,
    &[("a", "true"), ("b", "false"), ("c", "true"), ("d", "true")],
  );
}

#[test]
fn overload_default() {
  check_tys("fun f (a, b) = a + b", &[("f", "int * int -> int")]);
  cov_mark::check("default_overload");
}

#[test]
fn overload_resolved() {
  check_tys(
    "fun f (a, b) = a + b + 1.0 fun g (a, b) = a * b : word",
    &[("f", "real * real -> real"), ("g", "word * word -> word")],
  );
}

#[test]
fn chars_and_strings() {
  check_vals(
    r#"val a = ord #"a" val b = chr 98 val c = size "hello" val d = "ab" ^ "cd""#,
    &[("a", "97"), ("b", "#\"b\""), ("c", "5"), ("d", "\"abcd\"")],
  );
  check_vals(
    r#"val a = explode "hi" val b = implode [#"o", #"k"] val c = substring ("hello", 1, 3)"#,
    &[("a", "[#\"h\", #\"i\"]"), ("b", "\"ok\""), ("c", "\"ell\"")],
  );
  check_raise("chr 256", "Chr");
  check_raise(r#"substring ("abc", 2, 5)"#, "Subscript");
  check_raise(r#"String.sub ("abc", 3)"#, "Subscript");
}
