//! The library modules.

use crate::check::{check_raise, check_vals};
use pretty_assertions::assert_eq;

#[test]
fn available() {
  let got = sml_interp::available_modules();
  assert_eq!(got, ["Int", "Real", "Math", "Char", "String", "List", "Option", "Word"]);
}

#[test]
fn only_some() {
  let options = sml_interp::Options::default();
  let state = match sml_interp::first_state(&["List"], &options) {
    Ok(x) => x,
    Err(e) => panic!("{e}"),
  };
  assert!(state.with_dynamic_str(&[str_util::Name::new("List")], |_| ()).is_ok());
  assert!(state.with_dynamic_str(&[str_util::Name::new("Char")], |_| ()).is_err());
  assert!(state.dynamic_val("map").is_some());
}

#[test]
fn base() {
  check_vals(
    r#"
val a = hd [1, 2]
val b = tl [1, 2]
val c = length [1, 2, 3]
val d = rev [1, 2, 3]
val e = [1] @ [2, 3]
"#,
    &[("a", "1"), ("b", "[2]"), ("c", "3"), ("d", "[3, 2, 1]"), ("e", "[1, 2, 3]")],
  );
  check_vals(
    r#"
val a = (fn x => x + 1) o (fn x => x * 2)
val b = a 5
val c = foldl op+ 0 [1, 2, 3]
val d = foldr op:: [] [1, 2]
"#,
    &[("b", "11"), ("c", "6"), ("d", "[1, 2]")],
  );
  check_vals(
    r#"val a = valOf (SOME 1) val b = getOpt (NONE, 2) val c = not true val d = str #"x""#,
    &[("a", "1"), ("b", "2"), ("c", "false"), ("d", "\"x\"")],
  );
  check_raise("hd []", "Empty");
  check_raise("valOf NONE", "Option");
}

#[test]
fn list() {
  check_vals(
    r#"
val a = List.filter (fn x => x > 1) [1, 2, 3]
val b = List.nth ([4, 5, 6], 1)
val c = List.take ([1, 2, 3], 2)
val d = List.drop ([1, 2, 3], 2)
"#,
    &[("a", "[2, 3]"), ("b", "5"), ("c", "[1, 2]"), ("d", "[3]")],
  );
  check_vals(
    r#"
val a = List.exists (fn x => x = 2) [1, 2]
val b = List.all (fn x => x = 2) [1, 2]
val c = List.tabulate (3, fn i => i * i)
val d = List.last [1, 2, 3]
"#,
    &[("a", "true"), ("b", "false"), ("c", "[0, 1, 4]"), ("d", "3")],
  );
  check_vals(
    r#"
val a = List.find (fn x => x > 5) [1, 2]
val b = List.concat [[1], [], [2, 3]]
val c = List.partition (fn x => x < 2) [1, 2, 3]
"#,
    &[("a", "NONE"), ("b", "[1, 2, 3]"), ("c", "([1], [2, 3])")],
  );
  check_raise("List.nth ([1], 5)", "Subscript");
  check_raise("List.last []", "Empty");
}

#[test]
fn option() {
  check_vals(
    r#"
val a = Option.map (fn x => x + 1) (SOME 1)
val b = Option.join (SOME (SOME 2))
val c = Option.isSome NONE
"#,
    &[("a", "SOME 2"), ("b", "SOME 2"), ("c", "false")],
  );
  check_raise("Option.valOf NONE", "Option");
}

#[test]
fn string() {
  check_vals(
    r#"
val a = String.size "abc"
val b = String.concatWith ", " ["a", "b"]
val c = String.isPrefix "ab" "abc"
val d = String.sub ("abc", 1)
"#,
    &[("a", "3"), ("b", "\"a, b\""), ("c", "true"), ("d", "#\"b\"")],
  );
  check_vals(
    r#"
val a = String.extract ("hello", 1, NONE)
val b = String.compare ("a", "b")
val c = String.translate (fn c => str c ^ str c) "ab"
"#,
    &[("a", "\"ello\""), ("b", "LESS"), ("c", "\"aabb\"")],
  );
}

#[test]
fn char() {
  check_vals(
    r#"
val a = Char.isDigit #"5"
val b = Char.toUpper #"a"
val c = Char.isSpace #"\n"
val d = Char.succ #"a"
"#,
    &[("a", "true"), ("b", "#\"A\""), ("c", "true"), ("d", "#\"b\"")],
  );
  check_raise("Char.succ Char.maxChar", "Chr");
}

#[test]
fn int() {
  check_vals(
    "val a = Int.toString ~5 val b = Int.max (3, 4) val c = Int.compare (1, 1) val d = Int.maxInt",
    &[("a", "\"~5\""), ("b", "4"), ("c", "EQUAL"), ("d", "SOME 1073741823")],
  );
}

#[test]
fn real_and_math() {
  check_vals(
    r#"
val a = Real.fromInt 2
val b = Math.sqrt 16.0
val c = Real.toString 1.5
val d = Real.floor ~1.5
"#,
    &[("a", "2.0"), ("b", "4.0"), ("c", "\"1.5\""), ("d", "~2")],
  );
  check_vals(
    "val a = Math.pow (2.0, 10.0) val b = Real.max (1.0, 2.0)",
    &[("a", "1024.0"), ("b", "2.0")],
  );
}

#[test]
fn word() {
  check_vals(
    r#"
val a = Word.andb (0w12, 0w10)
val b = Word.orb (0w12, 0w10)
val c = Word.xorb (0w12, 0w10)
val d = Word.toInt 0w7
"#,
    &[("a", "0w8"), ("b", "0w14"), ("c", "0w6"), ("d", "7")],
  );
}
