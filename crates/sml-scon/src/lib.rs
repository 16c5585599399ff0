//! [`SCon`], a special value constructor, and the fixed-width numeric model shared by the lexer and
//! the evaluator.

use num_bigint::BigInt;
use num_traits::{Num as _, ToPrimitive as _};
use std::fmt;
use str_util::SmolStr;

/// The greatest int.
pub const MAX_INT: i32 = 1_073_741_823;
/// The least int.
pub const MIN_INT: i32 = -1_073_741_824;
/// The greatest word.
pub const MAX_WORD: u32 = 2_147_483_647;

/// A special constructor, also called a "literal".
#[derive(Debug, Clone, PartialEq)]
pub enum SCon {
  /// An int literal.
  Int(i32),
  /// A real literal.
  Real(f64),
  /// A word literal.
  Word(u32),
  /// A char literal.
  Char(char),
  /// A string literal.
  String(SmolStr),
}

impl fmt::Display for SCon {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SCon::Int(x) => fmt_int(f, i64::from(*x)),
      SCon::Real(x) => fmt_real(f, *x),
      SCon::Word(x) => write!(f, "0w{x}"),
      SCon::Char(c) => {
        f.write_str("#\"")?;
        escape(f, *c)?;
        f.write_str("\"")
      }
      SCon::String(s) => fmt_string(f, s),
    }
  }
}

/// Writes an int with `~` for negation.
///
/// # Errors
///
/// If writing failed.
pub fn fmt_int(f: &mut fmt::Formatter<'_>, x: i64) -> fmt::Result {
  if x < 0 { write!(f, "~{}", x.unsigned_abs()) } else { write!(f, "{x}") }
}

/// Writes a real, always with a decimal point or exponent, and with `~` for negation.
///
/// # Errors
///
/// If writing failed.
pub fn fmt_real(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
  if x.is_nan() {
    return f.write_str("nan");
  }
  if x.is_infinite() {
    return f.write_str(if x < 0.0 { "~inf" } else { "inf" });
  }
  let mut s = x.to_string();
  if !s.contains(['.', 'e']) {
    s.push_str(".0");
  }
  f.write_str(&s.replace('-', "~"))
}

/// Writes a string in SML source syntax, surrounded by quotes.
///
/// # Errors
///
/// If writing failed.
pub fn fmt_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
  f.write_str("\"")?;
  for c in s.chars() {
    escape(f, c)?;
  }
  f.write_str("\"")
}

fn escape(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
  match c {
    '"' => f.write_str("\\\""),
    '\\' => f.write_str("\\\\"),
    '\n' => f.write_str("\\n"),
    '\t' => f.write_str("\\t"),
    '\u{7}' => f.write_str("\\a"),
    '\u{8}' => f.write_str("\\b"),
    '\u{b}' => f.write_str("\\v"),
    '\u{c}' => f.write_str("\\f"),
    '\r' => f.write_str("\\r"),
    c if u32::from(c) < 32 => write!(f, "\\^{}", char::from_u32(u32::from(c) + 64).unwrap_or('?')),
    c if u32::from(c) == 127 => f.write_str("\\127"),
    c if u32::from(c) > 255 => write!(f, "\\u{:04x}", u32::from(c)),
    c => write!(f, "{c}"),
  }
}

/// An error for a numeric literal that does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange;

impl fmt::Display for OutOfRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("integer constant out of range")
  }
}

/// Parses an int from the digits with the given radix, negating if asked.
///
/// # Errors
///
/// If the result is outside [`MIN_INT`, `MAX_INT`] or the digits were not valid for the radix.
pub fn parse_int(digits: &str, radix: u32, neg: bool) -> Result<i32, OutOfRange> {
  let mut n = BigInt::from_str_radix(digits, radix).map_err(|_| OutOfRange)?;
  if neg {
    n = -n;
  }
  let n = n.to_i64().ok_or(OutOfRange)?;
  int_in_range(n).ok_or(OutOfRange)
}

/// Parses a word from the digits with the given radix.
///
/// # Errors
///
/// If the result is greater than [`MAX_WORD`] or the digits were not valid for the radix.
pub fn parse_word(digits: &str, radix: u32) -> Result<u32, OutOfRange> {
  let n = BigInt::from_str_radix(digits, radix).map_err(|_| OutOfRange)?;
  n.to_u64().and_then(word_in_range).ok_or(OutOfRange)
}

/// Returns the int if it is in range.
#[must_use]
pub fn int_in_range(n: i64) -> Option<i32> {
  if (i64::from(MIN_INT)..=i64::from(MAX_INT)).contains(&n) { i32::try_from(n).ok() } else { None }
}

/// Returns the word if it is in range.
#[must_use]
pub fn word_in_range(n: u64) -> Option<u32> {
  if n <= u64::from(MAX_WORD) { u32::try_from(n).ok() } else { None }
}
