//! Handling SML string escapes and the like.

use crate::is_whitespace;

/// The result of lexing a string.
#[derive(Debug, Default)]
pub struct Res {
  /// The decoded contents.
  pub value: String,
  /// The first error encountered, as a pair of (index where encountered, kind of error).
  pub error: Option<(usize, Error)>,
}

/// A kind of string error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
  /// The input ended before the string was closed with a matching `"`.
  Unclosed,
  /// There was an invalid escape.
  InvalidEscape,
  /// There was non-whitespace in a string continuation.
  NonWhitespaceInContinuation,
  /// There was an unescaped control character.
  ControlChar,
  /// There was a character outside the allowed range.
  Unicode,
}

/// Lexes the SML string starting at `*idx`, decoding escapes.
///
/// If `allow_unicode` is false, characters (raw or escaped) above 255 are errors.
///
/// # Panics
///
/// If `s.as_bytes()[*idx]` is not a `"` upon entry to this function.
pub fn get(idx: &mut usize, s: &str, allow_unicode: bool) -> Res {
  let bs = s.as_bytes();
  assert_eq!(bs[*idx], b'"');
  *idx += 1;
  let mut res = Res::default();
  if let Err(e) = get_(&mut res, idx, s, allow_unicode) {
    res.error.get_or_insert((*idx, e));
  }
  res
}

fn get_(res: &mut Res, idx: &mut usize, s: &str, allow_unicode: bool) -> Result<(), Error> {
  let bs = s.as_bytes();
  loop {
    let &b = bs.get(*idx).ok_or(Error::Unclosed)?;
    match b {
      b'"' => {
        *idx += 1;
        return Ok(());
      }
      b'\\' => get_escape(res, idx, bs, allow_unicode)?,
      b if b < 32 || b == 127 => return Err(Error::ControlChar),
      _ => {
        let c = s[*idx..].chars().next().ok_or(Error::Unclosed)?;
        if u32::from(c) > 255 && !allow_unicode {
          return Err(Error::Unicode);
        }
        res.value.push(c);
        *idx += c.len_utf8();
      }
    }
  }
}

fn get_escape(res: &mut Res, idx: &mut usize, bs: &[u8], allow_unicode: bool) -> Result<(), Error> {
  *idx += 1;
  let &b = bs.get(*idx).ok_or(Error::Unclosed)?;
  let c = match b {
    b'a' => '\u{7}',
    b'b' => '\u{8}',
    b't' => '\t',
    b'n' => '\n',
    b'v' => '\u{b}',
    b'f' => '\u{c}',
    b'r' => '\r',
    b'"' => '"',
    b'\\' => '\\',
    b'^' => {
      *idx += 1;
      let &c = bs.get(*idx).ok_or(Error::Unclosed)?;
      if !(64..=95).contains(&c) {
        return Err(Error::InvalidEscape);
      }
      char::from(c - 64)
    }
    b'u' => {
      let n = digits(idx, bs, 4, 16)?;
      let c = char::from_u32(n).ok_or(Error::InvalidEscape)?;
      if n > 255 && !allow_unicode {
        return Err(Error::Unicode);
      }
      res.value.push(c);
      *idx += 1;
      return Ok(());
    }
    b if is_whitespace(b) => {
      loop {
        *idx += 1;
        let &b = bs.get(*idx).ok_or(Error::Unclosed)?;
        if b == b'\\' {
          *idx += 1;
          return Ok(());
        }
        if !is_whitespace(b) {
          return Err(Error::NonWhitespaceInContinuation);
        }
      }
    }
    b if b.is_ascii_digit() => {
      *idx -= 1;
      let n = digits(idx, bs, 3, 10)?;
      if n > 255 {
        return Err(Error::InvalidEscape);
      }
      res.value.push(char::from_u32(n).ok_or(Error::InvalidEscape)?);
      *idx += 1;
      return Ok(());
    }
    _ => return Err(Error::InvalidEscape),
  };
  res.value.push(c);
  *idx += 1;
  Ok(())
}

/// reads exactly `n` digits after `*idx`, leaving `*idx` on the last one.
fn digits(idx: &mut usize, bs: &[u8], n: usize, radix: u32) -> Result<u32, Error> {
  let mut ret = 0u32;
  for _ in 0..n {
    *idx += 1;
    let &b = bs.get(*idx).ok_or(Error::Unclosed)?;
    let d = char::from(b).to_digit(radix).ok_or(Error::InvalidEscape)?;
    ret = ret * radix + d;
  }
  Ok(ret)
}
