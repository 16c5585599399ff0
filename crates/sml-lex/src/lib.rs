//! Lexing a string into tokens.

mod token;

pub use token::{KEYWORDS, LongIdent, MODULE_KEYWORDS, Token, TokenKind, keyword};

use diagnostic::{Code, Severity};
use lex_util::{advance_while, block_comment, is_whitespace, string};
use std::fmt;
use str_util::{Name, SmolStr};

/// Options for lexing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Options {
  /// Allow non-ASCII letters in identifiers and characters above 255 in strings.
  pub allow_unicode: bool,
  /// Emit comments as tokens instead of skipping them.
  pub allow_comment_token: bool,
}

/// An error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// A character that may not appear outside of strings and comments.
  InvalidSource(char),
  /// A comment with no matching `*)` before the end of the input.
  UnclosedComment,
  /// A string or char with no closing `"` before the end of the input.
  UnclosedString,
  /// A lone `'`.
  IncompleteTyVar,
  /// A char constant whose length was not 1.
  WrongLenCharLit,
  /// A numeric constant that does not fit.
  OutOfRange,
  /// A malformed escape in a string.
  InvalidEscape,
  /// Non-whitespace in a `\ ... \` gap.
  NonWhitespaceInContinuation,
  /// An unescaped control character in a string.
  ControlChar,
  /// A character that needs `allow_unicode`.
  Unicode,
  /// A malformed qualified identifier.
  InvalidLongIdent,
}

/// An error encountered when lexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
  pos: usize,
  kind: ErrorKind,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      ErrorKind::InvalidSource(c) => write!(f, "invalid source character: {c:?}"),
      ErrorKind::UnclosedComment => f.write_str("unclosed comment"),
      ErrorKind::UnclosedString => f.write_str("unclosed string literal"),
      ErrorKind::IncompleteTyVar => f.write_str("incomplete type variable"),
      ErrorKind::WrongLenCharLit => f.write_str("character literal must have length 1"),
      ErrorKind::OutOfRange => f.write_str("numeric constant out of range"),
      ErrorKind::InvalidEscape => f.write_str("invalid string escape"),
      ErrorKind::NonWhitespaceInContinuation => {
        f.write_str("non-whitespace in string continuation")
      }
      ErrorKind::ControlChar => f.write_str("unescaped control character in string"),
      ErrorKind::Unicode => f.write_str("unicode characters are not allowed here"),
      ErrorKind::InvalidLongIdent => f.write_str("invalid qualified identifier"),
    }
  }
}

impl Error {
  /// Returns the byte offset for this.
  #[must_use]
  pub fn pos(&self) -> usize {
    self.pos
  }

  /// Returns the kind for this.
  #[must_use]
  pub fn kind(&self) -> ErrorKind {
    self.kind
  }

  /// Returns whether more input could make this go away.
  #[must_use]
  pub fn is_incomplete(&self) -> bool {
    matches!(self.kind, ErrorKind::UnclosedComment | ErrorKind::UnclosedString)
  }

  /// Returns the code for this.
  #[must_use]
  pub fn code(&self) -> Code {
    match self.kind {
      ErrorKind::InvalidSource(_) => Code::n(2001),
      ErrorKind::UnclosedComment => Code::n(2002),
      ErrorKind::IncompleteTyVar => Code::n(2003),
      ErrorKind::UnclosedString => Code::n(2004),
      ErrorKind::WrongLenCharLit => Code::n(2006),
      ErrorKind::OutOfRange => Code::n(2007),
      ErrorKind::InvalidEscape => Code::n(2008),
      ErrorKind::NonWhitespaceInContinuation => Code::n(2009),
      ErrorKind::ControlChar => Code::n(2010),
      ErrorKind::Unicode => Code::n(2011),
      ErrorKind::InvalidLongIdent => Code::n(2012),
    }
  }

  /// Returns the severity for this.
  #[must_use]
  pub fn severity(&self) -> Severity {
    Severity::Error
  }
}

/// Lexes the whole input.
///
/// # Errors
///
/// On the first invalid or incomplete token.
pub fn get(s: &str, options: &Options) -> Result<Vec<Token>, Error> {
  let mut st = St { s, bs: s.as_bytes(), i: 0, options: *options };
  let mut tokens = Vec::new();
  loop {
    advance_while(&mut st.i, st.bs, is_whitespace);
    if st.i >= st.bs.len() {
      break;
    }
    let start = st.i;
    match block_comment::get(&mut st.i, st.bs) {
      Ok(None) => {}
      Ok(Some(block_comment::Consumed)) => {
        if st.options.allow_comment_token {
          tokens.push(st.token(start, TokenKind::Comment));
        }
        continue;
      }
      Err(block_comment::UnclosedError) => return Err(st.err(start, ErrorKind::UnclosedComment)),
    }
    let kind = go(&mut st)?;
    assert!(start < st.i, "lexer failed to advance");
    let tok = st.token(start, kind);
    let tok = long_ident(&mut st, tok)?;
    tokens.push(tok);
  }
  Ok(tokens)
}

/// The context.
struct St<'a> {
  s: &'a str,
  bs: &'a [u8],
  i: usize,
  options: Options,
}

impl St<'_> {
  fn token(&self, start: usize, kind: TokenKind) -> Token {
    Token { kind, pos: start, text: SmolStr::new(&self.s[start..self.i]) }
  }

  fn err(&self, pos: usize, kind: ErrorKind) -> Error {
    Error { pos, kind }
  }

  fn cur_char(&self) -> Option<char> {
    self.s.get(self.i..).and_then(|s| s.chars().next())
  }

  /// returns the length in bytes of the alphanumeric-class char at `i`, if it is one.
  fn alpha_num_len(&self, i: usize) -> Option<usize> {
    let &b = self.bs.get(i)?;
    if b.is_ascii_alphanumeric() || b == b'\'' || b == b'_' {
      return Some(1);
    }
    if b.is_ascii() || !self.options.allow_unicode {
      return None;
    }
    let c = self.s.get(i..)?.chars().next()?;
    c.is_alphabetic().then(|| c.len_utf8())
  }

  fn advance_alpha_num(&mut self) {
    while let Some(n) = self.alpha_num_len(self.i) {
      self.i += n;
    }
  }

  fn is_letter(&self, i: usize) -> bool {
    match self.bs.get(i) {
      Some(b) if b.is_ascii() => b.is_ascii_alphabetic(),
      Some(_) => {
        self.options.allow_unicode
          && self.s.get(i..).and_then(|s| s.chars().next()).is_some_and(char::is_alphabetic)
      }
      None => false,
    }
  }
}

/// lexes one token that is not a comment, starting at a non-whitespace byte.
fn go(st: &mut St<'_>) -> Result<TokenKind, Error> {
  let start = st.i;
  let b = st.bs[st.i];
  // numbers. note `~3` is one token but `~ 3` is two.
  if b.is_ascii_digit() || (b == b'~' && st.bs.get(st.i + 1).is_some_and(u8::is_ascii_digit)) {
    return number(st);
  }
  // strings and chars
  if b == b'"' {
    return Ok(TokenKind::String(SmolStr::new(string(st)?)));
  }
  if b == b'#' && st.bs.get(st.i + 1) == Some(&b'"') {
    st.i += 1;
    let s = string(st)?;
    let mut cs = s.chars();
    return match (cs.next(), cs.next()) {
      (Some(c), None) => Ok(TokenKind::Char(c)),
      _ => Err(st.err(start, ErrorKind::WrongLenCharLit)),
    };
  }
  // type variables
  if b == b'\'' {
    st.i += 1;
    let eq = st.bs.get(st.i) == Some(&b'\'');
    st.advance_alpha_num();
    if st.i == start + 1 || (eq && st.i == start + 2) {
      return Err(st.err(start, ErrorKind::IncompleteTyVar));
    }
    let name = Name::new(&st.s[start..st.i]);
    return Ok(if eq { TokenKind::EqTyVar(name) } else { TokenKind::TyVar(name) });
  }
  // alphanumeric identifiers and keywords
  if st.is_letter(st.i) {
    st.advance_alpha_num();
    let text = &st.s[start..st.i];
    return Ok(match keyword(text) {
      Some(k) => TokenKind::Keyword(k),
      None => TokenKind::AlnumIdent(Name::new(text)),
    });
  }
  // symbolic identifiers and keywords
  if is_symbolic(b) {
    advance_while(&mut st.i, st.bs, is_symbolic);
    return Ok(symbolic_kind(&st.s[start..st.i]));
  }
  // punctuation
  if st.bs[st.i..].starts_with(b"...") {
    st.i += 3;
    return Ok(TokenKind::Keyword("..."));
  }
  if let Some(k) = matches!(b, b'(' | b')' | b'[' | b']' | b'{' | b'}' | b',' | b';' | b'_')
    .then(|| keyword(&st.s[st.i..=st.i]))
    .flatten()
  {
    st.i += 1;
    return Ok(TokenKind::Keyword(k));
  }
  let c = st.cur_char().unwrap_or(char::REPLACEMENT_CHARACTER);
  Err(st.err(start, ErrorKind::InvalidSource(c)))
}

fn symbolic_kind(text: &str) -> TokenKind {
  match text {
    "=" => TokenKind::Equals,
    "*" => TokenKind::Star,
    _ => match keyword(text) {
      Some(k) => TokenKind::Keyword(k),
      None => TokenKind::Ident(Name::new(text)),
    },
  }
}

fn string(st: &mut St<'_>) -> Result<String, Error> {
  let res = string::get(&mut st.i, st.s, st.options.allow_unicode);
  match res.error {
    None => Ok(res.value),
    Some((pos, e)) => {
      let kind = match e {
        string::Error::Unclosed => ErrorKind::UnclosedString,
        string::Error::InvalidEscape => ErrorKind::InvalidEscape,
        string::Error::NonWhitespaceInContinuation => ErrorKind::NonWhitespaceInContinuation,
        string::Error::ControlChar => ErrorKind::ControlChar,
        string::Error::Unicode => ErrorKind::Unicode,
      };
      Err(st.err(pos, kind))
    }
  }
}

fn number(st: &mut St<'_>) -> Result<TokenKind, Error> {
  let start = st.i;
  let neg = st.bs[st.i] == b'~';
  if neg {
    st.i += 1;
  }
  let after_sign = st.i;
  let at = |st: &St<'_>, i: usize| st.bs.get(i).copied();
  if at(st, st.i) == Some(b'0') {
    match (at(st, st.i + 1), at(st, st.i + 2), at(st, st.i + 3)) {
      (Some(b'w'), Some(b'x'), Some(h)) if h.is_ascii_hexdigit() && !neg => {
        st.i += 3;
        return word(st, start, 16);
      }
      (Some(b'w'), Some(d), _) if d.is_ascii_digit() && !neg => {
        st.i += 2;
        return word(st, start, 10);
      }
      (Some(b'x'), Some(h), _) if h.is_ascii_hexdigit() => {
        st.i += 2;
        let s = st.i;
        advance_while(&mut st.i, st.bs, |b| b.is_ascii_hexdigit());
        let n = sml_scon::parse_int(&st.s[s..st.i], 16, neg);
        return n.map(TokenKind::Int).map_err(|_| st.err(start, ErrorKind::OutOfRange));
      }
      (Some(b'w'), _, _) if neg => cov_mark::hit("neg_word"),
      _ => {}
    }
  }
  advance_while(&mut st.i, st.bs, |b| b.is_ascii_digit());
  let int_end = st.i;
  let mut is_real = false;
  if at(st, st.i) == Some(b'.') && at(st, st.i + 1).is_some_and(|b| b.is_ascii_digit()) {
    is_real = true;
    st.i += 1;
    advance_while(&mut st.i, st.bs, |b| b.is_ascii_digit());
  }
  if let Some(b'e' | b'E') = at(st, st.i) {
    let exp_start = if at(st, st.i + 1) == Some(b'~') { st.i + 2 } else { st.i + 1 };
    if at(st, exp_start).is_some_and(|b| b.is_ascii_digit()) {
      is_real = true;
      st.i = exp_start;
      advance_while(&mut st.i, st.bs, |b| b.is_ascii_digit());
    }
  }
  if is_real {
    let text = st.s[start..st.i].replace('~', "-");
    return text
      .parse::<f64>()
      .map(TokenKind::Real)
      .map_err(|_| st.err(start, ErrorKind::OutOfRange));
  }
  let digits = &st.s[after_sign..int_end];
  let n = sml_scon::parse_int(digits, 10, neg).map_err(|_| st.err(start, ErrorKind::OutOfRange))?;
  if !neg && !digits.starts_with('0') {
    Ok(TokenKind::Numeric(n))
  } else {
    Ok(TokenKind::Int(n))
  }
}

fn word(st: &mut St<'_>, start: usize, radix: u32) -> Result<TokenKind, Error> {
  let s = st.i;
  advance_while(&mut st.i, st.bs, |b| char::from(b).is_digit(radix));
  sml_scon::parse_word(&st.s[s..st.i], radix)
    .map(TokenKind::Word)
    .map_err(|_| st.err(start, ErrorKind::OutOfRange))
}

/// combines `tok` with any `.`-separated parts that follow it into a long identifier.
fn long_ident(st: &mut St<'_>, tok: Token) -> Result<Token, Error> {
  if !matches!(tok.kind, TokenKind::AlnumIdent(_)) || st.bs.get(st.i) != Some(&b'.') {
    return Ok(tok);
  }
  if st.bs[st.i..].starts_with(b"...") {
    return Ok(tok);
  }
  cov_mark::hit("long_ident");
  let start = tok.pos;
  let mut qualifiers = vec![tok];
  loop {
    // skip the dot.
    st.i += 1;
    let seg_start = st.i;
    let seg = if st.is_letter(st.i) {
      st.advance_alpha_num();
      let text = &st.s[seg_start..st.i];
      if keyword(text).is_some() {
        return Err(st.err(start, ErrorKind::InvalidLongIdent));
      }
      st.token(seg_start, TokenKind::AlnumIdent(Name::new(text)))
    } else if st.bs.get(st.i).copied().is_some_and(is_symbolic) {
      advance_while(&mut st.i, st.bs, is_symbolic);
      let kind = symbolic_kind(&st.s[seg_start..st.i]);
      if !matches!(kind, TokenKind::Ident(_) | TokenKind::Star) {
        return Err(st.err(start, ErrorKind::InvalidLongIdent));
      }
      let id = st.token(seg_start, kind);
      return Ok(finish_long(st, start, qualifiers, id));
    } else {
      return Err(st.err(start, ErrorKind::InvalidLongIdent));
    };
    if st.bs.get(st.i) == Some(&b'.') && !st.bs[st.i..].starts_with(b"...") {
      qualifiers.push(seg);
    } else {
      return Ok(finish_long(st, start, qualifiers, seg));
    }
  }
}

fn finish_long(st: &St<'_>, start: usize, qualifiers: Vec<Token>, id: Token) -> Token {
  let kind = TokenKind::LongIdent(LongIdent { qualifiers, id: Box::new(id) });
  Token { kind, pos: start, text: SmolStr::new(&st.s[start..st.i]) }
}

fn is_symbolic(b: u8) -> bool {
  matches!(
    b,
    b'!'
      | b'%'
      | b'&'
      | b'$'
      | b'#'
      | b'+'
      | b'-'
      | b'/'
      | b':'
      | b'<'
      | b'='
      | b'>'
      | b'?'
      | b'@'
      | b'\\'
      | b'~'
      | b'`'
      | b'^'
      | b'|'
      | b'*'
  )
}
