//! The tokens produced by the lexer.

use std::fmt;
use str_util::{Name, SmolStr};

/// The reserved words, including punctuation.
///
/// `=` and `*` are not here, since they get their own token kinds.
pub const KEYWORDS: [&str; 52] = [
  "abstype", "and", "andalso", "as", "case", "datatype", "do", "else", "end", "exception", "fn",
  "fun", "handle", "if", "in", "infix", "infixr", "let", "local", "nonfix", "of", "op", "open",
  "orelse", "raise", "rec", "then", "type", "val", "with", "withtype", "while", "(", ")", "[", "]",
  "{", "}", ",", ":", ";", "...", "_", "|", "=>", "->", "#", "eqtype", "functor", "signature",
  "struct", "include",
];

/// The reserved words of the module language.
pub const MODULE_KEYWORDS: [&str; 5] = ["sharing", "structure", "where", "sig", ":>"];

/// Returns the static keyword equal to `s`, if any.
#[must_use]
pub fn keyword(s: &str) -> Option<&'static str> {
  KEYWORDS.iter().chain(MODULE_KEYWORDS.iter()).find(|&&k| k == s).copied()
}

/// A token, with its start offset and its text in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
  /// The kind, with any decoded payload.
  pub kind: TokenKind,
  /// The byte offset of the start of the token.
  pub pos: usize,
  /// The source text of the token.
  pub text: SmolStr,
}

/// A kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
  /// A reserved word.
  Keyword(&'static str),
  /// `=`.
  Equals,
  /// `*`.
  Star,
  /// A symbolic identifier, like `+` or `<>`.
  Ident(Name),
  /// An alphanumeric identifier, like `foo`.
  AlnumIdent(Name),
  /// A type variable, like `'a`.
  TyVar(Name),
  /// An equality type variable, like `''a`.
  EqTyVar(Name),
  /// A qualified identifier, like `List.map`.
  LongIdent(LongIdent),
  /// An int constant that cannot be a label, like `~3` or `0x1f`.
  Int(i32),
  /// A real constant.
  Real(f64),
  /// A word constant.
  Word(u32),
  /// A char constant.
  Char(char),
  /// A string constant.
  String(SmolStr),
  /// A positive decimal int not starting with `0`, which may also be a label.
  Numeric(i32),
  /// A comment, only produced when asked for.
  Comment,
}

/// The parts of a qualified identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct LongIdent {
  /// The structure names, in order.
  pub qualifiers: Vec<Token>,
  /// The last part.
  pub id: Box<Token>,
}

impl LongIdent {
  /// Returns the qualifier names followed by the final name.
  #[must_use]
  pub fn names(&self) -> (Vec<Name>, Name) {
    let qs = self.qualifiers.iter().filter_map(Token::ident_name).collect();
    let last = self.id.ident_name().unwrap_or_else(|| Name::new(self.id.text.as_str()));
    (qs, last)
  }
}

impl Token {
  /// Returns whether this is the keyword `kw`.
  #[must_use]
  pub fn is_kw(&self, kw: &str) -> bool {
    matches!(self.kind, TokenKind::Keyword(k) if k == kw)
  }

  /// Returns the name if this is a (short) value identifier: an identifier, `=`, or `*`.
  #[must_use]
  pub fn ident_name(&self) -> Option<Name> {
    match &self.kind {
      TokenKind::Ident(n) | TokenKind::AlnumIdent(n) => Some(n.clone()),
      TokenKind::Equals => Some(Name::new("=")),
      TokenKind::Star => Some(Name::new("*")),
      _ => None,
    }
  }
}

impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.text)
  }
}
