//! The parser: a cursor over the tokens, plus errors.

use crate::ParserContext;
use diagnostic::{Code, Severity};
use sml_lex::{Token, TokenKind};
use std::fmt;

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) struct Parser<'a, 'cx> {
  tokens: Vec<&'a Token>,
  idx: usize,
  end: usize,
  pub(crate) cx: &'cx mut ParserContext,
}

impl<'a, 'cx> Parser<'a, 'cx> {
  pub(crate) fn new(tokens: &'a [Token], cx: &'cx mut ParserContext) -> Self {
    let end = tokens.last().map_or(0, |tok| tok.pos + tok.text.len());
    let tokens: Vec<_> =
      tokens.iter().filter(|tok| !matches!(tok.kind, TokenKind::Comment)).collect();
    Self { tokens, idx: 0, end, cx }
  }

  pub(crate) fn peek(&self) -> Option<&'a Token> {
    self.peek_n(0)
  }

  pub(crate) fn peek_n(&self, n: usize) -> Option<&'a Token> {
    self.tokens.get(self.idx + n).copied()
  }

  pub(crate) fn at_kw(&self, kw: &str) -> bool {
    self.at_kw_n(0, kw)
  }

  pub(crate) fn at_kw_n(&self, n: usize, kw: &str) -> bool {
    self.peek_n(n).is_some_and(|tok| tok.is_kw(kw))
  }

  pub(crate) fn at_eq(&self) -> bool {
    self.peek().is_some_and(|tok| matches!(tok.kind, TokenKind::Equals))
  }

  pub(crate) fn at_star(&self) -> bool {
    self.peek().is_some_and(|tok| matches!(tok.kind, TokenKind::Star))
  }

  pub(crate) fn at_end(&self) -> bool {
    self.idx >= self.tokens.len()
  }

  /// returns the current token and advances past it.
  pub(crate) fn bump(&mut self) -> Result<&'a Token> {
    let tok = self.peek().ok_or_else(|| self.err(ErrorKind::Incomplete))?;
    self.idx += 1;
    Ok(tok)
  }

  pub(crate) fn eat_kw(&mut self, kw: &'static str) -> Result<()> {
    if self.at_kw(kw) {
      self.idx += 1;
      Ok(())
    } else {
      Err(self.expected(Expected::Kw(kw)))
    }
  }

  pub(crate) fn eat_eq(&mut self) -> Result<()> {
    if self.at_eq() {
      self.idx += 1;
      Ok(())
    } else {
      Err(self.expected(Expected::Kw("=")))
    }
  }

  /// eats the keyword if it is there, returning whether it was.
  pub(crate) fn eat_kw_opt(&mut self, kw: &str) -> bool {
    let ret = self.at_kw(kw);
    if ret {
      self.idx += 1;
    }
    ret
  }

  pub(crate) fn pos(&self) -> usize {
    self.peek().map_or(self.end, |tok| tok.pos)
  }

  pub(crate) fn err(&self, kind: ErrorKind) -> Error {
    Error { pos: self.pos(), kind }
  }

  /// an error for when we wanted something else here. if there is nothing here, the input may
  /// continue, so it is incomplete.
  pub(crate) fn expected(&self, e: Expected) -> Error {
    if self.at_end() { self.err(ErrorKind::Incomplete) } else { self.err(ErrorKind::Expected(e)) }
  }

  pub(crate) fn successor_ml(&self, feature: &'static str) -> Result<()> {
    if self.cx.options.allow_successor_ml {
      Ok(())
    } else {
      Err(self.err(ErrorKind::FeatureDisabled(feature)))
    }
  }
}

/// A kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
  /// The tokens ran out in the middle of something.
  Incomplete,
  /// Something else was expected here.
  Expected(Expected),
  /// An infix name was used as nonfix without `op`.
  InfixWithoutOp,
  /// A nonfix name was used as infix.
  NotInfix,
  /// A fixity was greater than 9.
  InvalidFixity,
  /// Infix operators with the same precedence but different associativity were mixed.
  SameFixityDiffAssoc,
  /// A `...` row was not last.
  RestPatRowNotLast,
  /// A layered pattern had something other than a name on the left.
  AsPatLhsNotName,
  /// A valid construct turned off by the options.
  FeatureDisabled(&'static str),
  /// A valid construct not supported.
  FeatureNotImplemented(&'static str),
}

/// Something expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
  /// An expression.
  Exp,
  /// A pattern.
  Pat,
  /// A type.
  Ty,
  /// A label.
  Lab,
  /// A name.
  Name,
  /// A declaration.
  Dec,
  /// A structure expression.
  StrExp,
  /// A signature expression.
  SigExp,
  /// A specification.
  Spec,
  /// A keyword or punctuation.
  Kw(&'static str),
}

impl fmt::Display for Expected {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Expected::Exp => f.write_str("an expression"),
      Expected::Pat => f.write_str("a pattern"),
      Expected::Ty => f.write_str("a type"),
      Expected::Lab => f.write_str("a label"),
      Expected::Name => f.write_str("a name"),
      Expected::Dec => f.write_str("a declaration"),
      Expected::StrExp => f.write_str("a structure expression"),
      Expected::SigExp => f.write_str("a signature expression"),
      Expected::Spec => f.write_str("a specification"),
      Expected::Kw(kw) => write!(f, "`{kw}`"),
    }
  }
}

/// A parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
  pub(crate) pos: usize,
  pub(crate) kind: ErrorKind,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      ErrorKind::Incomplete => f.write_str("unexpected end of input"),
      ErrorKind::Expected(e) => write!(f, "expected {e}"),
      ErrorKind::InfixWithoutOp => f.write_str("infix name used as non-infix without `op`"),
      ErrorKind::NotInfix => f.write_str("non-infix name used as infix"),
      ErrorKind::InvalidFixity => f.write_str("fixity must be between 0 and 9"),
      ErrorKind::SameFixityDiffAssoc => {
        f.write_str("consecutive infix names with same fixity but different associativity")
      }
      ErrorKind::RestPatRowNotLast => f.write_str("`...` must come last in a record pattern"),
      ErrorKind::AsPatLhsNotName => f.write_str("left of `as` must be a name"),
      ErrorKind::FeatureDisabled(what) => write!(f, "disabled: {what}"),
      ErrorKind::FeatureNotImplemented(what) => write!(f, "not implemented: {what}"),
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
  pub fn kind(&self) -> &ErrorKind {
    &self.kind
  }

  /// Returns whether more input could make this go away.
  #[must_use]
  pub fn is_incomplete(&self) -> bool {
    matches!(self.kind, ErrorKind::Incomplete)
  }

  /// Returns the code for this.
  #[must_use]
  pub fn code(&self) -> Code {
    match self.kind {
      ErrorKind::Incomplete => Code::n(3001),
      ErrorKind::Expected(_) => Code::n(3002),
      ErrorKind::InfixWithoutOp => Code::n(3003),
      ErrorKind::NotInfix => Code::n(3004),
      ErrorKind::InvalidFixity => Code::n(3005),
      ErrorKind::SameFixityDiffAssoc => Code::n(3006),
      ErrorKind::RestPatRowNotLast => Code::n(3007),
      ErrorKind::AsPatLhsNotName => Code::n(3008),
      ErrorKind::FeatureDisabled(_) => Code::n(3009),
      ErrorKind::FeatureNotImplemented(_) => Code::n(3010),
    }
  }

  /// Returns the severity for this.
  #[must_use]
  pub fn severity(&self) -> Severity {
    Severity::Error
  }
}
