//! Errors from any stage, sorted into what went wrong for the user.

use diagnostic::{Code, Severity};
use std::fmt;

/// An error that stopped interpreting. The state passed in is unchanged.
#[derive(Debug)]
pub struct Error {
  pos: usize,
  kind: ErrorKind,
  message: String,
  code: Code,
}

/// What kind of problem an error is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// The input may be the start of something valid. More input may fix it.
  Incomplete,
  /// The input is lexically invalid.
  Lexer,
  /// The input does not follow the grammar.
  Parser,
  /// The input is not well-typed.
  Elaboration,
  /// Running failed in a way that is not an SML exception.
  Evaluation,
  /// Something that should not happen happened.
  Internal,
  /// Valid SML that is not supported.
  FeatureNotImplemented,
  /// Valid SML that the options turned off.
  FeatureDisabled,
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ErrorKind::Incomplete => "incomplete input",
      ErrorKind::Lexer => "lexer error",
      ErrorKind::Parser => "parser error",
      ErrorKind::Elaboration => "elaboration error",
      ErrorKind::Evaluation => "evaluation error",
      ErrorKind::Internal => "internal error",
      ErrorKind::FeatureNotImplemented => "feature not implemented",
      ErrorKind::FeatureDisabled => "feature disabled",
    };
    f.write_str(s)
  }
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.kind, self.message)
  }
}

impl std::error::Error for Error {}

impl Error {
  fn new<E>(pos: usize, kind: ErrorKind, err: &E, code: Code) -> Self
  where
    E: fmt::Display,
  {
    Self { pos, kind, message: err.to_string(), code }
  }

  pub(crate) fn internal(message: String) -> Self {
    Self { pos: 0, kind: ErrorKind::Internal, message, code: Code::n(1001) }
  }

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

  /// Returns the message for this, without the kind.
  #[must_use]
  pub fn message(&self) -> &str {
    &self.message
  }

  /// Returns the code for this, from the stage that found it.
  #[must_use]
  pub fn code(&self) -> Code {
    self.code
  }

  /// Returns the severity for this.
  #[must_use]
  pub fn severity(&self) -> Severity {
    Severity::Error
  }

  /// Returns whether more input may fix this.
  #[must_use]
  pub fn is_incomplete(&self) -> bool {
    self.kind == ErrorKind::Incomplete
  }
}

impl From<sml_lex::Error> for Error {
  fn from(err: sml_lex::Error) -> Self {
    let kind = if err.is_incomplete() { ErrorKind::Incomplete } else { ErrorKind::Lexer };
    Error::new(err.pos(), kind, &err, err.code())
  }
}

impl From<sml_parse::Error> for Error {
  fn from(err: sml_parse::Error) -> Self {
    let kind = match err.kind() {
      sml_parse::ErrorKind::Incomplete => ErrorKind::Incomplete,
      sml_parse::ErrorKind::FeatureDisabled(_) => ErrorKind::FeatureDisabled,
      sml_parse::ErrorKind::FeatureNotImplemented(_) => ErrorKind::FeatureNotImplemented,
      _ => ErrorKind::Parser,
    };
    Error::new(err.pos(), kind, &err, err.code())
  }
}

impl From<sml_hir_lower::Error> for Error {
  fn from(err: sml_hir_lower::Error) -> Self {
    let kind = match err.kind() {
      sml_hir_lower::ErrorKind::DuplicateLab(_) => ErrorKind::Elaboration,
      _ => ErrorKind::Parser,
    };
    Error::new(err.pos(), kind, &err, err.code())
  }
}

impl From<sml_statics::Error> for Error {
  fn from(err: sml_statics::Error) -> Self {
    let kind =
      if err.is_unsupported() { ErrorKind::FeatureNotImplemented } else { ErrorKind::Elaboration };
    Error::new(err.pos(), kind, &err, err.code())
  }
}

impl From<sml_dynamics::Error> for Error {
  fn from(err: sml_dynamics::Error) -> Self {
    Error::new(err.pos(), ErrorKind::Evaluation, &err, err.code())
  }
}
