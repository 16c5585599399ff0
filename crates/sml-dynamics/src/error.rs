//! Runtime failures that are not SML exceptions.

use diagnostic::{Code, Severity};
use sml_state::Builtin;
use std::fmt;
use str_util::Name;

/// An error.
#[derive(Debug)]
pub struct Error {
  pub(crate) pos: usize,
  pub(crate) kind: ErrorKind,
}

/// A kind of error.
#[derive(Debug)]
pub enum ErrorKind {
  /// The stack of frames grew past the limit.
  TooManyFrames(usize),
  /// A name had no binding.
  Undefined(Item, String),
  /// An attempt to bind a name that may not be bound.
  InvalidRebindName(Name),
  /// Application of something that is not a function.
  NotFunction,
  /// A builtin got an argument it cannot handle.
  WrongArg(Builtin),
  /// `val rec` that does not bind a name to a `fn`.
  BadRec,
  /// `raise` of something that is not an exception.
  RaiseNotExn,
}

/// A kind of thing that can be looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
  /// A value.
  Val,
  /// A structure.
  Struct,
  /// A signature.
  Sig,
  /// A functor.
  Functor,
}

impl fmt::Display for Item {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Item::Val => "value",
      Item::Struct => "structure",
      Item::Sig => "signature",
      Item::Functor => "functor",
    };
    f.write_str(s)
  }
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ErrorKind::TooManyFrames(n) => write!(f, "exceeded the limit of {n} stack frames"),
      ErrorKind::Undefined(item, name) => write!(f, "undefined {item}: {name}"),
      ErrorKind::InvalidRebindName(name) => write!(f, "cannot re-bind name: {name}"),
      ErrorKind::NotFunction => f.write_str("applied something that is not a function"),
      ErrorKind::WrongArg(b) => write!(f, "wrong kind of argument for `{}`", b.as_str()),
      ErrorKind::BadRec => f.write_str("`val rec` must bind a name to a `fn`"),
      ErrorKind::RaiseNotExn => f.write_str("raised something that is not an exception"),
    }
  }
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.kind.fmt(f)
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

  /// Returns the code for this.
  #[must_use]
  pub fn code(&self) -> Code {
    match self.kind {
      ErrorKind::TooManyFrames(_) => Code::n(6001),
      ErrorKind::Undefined(_, _) => Code::n(6002),
      ErrorKind::InvalidRebindName(_) => Code::n(6003),
      ErrorKind::NotFunction => Code::n(6004),
      ErrorKind::WrongArg(_) => Code::n(6005),
      ErrorKind::BadRec => Code::n(6006),
      ErrorKind::RaiseNotExn => Code::n(6007),
    }
  }

  /// Returns the severity for this.
  #[must_use]
  pub fn severity(&self) -> Severity {
    Severity::Error
  }
}
