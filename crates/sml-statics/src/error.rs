//! Errors and warnings.

use diagnostic::{Code, Severity};
use sml_hir::{Path, TyVar};
use sml_lab::Lab;
use sml_statics_types::TyDisplay;
use sml_statics_types::overload::Overload;
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
  /// Something is not defined.
  Undefined(Item, String),
  /// Something was defined twice in one declaration.
  Duplicate(Item, Name),
  /// A signature requires something the structure does not have.
  Missing(Item, Name),
  /// A type would contain itself.
  Circularity(TyDisplay, TyDisplay),
  /// Two types could not be unified.
  IncompatibleTys(TyDisplay, TyDisplay),
  /// A type needed to admit equality, but did not.
  NotEquality(TyDisplay),
  /// A type is not in the domain of an overloaded operator.
  NotOverload(Overload, TyDisplay),
  /// A record type lacks a row.
  MissingRow(Lab, TyDisplay),
  /// A real constant in a pattern.
  RealPat,
  /// A variable bound twice in one pattern.
  NonLinearPat(Name),
  /// An attempt to bind a name that may not be bound.
  InvalidRebindName(Name),
  /// A constructor pattern with an argument, for a constructor that takes none.
  ConPatMustNotHaveArg(Path),
  /// A constructor pattern without an argument, for a constructor that takes one.
  ConPatMustHaveArg(Path),
  /// A name used as a constructor in a pattern that is not one.
  PatNotCon(Path),
  /// The name on the left of `as` is a constructor.
  InvalidAsPatName(Name),
  /// A type constructor got the wrong number of arguments.
  WrongNumTyArgs(usize, usize),
  /// The right side of an exception copy is not an exception.
  ExnCopyNotExn(Path),
  /// The right side of a datatype copy is not a datatype.
  DatatypeCopyNotDatatype(Path),
  /// A record type from a `...` pattern or a selector could not be resolved.
  UnresolvedRecordTy,
  /// Type variables not bound by a type binding's parameters.
  Unguarded(Vec<TyVar>),
  /// An explicit type variable in an expansive binding, which cannot be generalized.
  TyVarNotGeneralized(Name),
  /// `val rec` with a pattern other than a name.
  RecPatNotName,
  /// A structure value does not have the type its signature requires.
  NotInstance(Name, TyDisplay, TyDisplay),
  /// A structure value has a different identifier status than its signature requires.
  WrongIdStatus(Name),
  /// Valid code that is not supported here.
  Unsupported(&'static str),
}

/// A kind of thing that can be defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
  /// A value.
  Val,
  /// A type.
  Ty,
  /// A type variable.
  TyVar,
  /// A constructor.
  Con,
  /// An exception.
  Exn,
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
      Item::Ty => "type",
      Item::TyVar => "type variable",
      Item::Con => "constructor",
      Item::Exn => "exception",
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
      ErrorKind::Undefined(item, name) => write!(f, "undefined {item}: {name}"),
      ErrorKind::Duplicate(item, name) => write!(f, "duplicate {item}: {name}"),
      ErrorKind::Missing(item, name) => write!(f, "missing {item} required by signature: {name}"),
      ErrorKind::Circularity(mv, ty) => write!(f, "circular type: {mv} occurs in {ty}"),
      ErrorKind::IncompatibleTys(want, got) => {
        write!(f, "incompatible types: expected {want}, found {got}")
      }
      ErrorKind::NotEquality(ty) => write!(f, "not an equality type: {ty}"),
      ErrorKind::NotOverload(ov, ty) => {
        write!(f, "incompatible types: expected one of {ov}, found {ty}")
      }
      ErrorKind::MissingRow(lab, ty) => write!(f, "missing label {lab} in {ty}"),
      ErrorKind::RealPat => f.write_str("real literal used as a pattern"),
      ErrorKind::NonLinearPat(name) => write!(f, "duplicate variable in pattern: {name}"),
      ErrorKind::InvalidRebindName(name) => write!(f, "cannot re-bind name: {name}"),
      ErrorKind::ConPatMustNotHaveArg(path) => {
        write!(f, "unexpected argument for constructor pattern: {path}")
      }
      ErrorKind::ConPatMustHaveArg(path) => {
        write!(f, "missing argument for constructor pattern: {path}")
      }
      ErrorKind::PatNotCon(path) => write!(f, "not a constructor: {path}"),
      ErrorKind::InvalidAsPatName(name) => write!(f, "invalid `as` pattern name: {name}"),
      ErrorKind::WrongNumTyArgs(want, got) => {
        let s = if *want == 1 { "" } else { "s" };
        write!(f, "expected {want} type argument{s}, found {got}")
      }
      ErrorKind::ExnCopyNotExn(path) => write!(f, "not an exception: {path}"),
      ErrorKind::DatatypeCopyNotDatatype(path) => write!(f, "not a datatype: {path}"),
      ErrorKind::UnresolvedRecordTy => f.write_str("cannot resolve record type containing `...`"),
      ErrorKind::Unguarded(ty_vars) => {
        let s = if ty_vars.len() == 1 { "" } else { "s" };
        write!(f, "Unguarded type variable{s} ")?;
        fmt_util::comma_seq(f, ty_vars.iter().map(Quoted))?;
        f.write_str(".")
      }
      ErrorKind::TyVarNotGeneralized(name) => {
        write!(f, "cannot generalize {name} in a binding of an expansive expression")
      }
      ErrorKind::RecPatNotName => f.write_str("`val rec` must bind a name"),
      ErrorKind::NotInstance(name, want, got) => write!(
        f,
        "value {name} does not match its signature: expected {want}, found {got}"
      ),
      ErrorKind::WrongIdStatus(name) => {
        write!(f, "identifier status of {name} does not match its signature")
      }
      ErrorKind::Unsupported(s) => write!(f, "not supported: {s}"),
    }
  }
}

struct Quoted<'a>(&'a TyVar);

impl fmt::Display for Quoted<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "\"{}\"", self.0)
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
      ErrorKind::Undefined(_, _) => Code::n(5001),
      ErrorKind::Duplicate(_, _) => Code::n(5002),
      ErrorKind::Missing(_, _) => Code::n(5003),
      ErrorKind::Circularity(_, _) => Code::n(5004),
      ErrorKind::IncompatibleTys(_, _) => Code::n(5005),
      ErrorKind::NotEquality(_) => Code::n(5006),
      ErrorKind::NotOverload(_, _) => Code::n(5007),
      ErrorKind::MissingRow(_, _) => Code::n(5008),
      ErrorKind::RealPat => Code::n(5009),
      ErrorKind::NonLinearPat(_) => Code::n(5010),
      ErrorKind::InvalidRebindName(_) => Code::n(5011),
      ErrorKind::ConPatMustNotHaveArg(_) => Code::n(5012),
      ErrorKind::ConPatMustHaveArg(_) => Code::n(5013),
      ErrorKind::PatNotCon(_) => Code::n(5014),
      ErrorKind::InvalidAsPatName(_) => Code::n(5015),
      ErrorKind::WrongNumTyArgs(_, _) => Code::n(5016),
      ErrorKind::ExnCopyNotExn(_) => Code::n(5017),
      ErrorKind::DatatypeCopyNotDatatype(_) => Code::n(5018),
      ErrorKind::UnresolvedRecordTy => Code::n(5019),
      ErrorKind::Unguarded(_) => Code::n(5020),
      ErrorKind::TyVarNotGeneralized(_) => Code::n(5021),
      ErrorKind::RecPatNotName => Code::n(5022),
      ErrorKind::NotInstance(_, _, _) => Code::n(5023),
      ErrorKind::WrongIdStatus(_) => Code::n(5024),
      ErrorKind::Unsupported(_) => Code::n(5999),
    }
  }

  /// Returns the severity for this.
  #[must_use]
  pub fn severity(&self) -> Severity {
    Severity::Error
  }

  /// Returns whether this is about something valid that is not supported.
  #[must_use]
  pub fn is_unsupported(&self) -> bool {
    matches!(self.kind, ErrorKind::Unsupported(_))
  }
}

/// A warning. Warnings never stop elaboration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
  pub(crate) pos: usize,
  pub(crate) kind: WarningKind,
}

/// A kind of warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
  /// A `case`, `fn`, or `fun` match does not cover every value.
  NonExhaustiveMatch,
  /// A `val` pattern does not cover every value.
  NonExhaustiveBinding,
  /// The rules up to and including the one with this pattern cover every value, but there are
  /// more rules after it.
  RulesAfterUnused(String),
  /// A rule has the same pattern as an earlier one.
  DuplicateRule(String),
  /// Meta variables at the top level were replaced with these dummy types.
  DummyTys(Vec<String>),
}

impl fmt::Display for WarningKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      WarningKind::NonExhaustiveMatch => f.write_str("Pattern matching is not exhaustive."),
      WarningKind::NonExhaustiveBinding => f.write_str("Binding is not exhaustive."),
      WarningKind::RulesAfterUnused(pat) => {
        write!(f, "Rules after \"{pat}\" unused in pattern matching.")
      }
      WarningKind::DuplicateRule(pat) => {
        write!(f, "Duplicate rule for \"{pat}\" in pattern matching.")
      }
      WarningKind::DummyTys(names) => {
        f.write_str("Type variables not generalized because of the value restriction are ")?;
        f.write_str("instantiated to dummy types (")?;
        fmt_util::comma_seq(f, names.iter())?;
        f.write_str(").")
      }
    }
  }
}

impl fmt::Display for Warning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.kind.fmt(f)
  }
}

impl Warning {
  /// Returns the byte offset for this.
  #[must_use]
  pub fn pos(&self) -> usize {
    self.pos
  }

  /// Returns the kind for this.
  #[must_use]
  pub fn kind(&self) -> &WarningKind {
    &self.kind
  }

  /// Returns the code for this.
  #[must_use]
  pub fn code(&self) -> Code {
    match self.kind {
      WarningKind::NonExhaustiveMatch => Code::n(5101),
      WarningKind::NonExhaustiveBinding => Code::n(5102),
      WarningKind::RulesAfterUnused(_) => Code::n(5103),
      WarningKind::DuplicateRule(_) => Code::n(5104),
      WarningKind::DummyTys(_) => Code::n(5105),
    }
  }

  /// Returns the severity for this.
  #[must_use]
  pub fn severity(&self) -> Severity {
    Severity::Warning
  }
}
