//! Overloaded types.

use crate::ty::TyCon;
use std::fmt;

/// A basic overload, i.e. one of the types that overloaded operators work on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Basic {
  /// `int`
  Int,
  /// `word`
  Word,
  /// `real`
  Real,
  /// `string`
  String,
  /// `char`
  Char,
}

const ALL: [Basic; 5] = [Basic::Int, Basic::Word, Basic::Real, Basic::String, Basic::Char];

impl Basic {
  /// Returns this as a string.
  #[must_use]
  pub fn as_str(self) -> &'static str {
    match self {
      Basic::Int => "int",
      Basic::Word => "word",
      Basic::Real => "real",
      Basic::String => "string",
      Basic::Char => "char",
    }
  }

  /// Returns the basic overload for this type constructor, if any.
  #[must_use]
  pub fn from_ty_con(tc: &TyCon) -> Option<Self> {
    if !tc.is_builtin() {
      return None;
    }
    ALL.into_iter().find(|b| b.as_str() == tc.name.as_str())
  }

  /// Returns the type constructor for this.
  #[must_use]
  pub fn ty_con(self) -> TyCon {
    TyCon::builtin(self.as_str())
  }

  fn bit(self) -> u8 {
    match self {
      Basic::Int => 1,
      Basic::Word => 2,
      Basic::Real => 4,
      Basic::String => 8,
      Basic::Char => 16,
    }
  }
}

impl fmt::Display for Basic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A finite, non-empty set of basic types that an overloaded type variable may be instantiated
/// to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Overload(u8);

impl Overload {
  /// `int`, `word`, `real`.
  pub const NUM: Self = Self(1 | 2 | 4);
  /// `int`, `real`.
  pub const REAL_INT: Self = Self(1 | 4);
  /// `int`, `word`.
  pub const WORD_INT: Self = Self(1 | 2);
  /// All of them.
  pub const NUM_TXT: Self = Self(1 | 2 | 4 | 8 | 16);

  /// Returns the overload containing only `b`.
  #[must_use]
  pub fn basic(b: Basic) -> Self {
    Self(b.bit())
  }

  /// Returns whether `b` is in this.
  #[must_use]
  pub fn contains(self, b: Basic) -> bool {
    self.0 & b.bit() != 0
  }

  /// Returns the intersection, if it is non-empty.
  #[must_use]
  pub fn intersect(self, other: Self) -> Option<Self> {
    let ret = self.0 & other.0;
    (ret != 0).then_some(Self(ret))
  }

  /// Returns this without the types that do not admit equality.
  #[must_use]
  pub fn equality(self, real_equality: bool) -> Option<Self> {
    let ret = if real_equality { self.0 } else { self.0 & !Basic::Real.bit() };
    (ret != 0).then_some(Self(ret))
  }

  /// Returns the members, in order.
  pub fn iter(self) -> impl Iterator<Item = Basic> {
    ALL.into_iter().filter(move |&b| self.contains(b))
  }

  /// Returns the type to use when nothing else decided which member this should be: `int` if
  /// possible, else the first member.
  #[must_use]
  pub fn default(self) -> Basic {
    if self.contains(Basic::Int) {
      return Basic::Int;
    }
    self.iter().next().unwrap_or(Basic::Int)
  }
}

impl fmt::Display for Overload {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut iter = self.iter();
    if let Some(b) = iter.next() {
      b.fmt(f)?;
    }
    for b in iter {
      write!(f, "/{b}")?;
    }
    Ok(())
  }
}
