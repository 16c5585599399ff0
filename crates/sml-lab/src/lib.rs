//! [`Lab`], a label, as for a record or tuple.

use std::fmt;
use str_util::Name;

/// A record/tuple label.
///
/// Numeric labels sort before named ones, so the rows of a tuple come out in order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lab {
  /// A numeric label, as in `#1` or a tuple position.
  Num(usize),
  /// A named label.
  Name(Name),
}

impl fmt::Display for Lab {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Name(name) => name.fmt(f),
      Self::Num(n) => n.fmt(f),
    }
  }
}

impl Lab {
  /// Return the numeric label for one greater than the number passed.
  #[must_use]
  pub fn tuple(idx: usize) -> Self {
    Self::Num(idx + 1)
  }

  /// Returns whether the labels are exactly `1..=n` for some `n` other than 1, i.e. whether a
  /// record with these labels should be shown as a tuple.
  ///
  /// The labels must be sorted.
  pub fn is_tuple<'a, I>(labs: I) -> bool
  where
    I: IntoIterator<Item = &'a Lab>,
  {
    let mut n = 0usize;
    for (idx, lab) in labs.into_iter().enumerate() {
      if *lab != Self::tuple(idx) {
        return false;
      }
      n = idx + 1;
    }
    n != 1
  }
}
