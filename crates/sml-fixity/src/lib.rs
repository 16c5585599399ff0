//! Types concerning SML infix operators, precedence, and associativity.

use fast_hash::{FxHashMap, map_with_capacity};
use str_util::Name;

/// A mapping from names to fixities.
pub type Env = FxHashMap<Name, Fixity>;

/// The infix operators built into the initial state. Others, like `o` and `@`, come from the
/// library source.
const INITIAL: [(Infix, &[&str]); 5] = [
  (Infix::left(7), &["*", "/", "div", "mod"]),
  (Infix::left(6), &["+", "-", "^"]),
  (Infix::right(5), &["::"]),
  (Infix::left(4), &["=", "<>", ">", ">=", "<", "<="]),
  (Infix::left(3), &[":="]),
];

/// Returns the fixities of the initial state.
#[must_use]
pub fn initial() -> Env {
  let mut ret = map_with_capacity(INITIAL.iter().map(|(_, names)| names.len()).sum());
  for (info, names) in INITIAL {
    for &name in names {
      ret.insert(Name::new(name), Fixity::Infix(info));
    }
  }
  ret
}

/// Whether a name is infix.
///
/// `nonfix` entries are recorded too, so they can shadow infix entries further up a scope chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
  /// Declared with `infix` or `infixr`.
  Infix(Infix),
  /// Declared with `nonfix`.
  Nonfix,
}

impl Fixity {
  /// Returns the infix info, if infix.
  #[must_use]
  pub fn infix(self) -> Option<Infix> {
    match self {
      Fixity::Infix(x) => Some(x),
      Fixity::Nonfix => None,
    }
  }
}

/// Information about an infix name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Infix {
  /// The precedence, from 0 to 9.
  pub prec: u16,
  /// The associativity.
  pub assoc: Assoc,
}

impl Infix {
  /// Returns a new `Infix` with left associativity.
  #[must_use]
  pub const fn left(prec: u16) -> Self {
    Self { prec, assoc: Assoc::Left }
  }

  /// Returns a new `Infix` with right associativity.
  #[must_use]
  pub const fn right(prec: u16) -> Self {
    Self { prec, assoc: Assoc::Right }
  }
}

/// Associativity for infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
  /// `infix`
  Left,
  /// `infixr`
  Right,
}
