//! Environments, and the information about names that they hold.

#![allow(clippy::module_name_repetitions)]

use crate::ty::{Equality, Ty, TyCon, TyScheme};
use fast_hash::{FxHashMap, FxHashSet};
use str_util::Name;

/// An identifier status, denoting what kind of value this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStatus {
  /// A datatype constructor.
  Con,
  /// An exception constructor.
  Exn,
  /// A general value.
  Val,
}

impl IdStatus {
  /// Returns whether this is a constructor of either kind.
  #[must_use]
  pub fn is_con(self) -> bool {
    matches!(self, Self::Con | Self::Exn)
  }
}

/// Information about a value.
#[derive(Debug, Clone)]
pub struct ValInfo {
  /// The type scheme.
  pub ty_scheme: TyScheme,
  /// The identifier status.
  pub id_status: IdStatus,
}

/// Information about a type name.
#[derive(Debug, Clone)]
pub struct TyInfo {
  /// The type function. Its bound variables are the parameters.
  pub ty_scheme: TyScheme,
  /// The constructors, if this is a datatype.
  pub val_env: ValEnv,
}

/// Information about a type constructor, used for equality and match checking.
#[derive(Debug, Clone)]
pub struct TyConInfo {
  /// The number of parameters.
  pub arity: usize,
  /// Whether it admits equality.
  pub equality: Equality,
  /// The constructors, in declaration order. Empty for types with no constructors we can list,
  /// like `int` or abstract types.
  pub cons: Vec<ConInfo>,
}

/// A constructor of a datatype.
#[derive(Debug, Clone)]
pub struct ConInfo {
  /// The name.
  pub name: Name,
  /// The argument type, with the type parameters as bound variables.
  pub arg: Option<Ty>,
}

/// A mapping from value names to info.
pub type ValEnv = FxHashMap<Name, ValInfo>;
/// A mapping from type names to info.
pub type TyEnv = FxHashMap<Name, TyInfo>;
/// A mapping from structure names to envs.
pub type StrEnv = FxHashMap<Name, Env>;
/// A mapping from type constructors to info.
pub type TyConEnv = FxHashMap<TyCon, TyConInfo>;

/// An environment, as for a structure.
#[derive(Debug, Default, Clone)]
pub struct Env {
  /// The structures.
  pub str_env: StrEnv,
  /// The types.
  pub ty_env: TyEnv,
  /// The values.
  pub val_env: ValEnv,
}

impl Env {
  /// Adds everything from `other` to this, overwriting.
  pub fn extend(&mut self, other: Env) {
    self.str_env.extend(other.str_env);
    self.ty_env.extend(other.ty_env);
    self.val_env.extend(other.val_env);
  }

  /// Returns the env at the path of structure names.
  ///
  /// # Errors
  ///
  /// Returns the first name not found.
  pub fn get_str<'e, 'n>(&'e self, names: &'n [Name]) -> Result<&'e Env, &'n Name> {
    let mut ret = self;
    for name in names {
      ret = match ret.str_env.get(name) {
        Some(x) => x,
        None => return Err(name),
      };
    }
    Ok(ret)
  }

  /// Replaces every type constructor in this according to `f`.
  #[must_use]
  pub fn realize<F>(&self, f: &F) -> Env
  where
    F: Fn(&TyCon) -> Option<TyScheme>,
  {
    let realize_scheme = |scheme: &TyScheme| TyScheme {
      bound: scheme.bound.clone(),
      overload: scheme.overload,
      ty: scheme.ty.realize(f),
    };
    let realize_vals = |val_env: &ValEnv| -> ValEnv {
      val_env
        .iter()
        .map(|(name, vi)| {
          let vi = ValInfo { ty_scheme: realize_scheme(&vi.ty_scheme), id_status: vi.id_status };
          (name.clone(), vi)
        })
        .collect()
    };
    Env {
      str_env: self.str_env.iter().map(|(name, env)| (name.clone(), env.realize(f))).collect(),
      ty_env: self
        .ty_env
        .iter()
        .map(|(name, ti)| {
          let ti =
            TyInfo { ty_scheme: realize_scheme(&ti.ty_scheme), val_env: realize_vals(&ti.val_env) };
          (name.clone(), ti)
        })
        .collect(),
      val_env: realize_vals(&self.val_env),
    }
  }
}

/// A signature.
#[derive(Debug, Clone)]
pub struct Sig {
  /// The type constructors bound by this signature, like `t` in `sig type t end`. Matching a
  /// structure against the signature realizes these.
  pub ty_cons: FxHashSet<TyCon>,
  /// The type constructor info for those bound type constructors.
  pub ty_con_env: TyConEnv,
  /// The env.
  pub env: Env,
}
