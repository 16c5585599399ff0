//! Dynamic environments, signatures, and functors.

#![allow(clippy::module_name_repetitions)]

use crate::State;
use crate::val::Val;
use fast_hash::FxHashMap;
use sml_statics_types::env::{IdStatus, Sig};
use std::rc::Rc;
use str_util::Name;

/// A dynamic environment, as for a structure.
#[derive(Debug, Default, Clone)]
pub struct DynEnv {
  /// The structures.
  pub str_env: FxHashMap<Name, DynEnv>,
  /// The types, mapped to their constructor names.
  pub ty_env: FxHashMap<Name, Vec<Name>>,
  /// The values.
  pub val_env: FxHashMap<Name, (Val, IdStatus)>,
}

impl DynEnv {
  /// Adds everything from `other` to this, overwriting.
  pub fn extend(&mut self, other: DynEnv) {
    self.str_env.extend(other.str_env);
    self.ty_env.extend(other.ty_env);
    self.val_env.extend(other.val_env);
  }

  /// Returns the env at the path of structure names.
  ///
  /// # Errors
  ///
  /// Returns the first name not found.
  pub fn get_str<'e, 'n>(&'e self, names: &'n [Name]) -> Result<&'e DynEnv, &'n Name> {
    let mut ret = self;
    for name in names {
      ret = match ret.str_env.get(name) {
        Some(x) => x,
        None => return Err(name),
      };
    }
    Ok(ret)
  }

  /// Keeps only what the signature mentions.
  #[must_use]
  pub fn filter(mut self, sig: &DynSig) -> DynEnv {
    let str_env = sig
      .str_env
      .iter()
      .filter_map(|(name, sig)| Some((name.clone(), self.str_env.remove(name)?.filter(sig))))
      .collect();
    let ty_env = sig
      .ty_env
      .iter()
      .filter_map(|(name, _)| Some((name.clone(), self.ty_env.remove(name)?)))
      .collect();
    let val_env = sig
      .val_env
      .iter()
      .filter_map(|(name, &id_status)| {
        let (val, _) = self.val_env.remove(name)?;
        Some((name.clone(), (val, id_status)))
      })
      .collect();
    DynEnv { str_env, ty_env, val_env }
  }
}

/// What a signature means at runtime: the names it lets through.
#[derive(Debug, Default, Clone)]
pub struct DynSig {
  /// The structures.
  pub str_env: FxHashMap<Name, DynSig>,
  /// The types, mapped to their constructor names.
  pub ty_env: FxHashMap<Name, Vec<Name>>,
  /// The values.
  pub val_env: FxHashMap<Name, IdStatus>,
}

impl DynSig {
  /// Adds everything from `other` to this, overwriting.
  pub fn extend(&mut self, other: DynSig) {
    self.str_env.extend(other.str_env);
    self.ty_env.extend(other.ty_env);
    self.val_env.extend(other.val_env);
  }
}

/// A functor, for static analysis.
#[derive(Debug)]
pub struct StaticFunctor {
  /// The parameter name.
  pub param: Name,
  /// The parameter signature.
  pub param_sig: Sig,
  /// The body, elaborated again at each application.
  pub body: Rc<sml_hir::StrExp>,
  /// The state the functor was declared in.
  pub state: State,
}

/// A functor, for evaluation.
#[derive(Debug)]
pub struct DynFunctor {
  /// The parameter name.
  pub param: Name,
  /// The parameter signature.
  pub param_sig: DynSig,
  /// The body.
  pub body: Rc<sml_hir::StrExp>,
  /// The state the functor was declared in.
  pub state: State,
}
