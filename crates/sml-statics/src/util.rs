//! Lookups and other helpers.

use crate::error::{Error, ErrorKind, Item};
use crate::st::St;
use sml_hir::{DecKind, Exp, ExpKind, Pat, PatKind, Path, TyVar};
use sml_state::{Rebind, State};
use sml_statics_types::env::{Env, IdStatus, TyInfo, ValInfo};
use sml_statics_types::ty::{FixedVar, Ty, TyScheme};
use str_util::Name;

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

/// The explicit type variables in scope, and the rank for new meta variables.
#[derive(Debug, Clone, Default)]
pub(crate) struct Cx {
  pub(crate) rank: u32,
  pub(crate) ty_vars: Vec<(TyVar, FixedVar)>,
}

impl Cx {
  pub(crate) fn ty_var(&self, tv: &TyVar) -> Option<&FixedVar> {
    self.ty_vars.iter().rev().find_map(|(k, v)| (k == tv).then_some(v))
  }
}

pub(crate) fn undefined(pos: usize, item: Item, name: impl ToString) -> Error {
  Error { pos, kind: ErrorKind::Undefined(item, name.to_string()) }
}

/// Calls `f` with the env of the structure at `prefix`, or the top-level state if it is empty.
fn with_prefix<T, F, G>(state: &State, pos: usize, prefix: &[Name], f: F, g: G) -> Result<T>
where
  F: FnOnce(&Env) -> T,
  G: FnOnce() -> T,
{
  if prefix.is_empty() {
    return Ok(g());
  }
  state.with_static_str(prefix, f).map_err(|name| undefined(pos, Item::Struct, name))
}

pub(crate) fn get_val(st: &St<'_>, state: &State, pos: usize, path: &Path) -> Result<ValInfo> {
  let found = with_prefix(
    state,
    pos,
    &path.prefix,
    |env| env.val_env.get(&path.last).cloned(),
    || state.static_val(path.last.as_str()),
  );
  let flat = || {
    if st.options.allow_long_function_names && !path.is_one() {
      cov_mark::hit("long_function_name_lookup");
      state.static_val(path.to_string().as_str())
    } else {
      None
    }
  };
  match found {
    Ok(Some(x)) => Ok(x),
    Ok(None) => flat().ok_or_else(|| undefined(pos, Item::Val, path)),
    Err(e) => flat().ok_or(e),
  }
}

/// Like [`get_val`], but returns `None` instead of an error when the value is not there.
pub(crate) fn try_get_val(state: &State, path: &Path) -> Option<ValInfo> {
  if path.is_one() {
    return state.static_val(path.last.as_str());
  }
  state.with_static_str(&path.prefix, |env| env.val_env.get(&path.last).cloned()).ok().flatten()
}

pub(crate) fn get_ty(state: &State, pos: usize, path: &Path) -> Result<TyInfo> {
  let found = with_prefix(
    state,
    pos,
    &path.prefix,
    |env| env.ty_env.get(&path.last).cloned(),
    || state.static_ty(path.last.as_str()),
  )?;
  found.ok_or_else(|| undefined(pos, Item::Ty, path))
}

pub(crate) fn get_str(state: &State, pos: usize, path: &Path) -> Result<Env> {
  let mut names = path.prefix.clone();
  names.push(path.last.clone());
  state.with_static_str(&names, Env::clone).map_err(|name| undefined(pos, Item::Struct, name))
}

/// Errors if `name` may not be bound with the status.
pub(crate) fn check_rebind(
  state: &State,
  pos: usize,
  name: &Name,
  id_status: IdStatus,
) -> Result<()> {
  let ok = match state.rebind(name.as_str()) {
    Rebind::Allowed => true,
    Rebind::Half => !id_status.is_con(),
    Rebind::Never => false,
  };
  if ok {
    Ok(())
  } else {
    Err(Error { pos, kind: ErrorKind::InvalidRebindName(name.clone()) })
  }
}

/// Returns the scheme binding the fixed variables, in order, in `ty`.
pub(crate) fn abstract_fixed(ty: &Ty, fixed: &[FixedVar]) -> TyScheme {
  fn go(ty: &Ty, fixed: &[FixedVar]) -> Ty {
    match ty {
      Ty::FixedVar(fv) => match fixed.iter().position(|x| x == fv) {
        Some(idx) => Ty::BoundVar(idx),
        None => ty.clone(),
      },
      Ty::BoundVar(_) | Ty::MetaVar(_) => ty.clone(),
      Ty::Record(rows) => {
        Ty::Record(rows.iter().map(|(lab, ty)| (lab.clone(), go(ty, fixed))).collect())
      }
      Ty::Con(args, tc) => Ty::Con(args.iter().map(|ty| go(ty, fixed)).collect(), tc.clone()),
      Ty::Fn(param, res) => Ty::fun(go(param, fixed), go(res, fixed)),
    }
  }
  TyScheme {
    bound: fixed.iter().map(FixedVar::is_equality).collect(),
    overload: None,
    ty: go(ty, fixed),
  }
}

/// Returns whether `ty` mentions any of the fixed variables.
pub(crate) fn mentions_fixed<'a>(ty: &Ty, fixed: &'a [FixedVar]) -> Option<&'a FixedVar> {
  match ty {
    Ty::FixedVar(fv) => fixed.iter().find(|x| *x == fv),
    Ty::BoundVar(_) | Ty::MetaVar(_) => None,
    Ty::Record(rows) => rows.values().find_map(|ty| mentions_fixed(ty, fixed)),
    Ty::Con(args, _) => args.iter().find_map(|ty| mentions_fixed(ty, fixed)),
    Ty::Fn(param, res) => mentions_fixed(param, fixed).or_else(|| mentions_fixed(res, fixed)),
  }
}

/// Returns whether the expression is non-expansive, i.e. whether its type may be generalized.
pub(crate) fn is_non_expansive(state: &State, exp: &Exp) -> bool {
  match &exp.kind {
    ExpKind::SCon(_) | ExpKind::Path(_) | ExpKind::Fn(_) => true,
    ExpKind::Record(rows) => rows.iter().all(|(_, exp)| is_non_expansive(state, exp)),
    ExpKind::Typed(exp, _) => is_non_expansive(state, exp),
    ExpKind::App(func, arg) => {
      let is_con = match &func.kind {
        ExpKind::Path(path) => path.last.as_str() != "ref"
          && try_get_val(state, path).is_some_and(|vi| vi.id_status.is_con()),
        _ => false,
      };
      is_con && is_non_expansive(state, arg)
    }
    ExpKind::Let(_, _) | ExpKind::Handle(_, _) | ExpKind::Raise(_) => false,
  }
}

/// Collects the type variables mentioned in the value bindings that are not already in scope,
/// for implicit scoping.
pub(crate) fn implicit_ty_vars(cx: &Cx, binds: &[sml_hir::ValBind]) -> Vec<TyVar> {
  let mut ac = Vec::<&TyVar>::new();
  for bind in binds {
    pat_ty_vars(&bind.pat, &mut ac);
    exp_ty_vars(&bind.exp, &mut ac);
  }
  ac.into_iter().filter(|tv| cx.ty_var(tv).is_none()).cloned().collect()
}

fn pat_ty_vars<'a>(pat: &'a Pat, ac: &mut Vec<&'a TyVar>) {
  match &pat.kind {
    PatKind::Wild | PatKind::SCon(_) | PatKind::Con(_, None) => {}
    PatKind::Con(_, Some(pat)) | PatKind::As(_, pat) => pat_ty_vars(pat, ac),
    PatKind::Record(rows, _) => {
      for pat in rows.values() {
        pat_ty_vars(pat, ac);
      }
    }
    PatKind::Typed(pat, ty) => {
      pat_ty_vars(pat, ac);
      ty.ty_vars(ac);
    }
  }
}

fn exp_ty_vars<'a>(exp: &'a Exp, ac: &mut Vec<&'a TyVar>) {
  match &exp.kind {
    ExpKind::SCon(_) | ExpKind::Path(_) => {}
    ExpKind::Record(rows) => {
      for (_, exp) in rows {
        exp_ty_vars(exp, ac);
      }
    }
    ExpKind::Let(decs, exp) => {
      for dec in decs.iter() {
        if let DecKind::Val(_, binds) = &dec.kind {
          for bind in binds {
            pat_ty_vars(&bind.pat, ac);
            exp_ty_vars(&bind.exp, ac);
          }
        }
      }
      exp_ty_vars(exp, ac);
    }
    ExpKind::App(a, b) => {
      exp_ty_vars(a, ac);
      exp_ty_vars(b, ac);
    }
    ExpKind::Handle(exp, matcher) => {
      exp_ty_vars(exp, ac);
      for arm in &matcher.arms {
        pat_ty_vars(&arm.pat, ac);
        exp_ty_vars(&arm.exp, ac);
      }
    }
    ExpKind::Raise(exp) => exp_ty_vars(exp, ac),
    ExpKind::Fn(matcher) => {
      for arm in &matcher.arms {
        pat_ty_vars(&arm.pat, ac);
        exp_ty_vars(&arm.exp, ac);
      }
    }
    ExpKind::Typed(exp, ty) => {
      exp_ty_vars(exp, ac);
      ty.ty_vars(ac);
    }
  }
}

/// Errors if any of the type variables in `ty` are not in `params`.
pub(crate) fn check_guarded(pos: usize, ty: &sml_hir::Ty, params: &[TyVar]) -> Result<()> {
  let mut ac = Vec::new();
  ty.ty_vars(&mut ac);
  let unguarded: Vec<_> = ac.into_iter().filter(|tv| !params.contains(tv)).cloned().collect();
  if unguarded.is_empty() {
    Ok(())
  } else {
    Err(Error { pos, kind: ErrorKind::Unguarded(unguarded) })
  }
}

/// Returns fixed variables for type binding parameters, erroring on duplicates.
pub(crate) fn params(st: &mut St<'_>, pos: usize, ty_vars: &[TyVar]) -> Result<Vec<FixedVar>> {
  let mut ret = Vec::<FixedVar>::with_capacity(ty_vars.len());
  for (idx, tv) in ty_vars.iter().enumerate() {
    if ty_vars[..idx].contains(tv) {
      return Err(Error { pos, kind: ErrorKind::Duplicate(Item::TyVar, tv.as_name().clone()) });
    }
    ret.push(st.fresh_fixed(tv.as_name().clone()));
  }
  Ok(ret)
}

/// Returns a cx with only the parameters in scope.
pub(crate) fn params_cx(rank: u32, ty_vars: &[TyVar], fixed: &[FixedVar]) -> Cx {
  let ty_vars = ty_vars.iter().cloned().zip(fixed.iter().cloned()).collect();
  Cx { rank, ty_vars }
}

/// Moves the type constructor info from a scope that is ending into `state`.
pub(crate) fn absorb_ty_cons(state: &State, inner: &State) {
  state.extend_ty_cons(inner.ty_cons_since(inner.id()));
}
