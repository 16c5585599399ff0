//! Elaborating structures, signatures, and functors.

use crate::dec::{self, get_dat_binds, get_dat_copy, ty_fn};
use crate::error::{Error, ErrorKind, Item};
use crate::st::St;
use crate::util::{Cx, Result, absorb_ty_cons, get_str, params, undefined};
use fast_hash::FxHashMap;
use sml_hir::{Ascription, FunctorBind, SigBind, SigExpKind, SpecKind, StrBind, StrExpKind};
use sml_state::{State, StaticFunctor};
use sml_statics_types::env::{Env, IdStatus, Sig, TyConInfo, TyInfo, ValEnv, ValInfo};
use sml_statics_types::ty::{Equality, FixedVar, Ty, TyCon, TyScheme};
use std::rc::Rc;
use str_util::Name;

/// A mapping from the flexible type constructors of a signature to what they stand for.
type Realization = FxHashMap<TyCon, TyScheme>;

pub(crate) fn get_str_binds(
  st: &mut St<'_>,
  cx: &Cx,
  state: &State,
  binds: &[StrBind],
) -> Result<()> {
  let mut done = Vec::<(Name, Env)>::with_capacity(binds.len());
  for bind in binds {
    if done.iter().any(|(name, _)| *name == bind.name) {
      let kind = ErrorKind::Duplicate(Item::Struct, bind.name.clone());
      return Err(Error { pos: bind.str_exp.pos, kind });
    }
    let env = get_str_exp(st, cx, state, &bind.str_exp)?;
    done.push((bind.name.clone(), env));
  }
  for (name, env) in done {
    state.set_static_str(name, env);
  }
  Ok(())
}

pub(crate) fn get_sig_binds(st: &mut St<'_>, state: &State, binds: &[SigBind]) -> Result<()> {
  let mut done = Vec::<(Name, Sig)>::with_capacity(binds.len());
  for bind in binds {
    if done.iter().any(|(name, _)| *name == bind.name) {
      let kind = ErrorKind::Duplicate(Item::Sig, bind.name.clone());
      return Err(Error { pos: bind.sig_exp.pos, kind });
    }
    let sig = get_sig_exp(st, state, &bind.sig_exp)?;
    done.push((bind.name.clone(), sig));
  }
  for (name, sig) in done {
    state.set_sig(name, sig);
  }
  Ok(())
}

pub(crate) fn get_functor_binds(
  st: &mut St<'_>,
  state: &State,
  pos: usize,
  binds: &[FunctorBind],
) -> Result<()> {
  if st.functor_depth > 0 {
    return Err(Error { pos, kind: ErrorKind::Unsupported("functor declarations inside functors") });
  }
  let mut done = Vec::<(Name, Rc<StaticFunctor>)>::with_capacity(binds.len());
  for bind in binds {
    if done.iter().any(|(name, _)| *name == bind.name) {
      return Err(Error { pos, kind: ErrorKind::Duplicate(Item::Functor, bind.name.clone()) });
    }
    let param_sig = get_sig_exp(st, state, &bind.param_sig)?;
    // check the body once now, against the signature alone.
    let scope = state.nested();
    scope.set_static_str(bind.param.clone(), param_sig.env.clone());
    st.functor_depth += 1;
    let res = get_str_exp(st, &Cx::default(), &scope, &bind.body);
    st.functor_depth -= 1;
    res?;
    let functor = StaticFunctor {
      param: bind.param.clone(),
      param_sig,
      body: Rc::clone(&bind.body),
      state: state.clone(),
    };
    done.push((bind.name.clone(), Rc::new(functor)));
  }
  for (name, functor) in done {
    state.set_static_functor(name, functor);
  }
  Ok(())
}

fn get_str_exp(st: &mut St<'_>, cx: &Cx, state: &State, str_exp: &sml_hir::StrExp) -> Result<Env> {
  match &str_exp.kind {
    StrExpKind::Struct(decs) => {
      let inner = state.nested();
      dec::get_decs(st, cx, &inner, decs)?;
      absorb_ty_cons(state, &inner);
      Ok(inner.static_env_since(inner.id()))
    }
    StrExpKind::Path(path) => get_str(state, str_exp.pos, path),
    StrExpKind::Ascription(inner, ascription, sig_exp) => {
      let env = get_str_exp(st, cx, state, inner)?;
      let sig = get_sig_exp(st, state, sig_exp)?;
      let (realized, realization) = match_sig(st, state, str_exp.pos, &env, &sig)?;
      Ok(match ascription {
        Ascription::Transparent => realized,
        Ascription::Opaque => opaque(st, state, &sig, &realization),
      })
    }
    StrExpKind::App(name, arg) => {
      let Some(functor) = state.static_functor(name.as_str()) else {
        return Err(undefined(str_exp.pos, Item::Functor, name));
      };
      let arg_env = get_str_exp(st, cx, state, arg)?;
      let (param_env, _) = match_sig(st, state, str_exp.pos, &arg_env, &functor.param_sig)?;
      // the body is elaborated again, so its datatypes are new at each application.
      let scope = functor.state.nested();
      let mut ty_cons = Vec::<TyCon>::new();
      env_ty_cons(&param_env, &mut |tc| ty_cons.push(tc.clone()));
      for tc in ty_cons {
        if let Some(info) = state.ty_con_info(&tc) {
          scope.set_ty_con_info(tc, info);
        }
      }
      scope.set_static_str(functor.param.clone(), param_env);
      st.replaying += 1;
      let res = get_str_exp(st, &Cx::default(), &scope, &functor.body);
      st.replaying -= 1;
      let env = res?;
      absorb_ty_cons(state, &scope);
      Ok(env)
    }
    StrExpKind::Let(decs, inner) => {
      let scope = state.nested();
      dec::get_decs(st, cx, &scope, decs)?;
      let env = get_str_exp(st, cx, &scope, inner)?;
      absorb_ty_cons(state, &scope);
      Ok(env)
    }
  }
}

fn get_sig_exp(st: &mut St<'_>, state: &State, sig_exp: &sml_hir::SigExp) -> Result<Sig> {
  match &sig_exp.kind {
    SigExpKind::Name(name) => {
      state.sig(name.as_str()).ok_or_else(|| undefined(sig_exp.pos, Item::Sig, name))
    }
    SigExpKind::Spec(specs) => {
      let inner = state.nested();
      for spec in specs {
        get_spec(st, &inner, spec)?;
      }
      let ty_con_env = inner.ty_cons_since(inner.id());
      absorb_ty_cons(state, &inner);
      Ok(Sig {
        ty_cons: ty_con_env.keys().cloned().collect(),
        ty_con_env,
        env: inner.static_env_since(inner.id()),
      })
    }
  }
}

fn get_spec(st: &mut St<'_>, state: &State, spec: &sml_hir::Spec) -> Result<()> {
  match &spec.kind {
    SpecKind::Val(vals) => {
      for (name, ty) in vals {
        if state.static_val_limited(name.as_str(), state.id()).is_some() {
          return Err(Error { pos: spec.pos, kind: ErrorKind::Duplicate(Item::Val, name.clone()) });
        }
        let mut ty_vars = Vec::new();
        ty.ty_vars(&mut ty_vars);
        let ty_vars: Vec<_> = ty_vars.into_iter().cloned().collect();
        let ty_scheme = ty_fn(st, state, spec.pos, &ty_vars, ty)?;
        state.set_static_val(name.clone(), ValInfo { ty_scheme, id_status: IdStatus::Val });
      }
    }
    SpecKind::Ty(descs, eq) => {
      for desc in descs {
        let ty_scheme = match &desc.ty {
          Some(ty) => ty_fn(st, state, spec.pos, &desc.ty_vars, ty)?,
          None => {
            let fixed = params(st, spec.pos, &desc.ty_vars)?;
            let tc = st.fresh_ty_con(desc.name.clone());
            let equality = if *eq { Equality::IfArgs } else { Equality::Never };
            let info = TyConInfo { arity: fixed.len(), equality, cons: Vec::new() };
            state.set_ty_con_info(tc.clone(), info);
            TyScheme::n_ary(fixed.iter().map(FixedVar::is_equality).collect(), tc)
          }
        };
        state.set_static_ty(desc.name.clone(), TyInfo { ty_scheme, val_env: ValEnv::default() });
      }
    }
    SpecKind::Datatype(binds) => {
      get_dat_binds(st, state, binds)?;
    }
    SpecKind::DatatypeCopy(name, path) => get_dat_copy(state, spec.pos, name, path)?,
    SpecKind::Exception(cons) => {
      for con in cons {
        let ty = match &con.ty {
          None => Ty::exn(),
          Some(ty) => Ty::fun(crate::ty::get(&Cx::default(), state, ty)?, Ty::exn()),
        };
        let vi = ValInfo { ty_scheme: TyScheme::zero(ty), id_status: IdStatus::Exn };
        state.set_static_val(con.name.clone(), vi);
      }
    }
    SpecKind::Structure(strs) => {
      for (name, sig_exp) in strs {
        let sig = get_sig_exp(st, state, sig_exp)?;
        state.extend_ty_cons(sig.ty_con_env);
        state.set_static_str(name.clone(), sig.env);
      }
    }
    SpecKind::Include(sig_exp) => {
      let sig = get_sig_exp(st, state, sig_exp)?;
      state.extend_ty_cons(sig.ty_con_env);
      state.extend_static(sig.env);
    }
  }
  Ok(())
}

/// Matches the structure env against the signature, returning the signature env with its
/// flexible type constructors realized, and the realization.
fn match_sig(
  st: &mut St<'_>,
  state: &State,
  pos: usize,
  env: &Env,
  sig: &Sig,
) -> Result<(Env, Realization)> {
  let mut realization = Realization::default();
  realize(st, state, pos, sig, &sig.env, env, &mut realization)?;
  let realized = sig.env.realize(&|tc| realization.get(tc).cloned());
  check_env(st, state, pos, &realized, env)?;
  Ok((realized, realization))
}

fn realize(
  st: &mut St<'_>,
  state: &State,
  pos: usize,
  sig: &Sig,
  sig_env: &Env,
  env: &Env,
  ac: &mut Realization,
) -> Result<()> {
  for (name, want) in &sig_env.ty_env {
    let Some(got) = env.ty_env.get(name) else {
      return Err(Error { pos, kind: ErrorKind::Missing(Item::Ty, name.clone()) });
    };
    let (want_n, got_n) = (want.ty_scheme.bound.len(), got.ty_scheme.bound.len());
    if want_n != got_n {
      return Err(Error { pos, kind: ErrorKind::WrongNumTyArgs(want_n, got_n) });
    }
    let Some(tc) = flexible(sig, &want.ty_scheme) else { continue };
    let is_eqtype = sig.ty_con_env.get(tc).is_some_and(|info| info.equality != Equality::Never);
    if is_eqtype {
      let args = fixed_args(st, &vec![true; got_n]);
      st.make_equality(state, pos, &got.ty_scheme.apply(&args))?;
    }
    ac.insert(tc.clone(), got.ty_scheme.clone());
  }
  for (name, sig_env) in &sig_env.str_env {
    let Some(env) = env.str_env.get(name) else {
      return Err(Error { pos, kind: ErrorKind::Missing(Item::Struct, name.clone()) });
    };
    realize(st, state, pos, sig, sig_env, env, ac)?;
  }
  Ok(())
}

/// Returns the flexible type constructor the scheme is, if it is exactly one applied to the
/// bound variables in order.
fn flexible<'a>(sig: &Sig, scheme: &'a TyScheme) -> Option<&'a TyCon> {
  let Ty::Con(args, tc) = &scheme.ty else { return None };
  let is_params = args.len() == scheme.bound.len()
    && args.iter().enumerate().all(|(idx, ty)| *ty == Ty::BoundVar(idx));
  (is_params && sig.ty_cons.contains(tc)).then_some(tc)
}

/// Checks the structure env has everything the realized signature env requires.
fn check_env(st: &mut St<'_>, state: &State, pos: usize, want: &Env, got: &Env) -> Result<()> {
  for (name, want) in &want.ty_env {
    let Some(got) = got.ty_env.get(name) else {
      return Err(Error { pos, kind: ErrorKind::Missing(Item::Ty, name.clone()) });
    };
    let args = fixed_args(st, &want.ty_scheme.bound);
    st.unify(state, pos, &want.ty_scheme.apply(&args), &got.ty_scheme.apply(&args))?;
  }
  for (name, want) in &want.val_env {
    let Some(got) = got.val_env.get(name) else {
      let item = match want.id_status {
        IdStatus::Con => Item::Con,
        IdStatus::Exn => Item::Exn,
        IdStatus::Val => Item::Val,
      };
      return Err(Error { pos, kind: ErrorKind::Missing(item, name.clone()) });
    };
    if want.id_status.is_con() && want.id_status != got.id_status {
      return Err(Error { pos, kind: ErrorKind::WrongIdStatus(name.clone()) });
    }
    let args = fixed_args(st, &want.ty_scheme.bound);
    let want_ty = want.ty_scheme.apply(&args);
    let got_ty = st.subst.instantiate(&got.ty_scheme, 0);
    if st.unify(state, pos, &want_ty, &got_ty).is_err() {
      let kind =
        ErrorKind::NotInstance(name.clone(), want.ty_scheme.display(), got.ty_scheme.display());
      return Err(Error { pos, kind });
    }
  }
  for (name, want) in &want.str_env {
    let Some(got) = got.str_env.get(name) else {
      return Err(Error { pos, kind: ErrorKind::Missing(Item::Struct, name.clone()) });
    };
    check_env(st, state, pos, want, got)?;
  }
  Ok(())
}

/// Returns fresh fixed variables to stand for bound variables.
fn fixed_args(st: &mut St<'_>, bound: &[bool]) -> Vec<Ty> {
  bound
    .iter()
    .enumerate()
    .map(|(idx, &equality)| {
      let letter = char::from(b'a' + u8::try_from(idx % 26).unwrap_or(0));
      let name = if equality { format!("''{letter}") } else { format!("'{letter}") };
      Ty::FixedVar(st.fresh_fixed(Name::new(name)))
    })
    .collect()
}

/// Returns the signature env with each flexible type constructor that is not a datatype
/// replaced by a new abstract one.
fn opaque(st: &mut St<'_>, state: &State, sig: &Sig, realization: &Realization) -> Env {
  let mut ty_cons: Vec<_> = sig.ty_cons.iter().collect();
  ty_cons.sort_unstable();
  let mut map = Realization::default();
  for tc in ty_cons {
    match sig.ty_con_env.get(tc) {
      Some(info) if info.cons.is_empty() => {
        let new = st.fresh_ty_con(tc.name.clone());
        let new_info = TyConInfo { arity: info.arity, equality: info.equality, cons: Vec::new() };
        state.set_ty_con_info(new.clone(), new_info);
        map.insert(tc.clone(), TyScheme::n_ary(vec![false; info.arity], new));
      }
      _ => {
        if let Some(scheme) = realization.get(tc) {
          map.insert(tc.clone(), scheme.clone());
        }
      }
    }
  }
  sig.env.realize(&|tc| map.get(tc).cloned())
}

fn env_ty_cons<F>(env: &Env, f: &mut F)
where
  F: FnMut(&TyCon),
{
  for ti in env.ty_env.values() {
    ti.ty_scheme.ty.ty_cons(f);
  }
  for vi in env.val_env.values() {
    vi.ty_scheme.ty.ty_cons(f);
  }
  for env in env.str_env.values() {
    env_ty_cons(env, f);
  }
}
