//! Elaborating declarations.

use crate::error::{Error, ErrorKind, Item, WarningKind};
use crate::st::{MatchKind, St};
use crate::util::{
  Cx, Result, abstract_fixed, absorb_ty_cons, check_guarded, check_rebind, get_str, get_ty,
  get_val, implicit_ty_vars, is_non_expansive, mentions_fixed, params, params_cx,
};
use crate::{exp, pat, top_dec, ty};
use sml_hir::{DatBind, DecKind, ExBind, PatKind, ValBind};
use sml_state::State;
use sml_statics_types::env::{ConInfo, IdStatus, TyConInfo, TyInfo, ValEnv, ValInfo};
use sml_statics_types::ty::{Equality, FixedVar, Ty, TyCon, TyScheme};
use str_util::Name;

pub(crate) fn get_decs(
  st: &mut St<'_>,
  cx: &Cx,
  state: &State,
  decs: &[sml_hir::Dec],
) -> Result<()> {
  for dec in decs {
    get(st, cx, state, dec)?;
  }
  Ok(())
}

fn get(st: &mut St<'_>, cx: &Cx, state: &State, dec: &sml_hir::Dec) -> Result<()> {
  match &dec.kind {
    DecKind::Val(explicit, binds) => get_val_dec(st, cx, state, dec.pos, explicit, binds),
    DecKind::Ty(binds) => {
      let mut done = Vec::<(Name, TyInfo)>::with_capacity(binds.len());
      for bind in binds {
        if done.iter().any(|(name, _)| *name == bind.name) {
          let kind = ErrorKind::Duplicate(Item::Ty, bind.name.clone());
          return Err(Error { pos: dec.pos, kind });
        }
        let ty_scheme = ty_fn(st, state, dec.pos, &bind.ty_vars, &bind.ty)?;
        done.push((bind.name.clone(), TyInfo { ty_scheme, val_env: ValEnv::default() }));
      }
      for (name, ty_info) in done {
        state.set_static_ty(name, ty_info);
      }
      Ok(())
    }
    DecKind::Datatype(binds) => {
      get_dat_binds(st, state, binds)?;
      Ok(())
    }
    DecKind::DatatypeCopy(name, path) => get_dat_copy(state, dec.pos, name, path),
    DecKind::Abstype(binds, decs) => {
      let inner = state.nested();
      let ty_cons = get_dat_binds(st, &inner, binds)?;
      get_decs(st, cx, &inner, decs)?;
      let mut env = inner.static_env_since(inner.id());
      for bind in binds {
        for con in &bind.cons {
          if env.val_env.get(&con.name).is_some_and(|vi| vi.id_status == IdStatus::Con) {
            env.val_env.remove(&con.name);
          }
        }
        if let Some(ty_info) = env.ty_env.get_mut(&bind.name) {
          ty_info.val_env = ValEnv::default();
        }
      }
      state.extend_static(env);
      absorb_ty_cons(state, &inner);
      for tc in ty_cons {
        if let Some(mut info) = state.ty_con_info(&tc) {
          info.equality = Equality::Never;
          info.cons = Vec::new();
          state.set_ty_con_info(tc, info);
        }
      }
      Ok(())
    }
    DecKind::Exception(binds) => {
      let mut done = Vec::<(Name, ValInfo)>::with_capacity(binds.len());
      for bind in binds {
        let (name, vi) = match bind {
          ExBind::New(name, arg) => {
            let ty = match arg {
              None => Ty::exn(),
              Some(arg) => {
                let in_scope: Vec<_> = cx.ty_vars.iter().map(|(tv, _)| tv.clone()).collect();
                check_guarded(arg.pos, arg, &in_scope)?;
                Ty::fun(ty::get(cx, state, arg)?, Ty::exn())
              }
            };
            (name, ValInfo { ty_scheme: TyScheme::zero(ty), id_status: IdStatus::Exn })
          }
          ExBind::Copy(name, path) => {
            let vi = get_val(st, state, dec.pos, path)?;
            if vi.id_status != IdStatus::Exn {
              return Err(Error { pos: dec.pos, kind: ErrorKind::ExnCopyNotExn(path.clone()) });
            }
            (name, vi)
          }
        };
        check_rebind(state, dec.pos, name, IdStatus::Exn)?;
        if done.iter().any(|(n, _)| n == name) {
          return Err(Error { pos: dec.pos, kind: ErrorKind::Duplicate(Item::Exn, name.clone()) });
        }
        done.push((name.clone(), vi));
      }
      for (name, vi) in done {
        state.set_static_val(name, vi);
      }
      Ok(())
    }
    DecKind::Local(fst_decs, snd_decs) => {
      let fst = state.nested();
      get_decs(st, cx, &fst, fst_decs)?;
      let snd = fst.nested();
      get_decs(st, cx, &snd, snd_decs)?;
      state.absorb(&snd, snd.id());
      absorb_ty_cons(state, &fst);
      Ok(())
    }
    DecKind::Open(paths) => {
      for path in paths {
        let env = get_str(state, dec.pos, path)?;
        state.extend_static(env);
      }
      Ok(())
    }
    DecKind::Fixity(fixity, names) => {
      for name in names {
        state.set_fixity(name.clone(), *fixity);
      }
      Ok(())
    }
    DecKind::Structure(binds) => top_dec::get_str_binds(st, cx, state, binds),
    DecKind::Signature(binds) => top_dec::get_sig_binds(st, state, binds),
    DecKind::Functor(binds) => top_dec::get_functor_binds(st, state, dec.pos, binds),
  }
}

fn get_val_dec(
  st: &mut St<'_>,
  cx: &Cx,
  state: &State,
  pos: usize,
  explicit: &[sml_hir::TyVar],
  binds: &[ValBind],
) -> Result<()> {
  let mut ty_vars = explicit.to_vec();
  for tv in implicit_ty_vars(cx, binds) {
    if !ty_vars.contains(&tv) {
      ty_vars.push(tv);
    }
  }
  let fixed = params(st, pos, &ty_vars)?;
  let mut inner_cx = cx.clone();
  inner_cx.rank += 1;
  inner_cx.ty_vars.extend(ty_vars.into_iter().zip(fixed.iter().cloned()));
  // every bind from the first `rec` one on is recursive.
  let split = binds.iter().position(|bind| bind.rec).unwrap_or(binds.len());
  let mut groups = Vec::<(usize, pat::Binds, bool)>::with_capacity(binds.len());
  for bind in &binds[..split] {
    let mut names = pat::Binds::new();
    let (pm, want) = pat::get(st, &inner_cx, state, &mut names, &bind.pat)?;
    let got = exp::get(st, &inner_cx, state, &bind.exp)?;
    st.unify(state, bind.exp.pos, &want, &got)?;
    let display = bind.pat.display().to_string();
    st.insert_match(state, bind.pat.pos, MatchKind::Bind, vec![pm], vec![display]);
    groups.push((bind.pat.pos, names, is_non_expansive(state, &bind.exp)));
  }
  if split < binds.len() {
    let scope = state.nested();
    let mut rec_tys = Vec::<(Name, Ty)>::with_capacity(binds.len() - split);
    for bind in &binds[split..] {
      let Some((name, annotations)) = rec_name(&bind.pat) else {
        return Err(Error { pos: bind.pat.pos, kind: ErrorKind::RecPatNotName });
      };
      check_rebind(state, bind.pat.pos, name, IdStatus::Val)?;
      if state.static_val(name.as_str()).is_some_and(|vi| vi.id_status.is_con()) {
        return Err(Error { pos: bind.pat.pos, kind: ErrorKind::RecPatNotName });
      }
      let ty = st.subst.fresh(inner_cx.rank);
      for annotation in annotations {
        let want = ty::get(&inner_cx, state, annotation)?;
        st.unify(state, annotation.pos, &want, &ty)?;
      }
      let vi = ValInfo { ty_scheme: TyScheme::zero(ty.clone()), id_status: IdStatus::Val };
      scope.set_static_val(name.clone(), vi);
      rec_tys.push((name.clone(), ty));
    }
    for (bind, (name, ty)) in binds[split..].iter().zip(rec_tys) {
      let got = exp::get(st, &inner_cx, &scope, &bind.exp)?;
      st.unify(state, bind.exp.pos, &ty, &got)?;
      groups.push((bind.pat.pos, vec![(name, ty)], is_non_expansive(state, &bind.exp)));
    }
    absorb_ty_cons(state, &scope);
  }
  let mut done = Vec::<(Name, ValInfo)>::new();
  for (pos, names, non_expansive) in groups {
    for (name, ty) in names {
      if done.iter().any(|(n, _)| *n == name) {
        return Err(Error { pos, kind: ErrorKind::Duplicate(Item::Val, name) });
      }
      let ty_scheme = if non_expansive {
        st.subst
          .generalize(&ty, cx.rank, &fixed)
          .map_err(|_| Error { pos, kind: ErrorKind::UnresolvedRecordTy })?
      } else {
        monomorphic(st, cx, state, pos, &ty, &fixed)?
      };
      done.push((name, ValInfo { ty_scheme, id_status: IdStatus::Val }));
    }
  }
  for (name, vi) in done {
    state.set_static_val(name, vi);
  }
  Ok(())
}

/// Returns the name a `val rec` pattern binds, and the type annotations on it.
fn rec_name(pat: &sml_hir::Pat) -> Option<(&Name, Vec<&sml_hir::Ty>)> {
  match &pat.kind {
    PatKind::Con(path, None) if path.is_one() => Some((&path.last, Vec::new())),
    PatKind::Typed(inner, ty) => {
      let (name, mut annotations) = rec_name(inner)?;
      annotations.push(ty);
      Some((name, annotations))
    }
    _ => None,
  }
}

/// Returns the type of an expansive binding, which is not generalized.
///
/// At the top level, meta variables left over are solved with fresh dummy types.
fn monomorphic(
  st: &mut St<'_>,
  cx: &Cx,
  state: &State,
  pos: usize,
  ty: &Ty,
  fixed: &[FixedVar],
) -> Result<TyScheme> {
  st.subst.lower_ranks(ty, cx.rank);
  if cx.rank == 0 {
    st.subst.default_overloads(ty);
    let mut dummies = Vec::<String>::new();
    for mv in st.subst.meta_vars(ty) {
      let (equality, record) = match st.subst.unsolved(mv) {
        None => continue,
        Some(u) => (u.equality, u.record.is_some()),
      };
      if record {
        return Err(Error { pos, kind: ErrorKind::UnresolvedRecordTy });
      }
      let tc = st.fresh_dummy(state, equality);
      dummies.push(tc.name.to_string());
      st.subst.set_solved(mv, tc.into_ty());
    }
    if !dummies.is_empty() {
      cov_mark::hit("dummy_tys");
      st.warn(pos, WarningKind::DummyTys(dummies));
    }
  }
  let ty = st.subst.apply(ty);
  if let Some(fv) = mentions_fixed(&ty, fixed) {
    return Err(Error { pos, kind: ErrorKind::TyVarNotGeneralized(fv.name.clone()) });
  }
  Ok(TyScheme::zero(ty))
}

/// Elaborates a type function, like the right side of `type 'a t = 'a list`.
pub(crate) fn ty_fn(
  st: &mut St<'_>,
  state: &State,
  pos: usize,
  ty_vars: &[sml_hir::TyVar],
  ty: &sml_hir::Ty,
) -> Result<TyScheme> {
  let fixed = params(st, pos, ty_vars)?;
  check_guarded(ty.pos, ty, ty_vars)?;
  let ty = ty::get(&params_cx(0, ty_vars, &fixed), state, ty)?;
  Ok(abstract_fixed(&ty, &fixed))
}

/// Elaborates `datatype t = datatype u`.
pub(crate) fn get_dat_copy(
  state: &State,
  pos: usize,
  name: &Name,
  path: &sml_hir::Path,
) -> Result<()> {
  let ty_info = get_ty(state, pos, path)?;
  if ty_info.val_env.is_empty() {
    return Err(Error { pos, kind: ErrorKind::DatatypeCopyNotDatatype(path.clone()) });
  }
  for (con, vi) in &ty_info.val_env {
    state.set_static_val(con.clone(), vi.clone());
  }
  state.set_static_ty(name.clone(), ty_info);
  Ok(())
}

/// Elaborates the datatype bindings into `state`, returning their new type constructors.
pub(crate) fn get_dat_binds(
  st: &mut St<'_>,
  state: &State,
  binds: &[DatBind],
) -> Result<Vec<TyCon>> {
  let mut heads = Vec::<(TyCon, Vec<FixedVar>)>::with_capacity(binds.len());
  for (idx, bind) in binds.iter().enumerate() {
    if binds[..idx].iter().any(|b| b.name == bind.name) {
      return Err(Error { pos: bind.pos, kind: ErrorKind::Duplicate(Item::Ty, bind.name.clone()) });
    }
    let fixed = params(st, bind.pos, &bind.ty_vars)?;
    let tc = st.fresh_ty_con(bind.name.clone());
    // so the constructors may mention the types being declared.
    let ty_scheme = TyScheme::n_ary(fixed.iter().map(FixedVar::is_equality).collect(), tc.clone());
    state.set_static_ty(bind.name.clone(), TyInfo { ty_scheme, val_env: ValEnv::default() });
    heads.push((tc, fixed));
  }
  let mut seen = Vec::<&Name>::new();
  let mut all_cons = Vec::<(Vec<ConInfo>, ValEnv)>::with_capacity(binds.len());
  for (bind, (tc, fixed)) in binds.iter().zip(&heads) {
    let cx = params_cx(0, &bind.ty_vars, fixed);
    let res = Ty::Con(fixed.iter().cloned().map(Ty::FixedVar).collect(), tc.clone());
    let mut cons = Vec::<ConInfo>::with_capacity(bind.cons.len());
    let mut val_env = ValEnv::default();
    for con in &bind.cons {
      if seen.contains(&&con.name) {
        let kind = ErrorKind::Duplicate(Item::Con, con.name.clone());
        return Err(Error { pos: bind.pos, kind });
      }
      seen.push(&con.name);
      check_rebind(state, bind.pos, &con.name, IdStatus::Con)?;
      let (ty, arg) = match &con.ty {
        None => (res.clone(), None),
        Some(ty) => {
          check_guarded(ty.pos, ty, &bind.ty_vars)?;
          let arg = ty::get(&cx, state, ty)?;
          let abstracted = abstract_fixed(&arg, fixed).ty;
          (Ty::fun(arg, res.clone()), Some(abstracted))
        }
      };
      cons.push(ConInfo { name: con.name.clone(), arg });
      let vi = ValInfo { ty_scheme: abstract_fixed(&ty, fixed), id_status: IdStatus::Con };
      val_env.insert(con.name.clone(), vi);
    }
    all_cons.push((cons, val_env));
  }
  let equality = dat_equality(st.options.real_equality, state, &heads, &all_cons);
  for ((bind, (tc, fixed)), ((cons, val_env), equality)) in
    binds.iter().zip(&heads).zip(all_cons.into_iter().zip(equality))
  {
    state.set_ty_con_info(tc.clone(), TyConInfo { arity: fixed.len(), equality, cons });
    for (name, vi) in &val_env {
      state.set_static_val(name.clone(), vi.clone());
    }
    let ty_scheme = TyScheme::n_ary(fixed.iter().map(FixedVar::is_equality).collect(), tc.clone());
    state.set_static_ty(bind.name.clone(), TyInfo { ty_scheme, val_env });
  }
  Ok(heads.into_iter().map(|(tc, _)| tc).collect())
}

/// Returns whether each of the mutually recursive datatypes admits equality, assuming it does
/// until one of its constructors shows otherwise.
fn dat_equality(
  real_equality: bool,
  state: &State,
  heads: &[(TyCon, Vec<FixedVar>)],
  all_cons: &[(Vec<ConInfo>, ValEnv)],
) -> Vec<Equality> {
  let mut ret = vec![Equality::IfArgs; heads.len()];
  loop {
    let mut changed = false;
    for (idx, (cons, _)) in all_cons.iter().enumerate() {
      if ret[idx] == Equality::Never {
        continue;
      }
      let eq = EqCx { real_equality, state, heads, equality: &ret };
      if !cons.iter().filter_map(|con| con.arg.as_ref()).all(|arg| eq.admits(arg)) {
        ret[idx] = Equality::Never;
        changed = true;
      }
    }
    if !changed {
      return ret;
    }
  }
}

struct EqCx<'a> {
  real_equality: bool,
  state: &'a State,
  heads: &'a [(TyCon, Vec<FixedVar>)],
  equality: &'a [Equality],
}

impl EqCx<'_> {
  fn admits(&self, ty: &Ty) -> bool {
    match ty {
      Ty::BoundVar(_) | Ty::FixedVar(_) => true,
      Ty::MetaVar(_) | Ty::Fn(_, _) => false,
      Ty::Record(rows) => rows.values().all(|ty| self.admits(ty)),
      Ty::Con(args, tc) => {
        let eq = match self.heads.iter().position(|(x, _)| x == tc) {
          Some(idx) => self.equality[idx],
          None if *tc == TyCon::builtin("real") => {
            if self.real_equality {
              Equality::Always
            } else {
              Equality::Never
            }
          }
          None => self.state.ty_con_equality(tc),
        };
        match eq {
          Equality::Always => true,
          Equality::Never => false,
          Equality::IfArgs => args.iter().all(|ty| self.admits(ty)),
        }
      }
    }
  }
}
