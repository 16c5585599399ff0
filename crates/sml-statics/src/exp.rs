//! Elaborating expressions.

use crate::pat;
use crate::st::{MatchKind, St};
use crate::util::{Cx, Result, absorb_ty_cons, get_val};
use sml_hir::{ExpKind, MatchFlavor, SCon};
use sml_state::State;
use sml_statics_types::env::{IdStatus, ValInfo};
use sml_statics_types::ty::{Ty, TyScheme};

pub(crate) fn get(st: &mut St<'_>, cx: &Cx, state: &State, exp: &sml_hir::Exp) -> Result<Ty> {
  match &exp.kind {
    ExpKind::SCon(scon) => Ok(match scon {
      SCon::Int(_) => Ty::int(),
      SCon::Real(_) => Ty::real(),
      SCon::Word(_) => Ty::word(),
      SCon::Char(_) => Ty::char(),
      SCon::String(_) => Ty::string(),
    }),
    ExpKind::Path(path) => {
      let vi = get_val(st, state, exp.pos, path)?;
      Ok(st.subst.instantiate(&vi.ty_scheme, cx.rank))
    }
    ExpKind::Record(rows) => {
      let mut tys = std::collections::BTreeMap::new();
      for (lab, exp) in rows {
        let ty = get(st, cx, state, exp)?;
        tys.insert(lab.clone(), ty);
      }
      Ok(Ty::Record(tys))
    }
    ExpKind::Let(decs, inner) => {
      let scope = state.nested();
      crate::dec::get_decs(st, cx, &scope, decs)?;
      let ty = get(st, cx, &scope, inner)?;
      absorb_ty_cons(state, &scope);
      Ok(ty)
    }
    ExpKind::App(func, arg) => {
      let func_ty = get(st, cx, state, func)?;
      let arg_ty = get(st, cx, state, arg)?;
      let res = st.subst.fresh(cx.rank);
      st.unify(state, exp.pos, &Ty::fun(arg_ty, res.clone()), &func_ty)?;
      Ok(res)
    }
    ExpKind::Handle(inner, matcher) => {
      let ty = get(st, cx, state, inner)?;
      let (param, res) = get_match(st, cx, state, matcher)?;
      st.unify(state, matcher.pos, &Ty::exn(), &param)?;
      st.unify(state, matcher.pos, &ty, &res)?;
      Ok(ty)
    }
    ExpKind::Raise(inner) => {
      let ty = get(st, cx, state, inner)?;
      st.unify(state, inner.pos, &Ty::exn(), &ty)?;
      Ok(st.subst.fresh(cx.rank))
    }
    ExpKind::Fn(matcher) => {
      let (param, res) = get_match(st, cx, state, matcher)?;
      Ok(Ty::fun(param, res))
    }
    ExpKind::Typed(inner, ty) => {
      let got = get(st, cx, state, inner)?;
      let want = crate::ty::get(cx, state, ty)?;
      st.unify(state, exp.pos, &want, &got)?;
      Ok(want)
    }
  }
}

/// Returns the parameter and result types of the match.
fn get_match(
  st: &mut St<'_>,
  cx: &Cx,
  state: &State,
  matcher: &sml_hir::Match,
) -> Result<(Ty, Ty)> {
  let param = st.subst.fresh(cx.rank);
  let res = st.subst.fresh(cx.rank);
  let mut pats = Vec::with_capacity(matcher.arms.len());
  let mut displays = Vec::with_capacity(matcher.arms.len());
  for arm in &matcher.arms {
    let mut binds = pat::Binds::new();
    let (pm, pat_ty) = pat::get(st, cx, state, &mut binds, &arm.pat)?;
    st.unify(state, arm.pat.pos, &param, &pat_ty)?;
    let scope = state.nested();
    for (name, ty) in binds {
      let vi = ValInfo { ty_scheme: TyScheme::zero(ty), id_status: IdStatus::Val };
      scope.set_static_val(name, vi);
    }
    let exp_ty = get(st, cx, &scope, &arm.exp)?;
    st.unify(state, arm.exp.pos, &res, &exp_ty)?;
    absorb_ty_cons(state, &scope);
    pats.push(pm);
    if matcher.flavor != MatchFlavor::Derived {
      displays.push(arm.pat.display().to_string());
    }
  }
  if matcher.flavor != MatchFlavor::Derived {
    st.insert_match(state, matcher.pos, MatchKind::Arms(matcher.flavor), pats, displays);
  }
  Ok((param, res))
}
