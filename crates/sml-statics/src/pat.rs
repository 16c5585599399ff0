//! Elaborating patterns.

use crate::error::{Error, ErrorKind};
use crate::pat_match::{Con, Pat};
use crate::st::St;
use crate::util::{Cx, Result, check_rebind, get_val};
use sml_hir::{PatKind, SCon};
use sml_state::State;
use sml_statics_types::env::{IdStatus, ValInfo};
use sml_statics_types::subst::Unsolved;
use sml_statics_types::ty::Ty;
use str_util::Name;

/// The variables a pattern binds, in order.
pub(crate) type Binds = Vec<(Name, Ty)>;

pub(crate) fn get(
  st: &mut St<'_>,
  cx: &Cx,
  state: &State,
  binds: &mut Binds,
  pat: &sml_hir::Pat,
) -> Result<(Pat, Ty)> {
  match &pat.kind {
    PatKind::Wild => Ok((Pat::Any, st.subst.fresh(cx.rank))),
    PatKind::SCon(scon) => {
      let ty = match scon {
        SCon::Int(_) => Ty::int(),
        SCon::Real(_) => {
          if st.options.strict_mode {
            return Err(Error { pos: pat.pos, kind: ErrorKind::RealPat });
          }
          Ty::real()
        }
        SCon::Word(_) => Ty::word(),
        SCon::Char(_) => Ty::char(),
        SCon::String(_) => Ty::string(),
      };
      Ok((Pat::Con(Con::SCon(scon.to_string()), Vec::new()), ty))
    }
    PatKind::Con(path, None) => {
      let found = if path.is_one() {
        state.static_val(path.last.as_str()).filter(|vi| vi.id_status.is_con())
      } else {
        let vi = get_val(st, state, pat.pos, path)?;
        if !vi.id_status.is_con() {
          return Err(Error { pos: pat.pos, kind: ErrorKind::PatNotCon(path.clone()) });
        }
        Some(vi)
      };
      match found {
        Some(vi) => {
          let ty = st.subst.instantiate(&vi.ty_scheme, cx.rank);
          if matches!(ty, Ty::Fn(..)) {
            return Err(Error { pos: pat.pos, kind: ErrorKind::ConPatMustHaveArg(path.clone()) });
          }
          Ok((con_pat(&vi, &path.last, &ty, Vec::new()), ty))
        }
        None => {
          let ty = st.subst.fresh(cx.rank);
          bind(state, binds, pat.pos, &path.last, ty.clone())?;
          Ok((Pat::Any, ty))
        }
      }
    }
    PatKind::Con(path, Some(arg)) => {
      let vi = get_val(st, state, pat.pos, path)?;
      if !vi.id_status.is_con() {
        return Err(Error { pos: pat.pos, kind: ErrorKind::PatNotCon(path.clone()) });
      }
      let Ty::Fn(param, res) = st.subst.instantiate(&vi.ty_scheme, cx.rank) else {
        return Err(Error { pos: pat.pos, kind: ErrorKind::ConPatMustNotHaveArg(path.clone()) });
      };
      let (arg_pat, arg_ty) = get(st, cx, state, binds, arg)?;
      st.unify(state, arg.pos, &param, &arg_ty)?;
      Ok((con_pat(&vi, &path.last, &res, vec![arg_pat]), *res))
    }
    PatKind::Record(rows, rest) => {
      let mut pats = std::collections::BTreeMap::new();
      let mut tys = std::collections::BTreeMap::new();
      for (lab, pat) in rows {
        let (p, t) = get(st, cx, state, binds, pat)?;
        pats.insert(lab.clone(), p);
        tys.insert(lab.clone(), t);
      }
      let ty = if *rest {
        st.subst.fresh_kind(Unsolved { rank: cx.rank, record: Some(tys), ..Unsolved::default() })
      } else {
        Ty::Record(tys)
      };
      Ok((Pat::Record(pats, ty.clone()), ty))
    }
    PatKind::Typed(inner, ty) => {
      let (p, got) = get(st, cx, state, binds, inner)?;
      let want = crate::ty::get(cx, state, ty)?;
      st.unify(state, pat.pos, &want, &got)?;
      Ok((p, want))
    }
    PatKind::As(name, inner) => {
      if state.static_val(name.as_str()).is_some_and(|vi| vi.id_status.is_con()) {
        return Err(Error { pos: pat.pos, kind: ErrorKind::InvalidAsPatName(name.clone()) });
      }
      let (p, ty) = get(st, cx, state, binds, inner)?;
      bind(state, binds, pat.pos, name, ty.clone())?;
      Ok((p, ty))
    }
  }
}

fn bind(state: &State, binds: &mut Binds, pos: usize, name: &Name, ty: Ty) -> Result<()> {
  check_rebind(state, pos, name, IdStatus::Val)?;
  if binds.iter().any(|(n, _)| n == name) {
    cov_mark::hit("non_linear_pat");
    return Err(Error { pos, kind: ErrorKind::NonLinearPat(name.clone()) });
  }
  binds.push((name.clone(), ty));
  Ok(())
}

fn con_pat(vi: &ValInfo, name: &Name, res: &Ty, args: Vec<Pat>) -> Pat {
  match (vi.id_status, res) {
    (IdStatus::Exn, _) => Pat::Con(Con::Exn(name.clone()), args),
    (_, Ty::Con(_, tc)) => Pat::Con(Con::Named(name.clone(), tc.clone()), args),
    _ => Pat::Any,
  }
}
