//! Elaborating written types.

use crate::error::{Error, ErrorKind, Item};
use crate::util::{Cx, Result, get_ty, undefined};
use sml_hir::TyKind;
use sml_state::State;
use sml_statics_types::ty::Ty;

pub(crate) fn get(cx: &Cx, state: &State, ty: &sml_hir::Ty) -> Result<Ty> {
  match &ty.kind {
    TyKind::Var(tv) => match cx.ty_var(tv) {
      Some(fv) => Ok(Ty::FixedVar(fv.clone())),
      None => Err(undefined(ty.pos, Item::TyVar, tv)),
    },
    TyKind::Record(rows) => {
      let rows = rows
        .iter()
        .map(|(lab, ty)| Ok((lab.clone(), get(cx, state, ty)?)))
        .collect::<Result<_>>()?;
      Ok(Ty::Record(rows))
    }
    TyKind::Con(args, path) => {
      let ty_info = get_ty(state, ty.pos, path)?;
      let want = ty_info.ty_scheme.bound.len();
      if want != args.len() {
        return Err(Error { pos: ty.pos, kind: ErrorKind::WrongNumTyArgs(want, args.len()) });
      }
      let args = args.iter().map(|ty| get(cx, state, ty)).collect::<Result<Vec<_>>>()?;
      Ok(ty_info.ty_scheme.apply(&args))
    }
    TyKind::Fn(param, res) => Ok(Ty::fun(get(cx, state, param)?, get(cx, state, res)?)),
  }
}
