//! Lowering types.

use crate::util::{Result, rows, tuple};
use sml_hir::{Path, Ty, TyKind, TyVar};

pub(crate) fn get(ty: &sml_syntax::Ty) -> Result<Ty> {
  let kind = match &ty.kind {
    sml_syntax::TyKind::Var(tv) => TyKind::Var(TyVar::new(tv.clone())),
    sml_syntax::TyKind::Record(rs) => {
      let rs = rs.iter().map(|(lab, ty)| Ok((lab.clone(), get(ty)?))).collect::<Result<Vec<_>>>()?;
      TyKind::Record(rows(ty.pos, rs)?)
    }
    sml_syntax::TyKind::Tuple(tys) => {
      let tys = tys.iter().map(get).collect::<Result<Vec<_>>>()?;
      TyKind::Record(tuple(tys).into_iter().collect())
    }
    sml_syntax::TyKind::Con(args, path) => {
      let args = args.iter().map(get).collect::<Result<Vec<_>>>()?;
      TyKind::Con(args, path_of(path))
    }
    sml_syntax::TyKind::Fn(param, res) => TyKind::Fn(Box::new(get(param)?), Box::new(get(res)?)),
  };
  Ok(Ty { pos: ty.pos, kind })
}

pub(crate) fn get_opt(ty: Option<&sml_syntax::Ty>) -> Result<Option<Ty>> {
  ty.map(get).transpose()
}

pub(crate) fn path_of(path: &sml_syntax::Path) -> Path {
  Path::new(path.prefix.clone(), path.last.clone())
}

pub(crate) fn ty_vars(tvs: &[sml_syntax::TyVar]) -> Vec<TyVar> {
  tvs.iter().cloned().map(TyVar::new).collect()
}
