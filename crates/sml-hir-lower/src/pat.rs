//! Lowering patterns.

use crate::ty::{self, path_of};
use crate::util::{Result, con_pat, rows, tuple, tuple_pat};
use sml_hir::{Pat, PatKind, Path};
use sml_syntax::PatKind as SPatKind;
use str_util::Name;

pub(crate) fn get(pat: &sml_syntax::Pat) -> Result<Pat> {
  let pos = pat.pos;
  let kind = match &pat.kind {
    SPatKind::Wild => PatKind::Wild,
    SPatKind::SCon(scon) => PatKind::SCon(scon.clone()),
    SPatKind::Path(path) => PatKind::Con(path_of(path), None),
    SPatKind::Record(rs, rest) => {
      let rs =
        rs.iter().map(|(lab, pat)| Ok((lab.clone(), get(pat)?))).collect::<Result<Vec<_>>>()?;
      PatKind::Record(rows(pos, rs)?, *rest)
    }
    SPatKind::Tuple(pats) => {
      let pats = pats.iter().map(get).collect::<Result<Vec<_>>>()?;
      return Ok(tuple_pat(pos, pats));
    }
    SPatKind::List(pats) => {
      let mut ret = con_pat(pos, "nil");
      for pat in pats.iter().rev() {
        let hd = get(pat)?;
        ret = cons(hd.pos, hd, ret);
      }
      return Ok(ret);
    }
    SPatKind::Con(path, arg) => PatKind::Con(path_of(path), Some(Box::new(get(arg)?))),
    SPatKind::Infix(lhs, op, rhs) => {
      let arg = tuple_pat(pos, vec![get(lhs)?, get(rhs)?]);
      PatKind::Con(path_of(op), Some(Box::new(arg)))
    }
    SPatKind::Typed(pat, t) => PatKind::Typed(Box::new(get(pat)?), ty::get(t)?),
    SPatKind::As(name, pat) => PatKind::As(name.clone(), Box::new(get(pat)?)),
  };
  Ok(Pat { pos, kind })
}

fn cons(pos: usize, hd: Pat, tl: Pat) -> Pat {
  let rows = tuple([hd, tl]).into_iter().collect();
  let arg = Pat { pos, kind: PatKind::Record(rows, false) };
  Pat { pos, kind: PatKind::Con(Path::one(Name::new("::")), Some(Box::new(arg))) }
}
