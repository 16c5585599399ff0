//! Parsing types.

use crate::parser::{Expected, Parser, Result};
use crate::util::{alnum_path, alnum_path_of, at_ty_var, comma_sep, lab, ty_var};
use sml_syntax::{Ty, TyKind};

/// `t1 -> t2`, the lowest precedence. right associative.
pub(crate) fn ty(p: &mut Parser<'_, '_>) -> Result<Ty> {
  let lhs = tuple_ty(p)?;
  if p.eat_kw_opt("->") {
    let rhs = ty(p)?;
    let pos = lhs.pos;
    return Ok(Ty { pos, kind: TyKind::Fn(Box::new(lhs), Box::new(rhs)) });
  }
  Ok(lhs)
}

/// `of t` or nothing.
pub(crate) fn of_ty(p: &mut Parser<'_, '_>) -> Result<Option<Ty>> {
  if p.eat_kw_opt("of") { ty(p).map(Some) } else { Ok(None) }
}

/// `: t` or nothing.
pub(crate) fn ty_annotation(p: &mut Parser<'_, '_>) -> Result<Option<Ty>> {
  if p.eat_kw_opt(":") { ty(p).map(Some) } else { Ok(None) }
}

fn tuple_ty(p: &mut Parser<'_, '_>) -> Result<Ty> {
  let fst = app_ty(p)?;
  if !p.at_star() {
    return Ok(fst);
  }
  let pos = fst.pos;
  let mut tys = vec![fst];
  while p.at_star() {
    p.bump()?;
    tys.push(app_ty(p)?);
  }
  Ok(Ty { pos, kind: TyKind::Tuple(tys) })
}

/// postfix type constructor application, as in `int list option`.
fn app_ty(p: &mut Parser<'_, '_>) -> Result<Ty> {
  let mut ret = at_ty(p)?;
  while p.peek().and_then(alnum_path_of).is_some() {
    let path = alnum_path(p)?;
    let pos = ret.pos;
    ret = Ty { pos, kind: TyKind::Con(vec![ret], path) };
  }
  Ok(ret)
}

fn at_ty(p: &mut Parser<'_, '_>) -> Result<Ty> {
  let pos = p.pos();
  if at_ty_var(p) {
    let tv = ty_var(p)?;
    return Ok(Ty { pos, kind: TyKind::Var(tv) });
  }
  if p.eat_kw_opt("{") {
    let rows = comma_sep(p, "}", |p| {
      let lab = lab(p)?;
      p.eat_kw(":")?;
      Ok((lab, ty(p)?))
    })?;
    return Ok(Ty { pos, kind: TyKind::Record(rows) });
  }
  if p.eat_kw_opt("(") {
    let mut tys = vec![ty(p)?];
    while p.eat_kw_opt(",") {
      tys.push(ty(p)?);
    }
    p.eat_kw(")")?;
    if tys.len() == 1 {
      if let Some(ty) = tys.pop() {
        return Ok(Ty { pos, ..ty });
      }
    }
    // a sequence of more than one type must be arguments to a type constructor.
    let path = alnum_path(p)?;
    return Ok(Ty { pos, kind: TyKind::Con(tys, path) });
  }
  if p.peek().and_then(alnum_path_of).is_some() {
    let path = alnum_path(p)?;
    return Ok(Ty { pos, kind: TyKind::Con(Vec::new(), path) });
  }
  Err(p.expected(Expected::Ty))
}
