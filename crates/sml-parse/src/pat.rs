//! Parsing patterns.

use crate::parser::{Error, ErrorKind, Expected, Parser, Result};
use crate::ty::ty;
use crate::util::{
  Operator, comma_sep, infix_here, lab, op_val_path, resolve_infix, scon_of, val_path_of,
};
use sml_lex::TokenKind;
use sml_syntax::{Lab, Pat, PatKind};

pub(crate) fn pat(p: &mut Parser<'_, '_>) -> Result<Pat> {
  let mut ret = infix_pat(p)?;
  while p.eat_kw_opt(":") {
    let ty = ty(p)?;
    let pos = ret.pos;
    ret = Pat { pos, kind: PatKind::Typed(Box::new(ret), ty) };
  }
  if p.at_kw("as") {
    let as_pos = p.pos();
    p.bump()?;
    let rhs = pat(p)?;
    let pos = ret.pos;
    let kind = match ret.kind {
      PatKind::Path(path) if path.prefix.is_empty() => PatKind::As(path.last, Box::new(rhs)),
      PatKind::Typed(inner, ty) => match inner.kind {
        PatKind::Path(path) if path.prefix.is_empty() => {
          let rhs = Pat { pos: rhs.pos, kind: PatKind::Typed(Box::new(rhs), ty) };
          PatKind::As(path.last, Box::new(rhs))
        }
        _ => return Err(Error { pos: as_pos, kind: ErrorKind::AsPatLhsNotName }),
      },
      _ => return Err(Error { pos: as_pos, kind: ErrorKind::AsPatLhsNotName }),
    };
    ret = Pat { pos, kind };
  }
  Ok(ret)
}

/// `=` is never infix in a pattern.
fn infix_pat(p: &mut Parser<'_, '_>) -> Result<Pat> {
  let mut operands = vec![app_pat(p)?];
  let mut ops = Vec::<Operator>::new();
  while let Some((name, info)) = infix_here(p, false) {
    let pos = p.pos();
    p.bump()?;
    ops.push(Operator { pos, name, info });
    operands.push(app_pat(p)?);
  }
  resolve_infix(operands, ops, |lhs, op, rhs| {
    let pos = lhs.pos;
    Pat { pos, kind: PatKind::Infix(Box::new(lhs), op, Box::new(rhs)) }
  })
}

/// a constructor applied to an atomic pattern, or an atomic pattern.
fn app_pat(p: &mut Parser<'_, '_>) -> Result<Pat> {
  let pos = p.pos();
  let at_path = p.at_kw("op")
    || p.peek().is_some_and(|tok| {
      !matches!(tok.kind, TokenKind::Equals) && val_path_of(tok).is_some()
    });
  if !at_path {
    return at_pat(p);
  }
  let path = op_val_path(p)?;
  if at_pat_start(p) {
    let arg = at_pat(p)?;
    return Ok(Pat { pos, kind: PatKind::Con(path, Box::new(arg)) });
  }
  Ok(Pat { pos, kind: PatKind::Path(path) })
}

/// whether an atomic pattern starts here.
pub(crate) fn at_pat_start(p: &Parser<'_, '_>) -> bool {
  let Some(tok) = p.peek() else { return false };
  if ["_", "op", "(", "[", "{"].iter().any(|kw| tok.is_kw(kw)) || scon_of(tok).is_some() {
    return true;
  }
  if matches!(tok.kind, TokenKind::Equals) || val_path_of(tok).is_none() {
    return false;
  }
  infix_here(p, true).is_none() || matches!(tok.kind, TokenKind::LongIdent(_))
}

pub(crate) fn at_pat(p: &mut Parser<'_, '_>) -> Result<Pat> {
  let pos = p.pos();
  let Some(tok) = p.peek() else { return Err(p.expected(Expected::Pat)) };
  if tok.is_kw("_") {
    p.bump()?;
    return Ok(Pat { pos, kind: PatKind::Wild });
  }
  if let Some(scon) = scon_of(tok) {
    p.bump()?;
    return Ok(Pat { pos, kind: PatKind::SCon(scon) });
  }
  if tok.is_kw("op") || (!matches!(tok.kind, TokenKind::Equals) && val_path_of(tok).is_some()) {
    let path = op_val_path(p)?;
    return Ok(Pat { pos, kind: PatKind::Path(path) });
  }
  if p.eat_kw_opt("{") {
    return record_pat(p, pos);
  }
  if p.eat_kw_opt("(") {
    let mut pats = comma_sep(p, ")", pat)?;
    if pats.len() == 1 {
      if let Some(pat) = pats.pop() {
        return Ok(pat);
      }
    }
    return Ok(Pat { pos, kind: PatKind::Tuple(pats) });
  }
  if p.eat_kw_opt("[") {
    let pats = comma_sep(p, "]", pat)?;
    return Ok(Pat { pos, kind: PatKind::List(pats) });
  }
  Err(p.expected(Expected::Pat))
}

/// assumes the `{` was eaten.
fn record_pat(p: &mut Parser<'_, '_>, pos: usize) -> Result<Pat> {
  let mut rows = Vec::<(Lab, Pat)>::new();
  let mut rest = false;
  if p.eat_kw_opt("}") {
    return Ok(Pat { pos, kind: PatKind::Record(rows, rest) });
  }
  loop {
    if p.at_kw("...") {
      p.bump()?;
      rest = true;
      if !p.at_kw("}") {
        return Err(p.err(ErrorKind::RestPatRowNotLast));
      }
    } else {
      let lab_pos = p.pos();
      let lab = lab(p)?;
      let pat = if p.at_eq() {
        p.bump()?;
        pat(p)?
      } else {
        // `{ x, y : t, z as p }` is short for `{ x = x, y = y : t, z = z as p }`.
        let Lab::Name(name) = &lab else { return Err(p.expected(Expected::Kw("="))) };
        let kind = PatKind::Path(sml_syntax::Path::one(name.clone()));
        let mut ret = Pat { pos: lab_pos, kind };
        if p.eat_kw_opt(":") {
          let ty = ty(p)?;
          ret = Pat { pos: lab_pos, kind: PatKind::Typed(Box::new(ret), ty) };
        }
        if p.eat_kw_opt("as") {
          let rhs = pat(p)?;
          let rhs = match ret.kind {
            PatKind::Typed(_, ty) => Pat { pos: rhs.pos, kind: PatKind::Typed(Box::new(rhs), ty) },
            _ => rhs,
          };
          ret = Pat { pos: lab_pos, kind: PatKind::As(name.clone(), Box::new(rhs)) };
        }
        ret
      };
      rows.push((lab, pat));
    }
    if !p.eat_kw_opt(",") {
      break;
    }
  }
  p.eat_kw("}")?;
  Ok(Pat { pos, kind: PatKind::Record(rows, rest) })
}
