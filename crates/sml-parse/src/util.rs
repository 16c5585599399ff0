//! Parse utilities.

use crate::parser::{Error, ErrorKind, Expected, Parser, Result};
use sml_fixity::{Assoc, Infix};
use sml_lex::{Token, TokenKind};
use sml_syntax::{Lab, Path, TyVar};
use std::cmp::Reverse;
use str_util::Name;

/// returns the name of the current token if it is a short value identifier: a name, `=`, or `*`.
pub(crate) fn vid_here(p: &Parser<'_, '_>) -> Option<Name> {
  p.peek().and_then(Token::ident_name)
}

/// returns the name and info of the current token if it is a short identifier that is currently
/// infix. `=` is skipped unless `allow_eq`.
pub(crate) fn infix_here(p: &Parser<'_, '_>, allow_eq: bool) -> Option<(Name, Infix)> {
  infix_at(p, 0, allow_eq)
}

/// like [`infix_here`], but `n` tokens ahead.
pub(crate) fn infix_at(p: &Parser<'_, '_>, n: usize, allow_eq: bool) -> Option<(Name, Infix)> {
  let tok = p.peek_n(n)?;
  if !allow_eq && matches!(tok.kind, TokenKind::Equals) {
    return None;
  }
  let name = tok.ident_name()?;
  let info = p.cx.state.infix(name.as_str())?;
  Some((name, info))
}

pub(crate) fn is_infix(p: &Parser<'_, '_>, name: &Name) -> bool {
  p.cx.state.infix(name.as_str()).is_some()
}

pub(crate) fn vid(p: &mut Parser<'_, '_>) -> Result<Name> {
  match vid_here(p) {
    Some(name) => {
      p.bump()?;
      Ok(name)
    }
    None => Err(p.expected(Expected::Name)),
  }
}

/// `[op] vid`, erroring if the name is infix and there was no `op`.
pub(crate) fn op_vid(p: &mut Parser<'_, '_>) -> Result<Name> {
  let op = p.eat_kw_opt("op");
  let pos = p.pos();
  let name = vid(p)?;
  if !op && is_infix(p, &name) {
    return Err(Error { pos, kind: ErrorKind::InfixWithoutOp });
  }
  Ok(name)
}

/// an alphanumeric name, as for structures, signatures, functors, and type constructors.
pub(crate) fn alnum(p: &mut Parser<'_, '_>) -> Result<Name> {
  match p.peek().map(|tok| &tok.kind) {
    Some(TokenKind::AlnumIdent(name)) => {
      let name = name.clone();
      p.bump()?;
      Ok(name)
    }
    _ => Err(p.expected(Expected::Name)),
  }
}

/// returns the path at the token if it is a value path, without checking fixity.
pub(crate) fn val_path_of(tok: &Token) -> Option<Path> {
  match &tok.kind {
    TokenKind::LongIdent(li) => {
      let (prefix, last) = li.names();
      Some(Path { prefix, last })
    }
    _ => tok.ident_name().map(Path::one),
  }
}

/// returns the path at the token if it is an alphanumeric path, as for structures and types.
pub(crate) fn alnum_path_of(tok: &Token) -> Option<Path> {
  match &tok.kind {
    TokenKind::LongIdent(li) if matches!(li.id.kind, TokenKind::AlnumIdent(_)) => {
      let (prefix, last) = li.names();
      Some(Path { prefix, last })
    }
    TokenKind::AlnumIdent(name) => Some(Path::one(name.clone())),
    _ => None,
  }
}

pub(crate) fn alnum_path(p: &mut Parser<'_, '_>) -> Result<Path> {
  match p.peek().and_then(alnum_path_of) {
    Some(path) => {
      p.bump()?;
      Ok(path)
    }
    None => Err(p.expected(Expected::Name)),
  }
}

/// a value path after `op`, or a non-infix value path.
pub(crate) fn op_val_path(p: &mut Parser<'_, '_>) -> Result<Path> {
  let op = p.eat_kw_opt("op");
  let pos = p.pos();
  let Some(path) = p.peek().and_then(val_path_of) else { return Err(p.expected(Expected::Name)) };
  p.bump()?;
  if !op && path.as_one().is_some_and(|name| is_infix(p, name)) {
    return Err(Error { pos, kind: ErrorKind::InfixWithoutOp });
  }
  Ok(path)
}

pub(crate) fn lab(p: &mut Parser<'_, '_>) -> Result<Lab> {
  let lab = match p.peek().map(|tok| &tok.kind) {
    Some(TokenKind::AlnumIdent(name) | TokenKind::Ident(name)) => Lab::Name(name.clone()),
    Some(TokenKind::Star) => Lab::Name(Name::new("*")),
    Some(TokenKind::Numeric(n)) => match usize::try_from(*n) {
      Ok(n) => Lab::Num(n),
      Err(_) => return Err(p.expected(Expected::Lab)),
    },
    _ => return Err(p.expected(Expected::Lab)),
  };
  p.bump()?;
  Ok(lab)
}

fn ty_var_of(tok: &Token) -> Option<TyVar> {
  match &tok.kind {
    TokenKind::TyVar(name) | TokenKind::EqTyVar(name) => Some(name.clone()),
    _ => None,
  }
}

pub(crate) fn at_ty_var(p: &Parser<'_, '_>) -> bool {
  p.peek().and_then(ty_var_of).is_some()
}

pub(crate) fn ty_var(p: &mut Parser<'_, '_>) -> Result<TyVar> {
  match p.peek().and_then(ty_var_of) {
    Some(tv) => {
      p.bump()?;
      Ok(tv)
    }
    None => Err(p.expected(Expected::Kw("a type variable"))),
  }
}

/// `'a` or `('a, 'b, ...)` or nothing.
pub(crate) fn ty_var_seq(p: &mut Parser<'_, '_>) -> Result<Vec<TyVar>> {
  if at_ty_var(p) {
    return Ok(vec![ty_var(p)?]);
  }
  if p.at_kw("(") && p.peek_n(1).and_then(ty_var_of).is_some() {
    p.bump()?;
    let mut ret = Vec::new();
    loop {
      ret.push(ty_var(p)?);
      if !p.eat_kw_opt(",") {
        break;
      }
    }
    p.eat_kw(")")?;
    return Ok(ret);
  }
  Ok(Vec::new())
}

/// `f`, zero or more times separated by `,`, and then `end`. assumes the opening delimiter was
/// already eaten.
pub(crate) fn comma_sep<'a, 'cx, T, F>(
  p: &mut Parser<'a, 'cx>,
  end: &'static str,
  mut f: F,
) -> Result<Vec<T>>
where
  F: FnMut(&mut Parser<'a, 'cx>) -> Result<T>,
{
  let mut ret = Vec::new();
  if p.eat_kw_opt(end) {
    return Ok(ret);
  }
  loop {
    ret.push(f(p)?);
    if !p.eat_kw_opt(",") {
      break;
    }
  }
  p.eat_kw(end)?;
  Ok(ret)
}

/// `f`, one or more times separated by `and`.
pub(crate) fn and_sep<'a, 'cx, T, F>(p: &mut Parser<'a, 'cx>, mut f: F) -> Result<Vec<T>>
where
  F: FnMut(&mut Parser<'a, 'cx>) -> Result<T>,
{
  let mut ret = vec![f(p)?];
  while p.eat_kw_opt("and") {
    ret.push(f(p)?);
  }
  Ok(ret)
}

/// an infix operator between two operands.
#[derive(Debug)]
pub(crate) struct Operator {
  pub(crate) pos: usize,
  pub(crate) name: Name,
  pub(crate) info: Infix,
}

/// combines the operands with the operators between them.
///
/// the operators are stably sorted by descending precedence, then by position (left to right for
/// left-associative, right to left for right-associative), and then reduced in that order. each
/// reduction joins the groups of its two neighboring operands, tracked with union-find.
pub(crate) fn resolve_infix<T, F>(operands: Vec<T>, ops: Vec<Operator>, mut combine: F) -> Result<T>
where
  F: FnMut(T, Path, T) -> T,
{
  assert_eq!(operands.len(), ops.len() + 1, "operand count must be one more than operator count");
  for (idx, op) in ops.iter().enumerate() {
    for other in &ops[idx + 1..] {
      if other.info.prec > op.info.prec {
        continue;
      }
      if other.info.prec == op.info.prec && other.info.assoc != op.info.assoc {
        cov_mark::hit("same_fixity_diff_assoc");
        return Err(Error { pos: other.pos, kind: ErrorKind::SameFixityDiffAssoc });
      }
      break;
    }
  }
  let mut order: Vec<usize> = (0..ops.len()).collect();
  order.sort_by_key(|&idx| {
    let info = ops[idx].info;
    let by_pos = match info.assoc {
      Assoc::Left => idx,
      Assoc::Right => usize::MAX - idx,
    };
    (Reverse(info.prec), by_pos)
  });
  let mut parent: Vec<usize> = (0..operands.len()).collect();
  let mut slots: Vec<Option<T>> = operands.into_iter().map(Some).collect();
  let mut ops: Vec<Option<Operator>> = ops.into_iter().map(Some).collect();
  for idx in order {
    let lhs_root = find(&mut parent, idx);
    let rhs_root = find(&mut parent, idx + 1);
    let (Some(lhs), Some(rhs), Some(op)) =
      (slots[lhs_root].take(), slots[rhs_root].take(), ops[idx].take())
    else {
      unreachable!("each operator joins two distinct groups exactly once")
    };
    parent[rhs_root] = lhs_root;
    slots[lhs_root] = Some(combine(lhs, Path::one(op.name), rhs));
  }
  let root = find(&mut parent, 0);
  match slots[root].take() {
    Some(x) => Ok(x),
    None => unreachable!("everything ends up in the group of the first operand"),
  }
}

fn find(parent: &mut [usize], mut idx: usize) -> usize {
  while parent[idx] != idx {
    parent[idx] = parent[parent[idx]];
    idx = parent[idx];
  }
  idx
}

/// returns the special constant at the token, if any.
pub(crate) fn scon_of(tok: &Token) -> Option<sml_syntax::SCon> {
  use sml_syntax::SCon;
  let ret = match &tok.kind {
    TokenKind::Int(n) | TokenKind::Numeric(n) => SCon::Int(*n),
    TokenKind::Real(r) => SCon::Real(*r),
    TokenKind::Word(w) => SCon::Word(*w),
    TokenKind::Char(c) => SCon::Char(*c),
    TokenKind::String(s) => SCon::String(s.clone()),
    _ => return None,
  };
  Some(ret)
}
