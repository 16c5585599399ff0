//! Parsing core declarations.

use crate::exp::exp;
use crate::parser::{Error, ErrorKind, Expected, Parser, Result};
use crate::pat::{at_pat, at_pat_start};
use crate::top_dec::{functor_dec, signature_dec, structure_dec};
use crate::ty::{of_ty, ty, ty_annotation};
use crate::util::{
  alnum, alnum_path, alnum_path_of, and_sep, infix_at, infix_here, op_val_path, op_vid, ty_var_seq,
  val_path_of, vid, vid_here,
};
use sml_fixity::{Fixity, Infix};
use sml_lex::TokenKind;
use sml_syntax::{
  ConBind, DatBind, Dec, DecKind, ExBind, FunBind, FunClause, Path, Pat, PatKind, TyBind, ValBind,
};
use str_util::Name;

const DEC_START: [&str; 15] = [
  "val",
  "fun",
  "type",
  "datatype",
  "abstype",
  "exception",
  "local",
  "open",
  "infix",
  "infixr",
  "nonfix",
  "do",
  "structure",
  "signature",
  "functor",
];

pub(crate) fn dec_start(p: &Parser<'_, '_>) -> bool {
  DEC_START.iter().any(|kw| p.at_kw(kw))
}

/// zero or more declarations, optionally separated by `;`.
pub(crate) fn decs(p: &mut Parser<'_, '_>) -> Result<Vec<Dec>> {
  let mut ret = Vec::new();
  loop {
    if p.eat_kw_opt(";") {
      continue;
    }
    if !dec_start(p) {
      return Ok(ret);
    }
    ret.push(dec(p)?);
  }
}

pub(crate) fn dec(p: &mut Parser<'_, '_>) -> Result<Dec> {
  let pos = p.pos();
  let kind = if p.eat_kw_opt("val") {
    let ty_vars = ty_var_seq(p)?;
    let mut rec = false;
    let binds = and_sep(p, |p| {
      rec |= p.eat_kw_opt("rec");
      let pat = crate::pat::pat(p)?;
      p.eat_eq()?;
      let exp = exp(p)?;
      Ok(ValBind { rec, pat, exp })
    })?;
    DecKind::Val(ty_vars, binds)
  } else if p.eat_kw_opt("fun") {
    let ty_vars = ty_var_seq(p)?;
    DecKind::Fun(ty_vars, and_sep(p, fun_bind)?)
  } else if p.eat_kw_opt("type") {
    DecKind::Ty(and_sep(p, ty_bind)?)
  } else if p.at_kw("datatype") {
    match datatype(p)? {
      Datatype::Regular(binds) => DecKind::Datatype(binds),
      Datatype::Copy(name, path) => DecKind::DatatypeCopy(name, path),
    }
  } else if p.eat_kw_opt("abstype") {
    let binds = dat_binds(p)?;
    p.eat_kw("with")?;
    let body = decs(p)?;
    p.eat_kw("end")?;
    DecKind::Abstype(binds, body)
  } else if p.eat_kw_opt("exception") {
    DecKind::Exception(and_sep(p, ex_bind)?)
  } else if p.eat_kw_opt("local") {
    // the first part is nested in the outer state, and the second in the first. after the second
    // is parsed, it is re-parented onto the outer state, so fixities from the first part are gone
    // but fixities from the second part remain.
    let outer = p.cx.state.clone();
    let fst_state = outer.nested();
    p.cx.state = fst_state.clone();
    let fst = decs(p)?;
    p.eat_kw("in")?;
    let snd_state = fst_state.nested();
    p.cx.state = snd_state.clone();
    let snd = decs(p)?;
    p.eat_kw("end")?;
    snd_state.reparent(&outer);
    DecKind::Local(fst, snd)
  } else if p.eat_kw_opt("open") {
    let mut paths = vec![alnum_path(p)?];
    while p.peek().and_then(alnum_path_of).is_some() {
      paths.push(alnum_path(p)?);
    }
    DecKind::Open(paths)
  } else if p.eat_kw_opt("infix") {
    let (prec, names) = fixity_names(p)?;
    for name in &names {
      p.cx.state.set_fixity(name.clone(), Fixity::Infix(Infix::left(prec)));
    }
    DecKind::Infix(prec, names)
  } else if p.eat_kw_opt("infixr") {
    let (prec, names) = fixity_names(p)?;
    for name in &names {
      p.cx.state.set_fixity(name.clone(), Fixity::Infix(Infix::right(prec)));
    }
    DecKind::Infixr(prec, names)
  } else if p.eat_kw_opt("nonfix") {
    let mut names = vec![vid(p)?];
    while let Some(name) = vid_here(p) {
      p.bump()?;
      names.push(name);
    }
    for name in &names {
      p.cx.state.set_fixity(name.clone(), Fixity::Nonfix);
    }
    DecKind::Nonfix(names)
  } else if p.at_kw("do") {
    p.successor_ml("`do` declarations")?;
    p.bump()?;
    DecKind::Do(exp(p)?)
  } else if p.at_kw("structure") {
    structure_dec(p)?
  } else if p.at_kw("signature") {
    signature_dec(p)?
  } else if p.at_kw("functor") {
    functor_dec(p)?
  } else {
    return Err(p.expected(Expected::Dec));
  };
  Ok(Dec { pos, kind })
}

/// an optional precedence, then one or more names.
fn fixity_names(p: &mut Parser<'_, '_>) -> Result<(u16, Vec<Name>)> {
  let prec = match p.peek().map(|tok| &tok.kind) {
    Some(TokenKind::Numeric(n) | TokenKind::Int(n)) => {
      let prec = u16::try_from(*n).ok().filter(|&n| n <= 9);
      let Some(prec) = prec else { return Err(p.err(ErrorKind::InvalidFixity)) };
      p.bump()?;
      prec
    }
    _ => 0,
  };
  let mut names = vec![vid(p)?];
  while let Some(name) = vid_here(p) {
    p.bump()?;
    names.push(name);
  }
  Ok((prec, names))
}

fn fun_bind(p: &mut Parser<'_, '_>) -> Result<FunBind> {
  let pos = p.pos();
  if p.at_kw("|") {
    p.successor_ml("leading `|`")?;
    p.bump()?;
  }
  let mut clauses = vec![fun_clause(p)?];
  while p.eat_kw_opt("|") {
    clauses.push(fun_clause(p)?);
  }
  Ok(FunBind { pos, clauses })
}

fn fun_clause(p: &mut Parser<'_, '_>) -> Result<FunClause> {
  let pos = p.pos();
  let (name, mut pats, more) = fun_clause_head(p)?;
  if more {
    while at_pat_start(p) {
      pats.push(at_pat(p)?);
    }
  }
  let ret_ty = ty_annotation(p)?;
  p.eat_eq()?;
  let body = exp(p)?;
  Ok(FunClause { pos, name, pats, ret_ty, body })
}

/// returns the name, the patterns so far, and whether more atomic patterns may follow.
fn fun_clause_head(p: &mut Parser<'_, '_>) -> Result<(Path, Vec<Pat>, bool)> {
  if p.eat_kw_opt("op") {
    return Ok((fun_name(p)?, Vec::new(), true));
  }
  if p.at_kw("(") {
    let head = at_pat(p)?;
    return match head.kind {
      PatKind::Infix(lhs, op, rhs) => {
        cov_mark::hit("parenthesized_infix_fun");
        let pos = lhs.pos;
        Ok((op, vec![Pat { pos, kind: PatKind::Tuple(vec![*lhs, *rhs]) }], true))
      }
      kind => infix_clause_rest(p, Pat { pos: head.pos, kind }),
    };
  }
  let nonfix_name = p.peek().is_some_and(|tok| {
    matches!(tok.kind, TokenKind::LongIdent(_))
      || (tok.ident_name().is_some() && infix_here(p, true).is_none())
  });
  if nonfix_name && infix_at(p, 1, false).is_none() {
    return Ok((fun_name(p)?, Vec::new(), true));
  }
  if infix_here(p, true).is_some() {
    return Err(p.err(ErrorKind::InfixWithoutOp));
  }
  let lhs = at_pat(p)?;
  infix_clause_rest(p, lhs)
}

/// an infix name and then the right-hand atomic pattern.
fn infix_clause_rest(p: &mut Parser<'_, '_>, lhs: Pat) -> Result<(Path, Vec<Pat>, bool)> {
  let pos = p.pos();
  let Some((name, _)) = infix_here(p, false) else {
    return Err(if vid_here(p).is_some() {
      Error { pos, kind: ErrorKind::NotInfix }
    } else {
      p.expected(Expected::Name)
    });
  };
  p.bump()?;
  let rhs = at_pat(p)?;
  let pos = lhs.pos;
  Ok((Path::one(name), vec![Pat { pos, kind: PatKind::Tuple(vec![lhs, rhs]) }], false))
}

fn fun_name(p: &mut Parser<'_, '_>) -> Result<Path> {
  let pos = p.pos();
  let Some(path) = p.peek().and_then(val_path_of) else { return Err(p.expected(Expected::Name)) };
  if !path.prefix.is_empty() && !p.cx.options.allow_long_function_names {
    return Err(Error { pos, kind: ErrorKind::FeatureDisabled("long function names") });
  }
  p.bump()?;
  Ok(path)
}

fn ty_bind(p: &mut Parser<'_, '_>) -> Result<TyBind> {
  let ty_vars = ty_var_seq(p)?;
  let name = alnum(p)?;
  p.eat_eq()?;
  let ty = ty(p)?;
  Ok(TyBind { ty_vars, name, ty })
}

pub(crate) enum Datatype {
  Regular(Vec<DatBind>),
  Copy(Name, Path),
}

/// requires being at `datatype`.
pub(crate) fn datatype(p: &mut Parser<'_, '_>) -> Result<Datatype> {
  p.eat_kw("datatype")?;
  let is_copy = p.peek().is_some_and(|tok| matches!(tok.kind, TokenKind::AlnumIdent(_)))
    && p.peek_n(1).is_some_and(|tok| matches!(tok.kind, TokenKind::Equals))
    && p.at_kw_n(2, "datatype");
  if is_copy {
    let name = alnum(p)?;
    p.eat_eq()?;
    p.eat_kw("datatype")?;
    let path = alnum_path(p)?;
    return Ok(Datatype::Copy(name, path));
  }
  Ok(Datatype::Regular(dat_binds(p)?))
}

fn dat_binds(p: &mut Parser<'_, '_>) -> Result<Vec<DatBind>> {
  let ret = and_sep(p, dat_bind)?;
  if p.at_kw("withtype") {
    return Err(p.err(ErrorKind::FeatureDisabled("`withtype`")));
  }
  Ok(ret)
}

fn dat_bind(p: &mut Parser<'_, '_>) -> Result<DatBind> {
  let pos = p.pos();
  let ty_vars = ty_var_seq(p)?;
  let name = alnum(p)?;
  p.eat_eq()?;
  if p.at_kw("|") {
    p.successor_ml("leading `|`")?;
    p.bump()?;
  }
  let mut cons = vec![con_bind(p)?];
  while p.eat_kw_opt("|") {
    cons.push(con_bind(p)?);
  }
  Ok(DatBind { pos, ty_vars, name, cons })
}

pub(crate) fn con_bind(p: &mut Parser<'_, '_>) -> Result<ConBind> {
  let name = op_vid(p)?;
  let ty = of_ty(p)?;
  Ok(ConBind { name, ty })
}

fn ex_bind(p: &mut Parser<'_, '_>) -> Result<ExBind> {
  let name = op_vid(p)?;
  if p.at_eq() {
    p.bump()?;
    let path = op_val_path(p)?;
    return Ok(ExBind::Copy(name, path));
  }
  Ok(ExBind::New(name, of_ty(p)?))
}
