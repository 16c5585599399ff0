//! Parsing the module language: structures, signatures, and functors.

use crate::dec::{Datatype, con_bind, datatype, dec_start, decs};
use crate::parser::{ErrorKind, Expected, Parser, Result};
use crate::ty::ty;
use crate::util::{alnum, alnum_path, alnum_path_of, and_sep, ty_var_seq, vid};
use sml_lex::TokenKind;
use sml_syntax::{
  Ascription, DecKind, FunctorBind, SigBind, SigExp, SigExpKind, Spec, SpecKind, StrBind, StrExp,
  StrExpKind, TyDesc,
};

/// requires being at `structure`.
pub(crate) fn structure_dec(p: &mut Parser<'_, '_>) -> Result<DecKind> {
  p.eat_kw("structure")?;
  let binds = and_sep(p, |p| {
    let name = alnum(p)?;
    let asc = ascription(p)?;
    p.eat_eq()?;
    let str_exp = with_ascription(str_exp(p)?, asc);
    Ok(StrBind { name, str_exp })
  })?;
  Ok(DecKind::Structure(binds))
}

/// requires being at `signature`.
pub(crate) fn signature_dec(p: &mut Parser<'_, '_>) -> Result<DecKind> {
  p.eat_kw("signature")?;
  let binds = and_sep(p, |p| {
    let name = alnum(p)?;
    p.eat_eq()?;
    Ok(SigBind { name, sig_exp: sig_exp(p)? })
  })?;
  Ok(DecKind::Signature(binds))
}

/// requires being at `functor`.
pub(crate) fn functor_dec(p: &mut Parser<'_, '_>) -> Result<DecKind> {
  p.eat_kw("functor")?;
  let binds = and_sep(p, |p| {
    let name = alnum(p)?;
    p.eat_kw("(")?;
    let is_named = p.peek().is_some_and(|tok| matches!(tok.kind, TokenKind::AlnumIdent(_)))
      && p.at_kw_n(1, ":");
    if !is_named {
      return Err(p.err(ErrorKind::FeatureNotImplemented(
        "functor parameters given as specifications",
      )));
    }
    let param = alnum(p)?;
    p.eat_kw(":")?;
    let param_sig = sig_exp(p)?;
    p.eat_kw(")")?;
    let asc = ascription(p)?;
    p.eat_eq()?;
    let body = with_ascription(str_exp(p)?, asc);
    Ok(FunctorBind { name, param, param_sig, body })
  })?;
  Ok(DecKind::Functor(binds))
}

/// `: SIG` or `:> SIG` or nothing.
fn ascription(p: &mut Parser<'_, '_>) -> Result<Option<(Ascription, SigExp)>> {
  let asc = if p.at_kw(":") {
    Ascription::Transparent
  } else if p.at_kw(":>") {
    Ascription::Opaque
  } else {
    return Ok(None);
  };
  p.bump()?;
  Ok(Some((asc, sig_exp(p)?)))
}

fn with_ascription(str_exp: StrExp, asc: Option<(Ascription, SigExp)>) -> StrExp {
  match asc {
    None => str_exp,
    Some((asc, sig_exp)) => {
      let pos = str_exp.pos;
      StrExp { pos, kind: StrExpKind::Ascription(Box::new(str_exp), asc, sig_exp) }
    }
  }
}

pub(crate) fn str_exp(p: &mut Parser<'_, '_>) -> Result<StrExp> {
  let mut ret = at_str_exp(p)?;
  while let Some((asc, sig_exp)) = ascription(p)? {
    let pos = ret.pos;
    ret = StrExp { pos, kind: StrExpKind::Ascription(Box::new(ret), asc, sig_exp) };
  }
  Ok(ret)
}

fn at_str_exp(p: &mut Parser<'_, '_>) -> Result<StrExp> {
  let pos = p.pos();
  if p.eat_kw_opt("struct") {
    let ds = scoped(p, |p| {
      let ds = decs(p)?;
      p.eat_kw("end")?;
      Ok(ds)
    })?;
    return Ok(StrExp { pos, kind: StrExpKind::Struct(ds) });
  }
  if p.eat_kw_opt("let") {
    let (ds, body) = scoped(p, |p| {
      let ds = decs(p)?;
      p.eat_kw("in")?;
      let body = str_exp(p)?;
      p.eat_kw("end")?;
      Ok((ds, body))
    })?;
    return Ok(StrExp { pos, kind: StrExpKind::Let(ds, Box::new(body)) });
  }
  let is_app = p.peek().is_some_and(|tok| matches!(tok.kind, TokenKind::AlnumIdent(_)))
    && p.at_kw_n(1, "(");
  if is_app {
    let name = alnum(p)?;
    p.eat_kw("(")?;
    let arg_pos = p.pos();
    let arg = if dec_start(p) || p.at_kw(")") {
      // `F (decs)` is short for `F (struct decs end)`.
      let ds = scoped(p, decs)?;
      StrExp { pos: arg_pos, kind: StrExpKind::Struct(ds) }
    } else {
      str_exp(p)?
    };
    p.eat_kw(")")?;
    return Ok(StrExp { pos, kind: StrExpKind::App(name, Box::new(arg)) });
  }
  if p.peek().and_then(alnum_path_of).is_some() {
    let path = alnum_path(p)?;
    return Ok(StrExp { pos, kind: StrExpKind::Path(path) });
  }
  Err(p.expected(Expected::StrExp))
}

/// runs `f` with a nested state, so fixity declarations in it do not escape.
fn scoped<'a, 'cx, T, F>(p: &mut Parser<'a, 'cx>, f: F) -> Result<T>
where
  F: FnOnce(&mut Parser<'a, 'cx>) -> Result<T>,
{
  let saved = p.cx.state.clone();
  p.cx.state = saved.nested();
  let ret = f(p);
  p.cx.state = saved;
  ret
}

pub(crate) fn sig_exp(p: &mut Parser<'_, '_>) -> Result<SigExp> {
  let pos = p.pos();
  let kind = if p.eat_kw_opt("sig") {
    let specs = specs(p)?;
    p.eat_kw("end")?;
    SigExpKind::Spec(specs)
  } else {
    SigExpKind::Name(alnum(p)?)
  };
  if p.at_kw("where") {
    return Err(p.err(ErrorKind::FeatureNotImplemented("`where` type refinement")));
  }
  Ok(SigExp { pos, kind })
}

fn specs(p: &mut Parser<'_, '_>) -> Result<Vec<Spec>> {
  let mut ret = Vec::new();
  loop {
    if p.eat_kw_opt(";") {
      continue;
    }
    let pos = p.pos();
    let kind = if p.eat_kw_opt("val") {
      SpecKind::Val(and_sep(p, |p| {
        let name = vid(p)?;
        p.eat_kw(":")?;
        Ok((name, ty(p)?))
      })?)
    } else if p.eat_kw_opt("type") {
      SpecKind::Ty(and_sep(p, |p| ty_desc(p, true))?)
    } else if p.eat_kw_opt("eqtype") {
      SpecKind::EqTy(and_sep(p, |p| ty_desc(p, false))?)
    } else if p.at_kw("datatype") {
      match datatype(p)? {
        Datatype::Regular(binds) => SpecKind::Datatype(binds),
        Datatype::Copy(name, path) => SpecKind::DatatypeCopy(name, path),
      }
    } else if p.eat_kw_opt("exception") {
      SpecKind::Exception(and_sep(p, con_bind)?)
    } else if p.eat_kw_opt("structure") {
      SpecKind::Structure(and_sep(p, |p| {
        let name = alnum(p)?;
        p.eat_kw(":")?;
        Ok((name, sig_exp(p)?))
      })?)
    } else if p.eat_kw_opt("include") {
      SpecKind::Include(sig_exp(p)?)
    } else if p.at_kw("sharing") {
      return Err(p.err(ErrorKind::FeatureNotImplemented("`sharing` specifications")));
    } else {
      return Ok(ret);
    };
    ret.push(Spec { pos, kind });
  }
}

fn ty_desc(p: &mut Parser<'_, '_>, allow_def: bool) -> Result<TyDesc> {
  let ty_vars = ty_var_seq(p)?;
  let name = alnum(p)?;
  let ty = if allow_def && p.at_eq() {
    p.bump()?;
    Some(ty(p)?)
  } else {
    None
  };
  Ok(TyDesc { ty_vars, name, ty })
}
