//! Parsing expressions.

use crate::dec::decs;
use crate::parser::{ErrorKind, Expected, Parser, Result};
use crate::pat::pat;
use crate::ty::ty;
use crate::util::{
  Operator, comma_sep, infix_here, lab, op_val_path, resolve_infix, scon_of, val_path_of,
};
use sml_syntax::{Arm, Exp, ExpKind};

/// the expression levels after infix application, from tightest to loosest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ExpPrec {
  Handle,
  Orelse,
  Andalso,
  Typed,
}

pub(crate) fn exp(p: &mut Parser<'_, '_>) -> Result<Exp> {
  exp_prec(p, ExpPrec::Handle)
}

fn exp_prec(p: &mut Parser<'_, '_>, min: ExpPrec) -> Result<Exp> {
  if let Some(e) = right_extending(p)? {
    return Ok(e);
  }
  let mut ret = infix_exp(p)?;
  loop {
    let pos = ret.pos;
    if p.at_kw(":") && min <= ExpPrec::Typed {
      p.bump()?;
      let ty = ty(p)?;
      ret = Exp { pos, kind: ExpKind::Typed(Box::new(ret), ty) };
    } else if p.at_kw("andalso") && min <= ExpPrec::Andalso {
      p.bump()?;
      let rhs = exp_prec(p, ExpPrec::Typed)?;
      ret = Exp { pos, kind: ExpKind::Andalso(Box::new(ret), Box::new(rhs)) };
    } else if p.at_kw("orelse") && min <= ExpPrec::Orelse {
      p.bump()?;
      let rhs = exp_prec(p, ExpPrec::Andalso)?;
      ret = Exp { pos, kind: ExpKind::Orelse(Box::new(ret), Box::new(rhs)) };
    } else if p.at_kw("handle") && min <= ExpPrec::Handle {
      p.bump()?;
      let arms = matcher(p)?;
      ret = Exp { pos, kind: ExpKind::Handle(Box::new(ret), arms) };
    } else {
      return Ok(ret);
    }
  }
}

/// the forms that extend as far right as possible.
fn right_extending(p: &mut Parser<'_, '_>) -> Result<Option<Exp>> {
  let pos = p.pos();
  let kind = if p.eat_kw_opt("fn") {
    ExpKind::Fn(matcher(p)?)
  } else if p.eat_kw_opt("case") {
    let head = exp(p)?;
    p.eat_kw("of")?;
    ExpKind::Case(Box::new(head), matcher(p)?)
  } else if p.eat_kw_opt("if") {
    let cond = exp(p)?;
    p.eat_kw("then")?;
    let yes = exp(p)?;
    let no = if p.eat_kw_opt("else") {
      Some(Box::new(exp(p)?))
    } else {
      p.successor_ml("`if` without `else`")?;
      None
    };
    ExpKind::If(Box::new(cond), Box::new(yes), no)
  } else if p.eat_kw_opt("while") {
    let cond = exp(p)?;
    p.eat_kw("do")?;
    ExpKind::While(Box::new(cond), Box::new(exp(p)?))
  } else if p.eat_kw_opt("raise") {
    ExpKind::Raise(Box::new(exp(p)?))
  } else {
    return Ok(None);
  };
  Ok(Some(Exp { pos, kind }))
}

/// `p1 => e1 | p2 => e2 | ...`.
pub(crate) fn matcher(p: &mut Parser<'_, '_>) -> Result<Vec<Arm>> {
  if p.at_kw("|") {
    p.successor_ml("leading `|`")?;
    p.bump()?;
  }
  let mut ret = Vec::new();
  loop {
    let pat = pat(p)?;
    p.eat_kw("=>")?;
    let exp = exp(p)?;
    ret.push(Arm { pat, exp });
    if !p.eat_kw_opt("|") {
      return Ok(ret);
    }
  }
}

fn infix_exp(p: &mut Parser<'_, '_>) -> Result<Exp> {
  let mut operands = vec![app_exp(p)?];
  let mut ops = Vec::<Operator>::new();
  while let Some((name, info)) = infix_here(p, true) {
    let pos = p.pos();
    p.bump()?;
    ops.push(Operator { pos, name, info });
    operands.push(app_exp(p)?);
  }
  resolve_infix(operands, ops, |lhs, op, rhs| {
    let pos = lhs.pos;
    Exp { pos, kind: ExpKind::Infix(Box::new(lhs), op, Box::new(rhs)) }
  })
}

/// stops at any name that is currently infix.
fn app_exp(p: &mut Parser<'_, '_>) -> Result<Exp> {
  if infix_here(p, true).is_some() {
    return Err(p.err(ErrorKind::InfixWithoutOp));
  }
  let mut ret = at_exp(p)?;
  while at_exp_start(p) {
    let arg = at_exp(p)?;
    let pos = ret.pos;
    ret = Exp { pos, kind: ExpKind::App(Box::new(ret), Box::new(arg)) };
  }
  Ok(ret)
}

fn at_exp_start(p: &Parser<'_, '_>) -> bool {
  let Some(tok) = p.peek() else { return false };
  if ["op", "(", "[", "{", "#", "let"].iter().any(|kw| tok.is_kw(kw)) || scon_of(tok).is_some() {
    return true;
  }
  val_path_of(tok).is_some() && infix_here(p, true).is_none()
}

fn at_exp(p: &mut Parser<'_, '_>) -> Result<Exp> {
  let pos = p.pos();
  let Some(tok) = p.peek() else { return Err(p.expected(Expected::Exp)) };
  if let Some(scon) = scon_of(tok) {
    p.bump()?;
    return Ok(Exp { pos, kind: ExpKind::SCon(scon) });
  }
  if tok.is_kw("op") || val_path_of(tok).is_some() {
    let path = op_val_path(p)?;
    return Ok(Exp { pos, kind: ExpKind::Path(path) });
  }
  if p.eat_kw_opt("#") {
    let lab = lab(p)?;
    return Ok(Exp { pos, kind: ExpKind::Selector(lab) });
  }
  if p.eat_kw_opt("{") {
    let rows = comma_sep(p, "}", |p| {
      let lab = lab(p)?;
      p.eat_eq()?;
      Ok((lab, exp(p)?))
    })?;
    return Ok(Exp { pos, kind: ExpKind::Record(rows) });
  }
  if p.eat_kw_opt("[") {
    let exps = comma_sep(p, "]", exp)?;
    return Ok(Exp { pos, kind: ExpKind::List(exps) });
  }
  if p.eat_kw_opt("(") {
    return paren_exp(p, pos);
  }
  if p.eat_kw_opt("let") {
    // fixity declarations in the `let` do not escape it.
    let saved = p.cx.state.clone();
    p.cx.state = saved.nested();
    let res = decs(p).and_then(|ds| {
      p.eat_kw("in")?;
      Ok((ds, exp_seq(p, "end")?))
    });
    p.cx.state = saved;
    let (ds, exps) = res?;
    return Ok(Exp { pos, kind: ExpKind::Let(ds, exps) });
  }
  Err(p.expected(Expected::Exp))
}

/// assumes the `(` was eaten. `()`, `(e)`, `(e1, e2, ...)`, or `(e1; e2; ...)`.
fn paren_exp(p: &mut Parser<'_, '_>, pos: usize) -> Result<Exp> {
  if p.eat_kw_opt(")") {
    return Ok(Exp { pos, kind: ExpKind::Tuple(Vec::new()) });
  }
  let fst = exp(p)?;
  if p.at_kw(";") {
    let mut exps = vec![fst];
    p.bump()?;
    exps.extend(exp_seq(p, ")")?);
    return Ok(Exp { pos, kind: ExpKind::Seq(exps) });
  }
  let mut exps = vec![fst];
  while p.eat_kw_opt(",") {
    exps.push(exp(p)?);
  }
  p.eat_kw(")")?;
  if exps.len() == 1 {
    if let Some(e) = exps.pop() {
      return Ok(e);
    }
  }
  Ok(Exp { pos, kind: ExpKind::Tuple(exps) })
}

/// `e1; e2; ...` and then `end`. a trailing `;` needs Successor ML.
fn exp_seq(p: &mut Parser<'_, '_>, end: &'static str) -> Result<Vec<Exp>> {
  let mut ret = vec![exp(p)?];
  while p.eat_kw_opt(";") {
    if p.at_kw(end) {
      p.successor_ml("trailing `;` in a sequence")?;
      break;
    }
    ret.push(exp(p)?);
  }
  p.eat_kw(end)?;
  Ok(ret)
}
