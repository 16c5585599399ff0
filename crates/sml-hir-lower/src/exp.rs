//! Lowering expressions.

use crate::util::{
  Cx, Error, ErrorKind, Result, app, case, exp, fn_exp, if_exp, name_exp, name_pat, path_exp, seq,
  tuple, tuple_exp, unit_exp,
};
use crate::{dec, pat, ty};
use sml_hir::{Arm, Dec, DecKind, ExpKind, Lab, MatchFlavor, Pat, PatKind, ValBind};
use sml_syntax::ExpKind as SExpKind;
use std::collections::BTreeMap;
use std::rc::Rc;

pub(crate) fn get(cx: &mut Cx, e: &sml_syntax::Exp) -> Result<Rc<sml_hir::Exp>> {
  let pos = e.pos;
  let ret = match &e.kind {
    SExpKind::SCon(scon) => exp(pos, ExpKind::SCon(scon.clone())),
    SExpKind::Path(path) => exp(pos, ExpKind::Path(ty::path_of(path))),
    SExpKind::Record(rows) => {
      // rows are evaluated in source order, so keep them in a vec.
      let mut ret = Vec::<(Lab, Rc<sml_hir::Exp>)>::with_capacity(rows.len());
      for (lab, e) in rows {
        if ret.iter().any(|(l, _)| l == lab) {
          return Err(Error { pos, kind: ErrorKind::DuplicateLab(lab.clone()) });
        }
        ret.push((lab.clone(), get(cx, e)?));
      }
      exp(pos, ExpKind::Record(ret))
    }
    SExpKind::Selector(lab) => {
      let name = cx.fresh("sel");
      let mut rows = BTreeMap::new();
      rows.insert(lab.clone(), name_pat(pos, name.clone()));
      let pat = Pat { pos, kind: PatKind::Record(rows, true) };
      fn_exp(pos, vec![Arm { pat, exp: name_exp(pos, name) }], MatchFlavor::Derived)
    }
    SExpKind::Tuple(exps) => {
      let exps = exps.iter().map(|e| get(cx, e)).collect::<Result<Vec<_>>>()?;
      exp(pos, ExpKind::Record(tuple(exps)))
    }
    SExpKind::List(exps) => {
      let mut ret = path_exp(pos, "nil");
      for e in exps.iter().rev() {
        let hd = get(cx, e)?;
        let hd_pos = hd.pos;
        ret = app(hd_pos, path_exp(hd_pos, "::"), tuple_exp(hd_pos, vec![hd, ret]));
      }
      ret
    }
    SExpKind::Seq(exps) => exp_seq(cx, pos, exps)?,
    SExpKind::Let(decs, exps) => {
      let decs = dec::get_decs(cx, decs)?;
      let body = exp_seq(cx, pos, exps)?;
      exp(pos, ExpKind::Let(decs, body))
    }
    SExpKind::App(func, arg) => app(pos, get(cx, func)?, get(cx, arg)?),
    SExpKind::Infix(lhs, op, rhs) => {
      let func = exp(pos, ExpKind::Path(ty::path_of(op)));
      let arg = tuple_exp(pos, vec![get(cx, lhs)?, get(cx, rhs)?]);
      app(pos, func, arg)
    }
    SExpKind::Typed(e, t) => exp(pos, ExpKind::Typed(get(cx, e)?, ty::get(t)?)),
    SExpKind::Andalso(lhs, rhs) => {
      if_exp(pos, get(cx, lhs)?, get(cx, rhs)?, path_exp(pos, "false"))
    }
    SExpKind::Orelse(lhs, rhs) => if_exp(pos, get(cx, lhs)?, path_exp(pos, "true"), get(cx, rhs)?),
    SExpKind::Handle(head, arms) => {
      let head = get(cx, head)?;
      let arms = get_arms(cx, arms)?;
      let m = sml_hir::Match { pos, arms, flavor: MatchFlavor::Handle };
      exp(pos, ExpKind::Handle(head, Rc::new(m)))
    }
    SExpKind::Raise(e) => exp(pos, ExpKind::Raise(get(cx, e)?)),
    SExpKind::If(cond, yes, no) => {
      let no = match no {
        Some(no) => get(cx, no)?,
        None => unit_exp(pos),
      };
      if_exp(pos, get(cx, cond)?, get(cx, yes)?, no)
    }
    SExpKind::While(cond, body) => {
      let name = cx.fresh("while");
      let cond = get(cx, cond)?;
      let body = get(cx, body)?;
      let again = app(pos, name_exp(pos, name.clone()), unit_exp(pos));
      let loop_body = if_exp(pos, cond, seq(pos, body, again.clone()), unit_exp(pos));
      let unit_pat = Pat { pos, kind: PatKind::Record(BTreeMap::new(), false) };
      let func = fn_exp(pos, vec![Arm { pat: unit_pat, exp: loop_body }], MatchFlavor::Derived);
      let bind = ValBind { rec: true, pat: name_pat(pos, name), exp: func };
      let dec = Dec { pos, kind: DecKind::Val(Vec::new(), vec![bind]) };
      exp(pos, ExpKind::Let(Rc::from([dec]), again))
    }
    SExpKind::Case(head, arms) => {
      let head = get(cx, head)?;
      case(pos, head, get_arms(cx, arms)?, MatchFlavor::Case)
    }
    SExpKind::Fn(arms) => fn_exp(pos, get_arms(cx, arms)?, MatchFlavor::Fn),
  };
  Ok(ret)
}

pub(crate) fn get_arms(cx: &mut Cx, arms: &[sml_syntax::Arm]) -> Result<Vec<Arm>> {
  arms.iter().map(|arm| Ok(Arm { pat: pat::get(&arm.pat)?, exp: get(cx, &arm.exp)? })).collect()
}

/// `e1; e2; ...; en`, which must be non-empty.
fn exp_seq(cx: &mut Cx, pos: usize, exps: &[sml_syntax::Exp]) -> Result<Rc<sml_hir::Exp>> {
  let mut iter = exps.iter().rev();
  let mut ret = match iter.next() {
    Some(e) => get(cx, e)?,
    None => unit_exp(pos),
  };
  for e in iter {
    let fst = get(cx, e)?;
    ret = seq(fst.pos, fst, ret);
  }
  Ok(ret)
}
