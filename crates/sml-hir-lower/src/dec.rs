//! Lowering declarations, including the module language.

use crate::util::{
  Cx, Error, ErrorKind, Result, case, exp, fn_exp, name_exp, name_pat, tuple_exp, tuple_pat,
};
use crate::{exp as lower_exp, pat, ty};
use sml_fixity::Infix;
use sml_hir::{
  Arm, ConBind, DatBind, Dec, DecKind, Decs, ExBind, ExpKind, Fixity, FunctorBind, MatchFlavor,
  Pat, PatKind, SigBind, SigExp, SigExpKind, Spec, SpecKind, StrBind, StrExp, StrExpKind, TyBind,
  TyDesc, ValBind,
};
use sml_syntax::DecKind as SDecKind;
use std::collections::BTreeMap;
use std::rc::Rc;
use str_util::Name;

pub(crate) fn get_decs(cx: &mut Cx, decs: &[sml_syntax::Dec]) -> Result<Decs> {
  let decs = decs.iter().map(|dec| get(cx, dec)).collect::<Result<Vec<_>>>()?;
  Ok(Rc::from(decs))
}

fn get(cx: &mut Cx, dec: &sml_syntax::Dec) -> Result<Dec> {
  let pos = dec.pos;
  let kind = match &dec.kind {
    SDecKind::Val(tvs, binds) => {
      let binds = binds.iter().map(|bind| val_bind(cx, bind)).collect::<Result<Vec<_>>>()?;
      DecKind::Val(ty::ty_vars(tvs), binds)
    }
    SDecKind::Fun(tvs, binds) => {
      let binds = binds.iter().map(|bind| fun_bind(cx, bind)).collect::<Result<Vec<_>>>()?;
      DecKind::Val(ty::ty_vars(tvs), binds)
    }
    SDecKind::Ty(binds) => DecKind::Ty(ty_binds(binds)?),
    SDecKind::Datatype(binds) => DecKind::Datatype(dat_binds(binds)?),
    SDecKind::DatatypeCopy(name, path) => DecKind::DatatypeCopy(name.clone(), ty::path_of(path)),
    SDecKind::Abstype(binds, decs) => DecKind::Abstype(dat_binds(binds)?, get_decs(cx, decs)?),
    SDecKind::Exception(binds) => {
      let binds = binds
        .iter()
        .map(|bind| match bind {
          sml_syntax::ExBind::New(name, t) => {
            Ok(ExBind::New(name.clone(), ty::get_opt(t.as_ref())?))
          }
          sml_syntax::ExBind::Copy(name, path) => Ok(ExBind::Copy(name.clone(), ty::path_of(path))),
        })
        .collect::<Result<Vec<_>>>()?;
      DecKind::Exception(binds)
    }
    SDecKind::Local(fst, snd) => DecKind::Local(get_decs(cx, fst)?, get_decs(cx, snd)?),
    SDecKind::Open(paths) => DecKind::Open(paths.iter().map(ty::path_of).collect()),
    SDecKind::Infix(prec, names) => {
      DecKind::Fixity(Fixity::Infix(Infix::left(*prec)), names.clone())
    }
    SDecKind::Infixr(prec, names) => {
      DecKind::Fixity(Fixity::Infix(Infix::right(*prec)), names.clone())
    }
    SDecKind::Nonfix(names) => DecKind::Fixity(Fixity::Nonfix, names.clone()),
    SDecKind::Do(e) => {
      cov_mark::hit("do_dec");
      let pat = Pat { pos, kind: PatKind::Record(BTreeMap::new(), false) };
      let bind = ValBind { rec: false, pat, exp: lower_exp::get(cx, e)? };
      DecKind::Val(Vec::new(), vec![bind])
    }
    SDecKind::Structure(binds) => {
      let binds = binds
        .iter()
        .map(|bind| Ok(StrBind { name: bind.name.clone(), str_exp: str_exp(cx, &bind.str_exp)? }))
        .collect::<Result<Vec<_>>>()?;
      DecKind::Structure(binds)
    }
    SDecKind::Signature(binds) => {
      let binds = binds
        .iter()
        .map(|bind| Ok(SigBind { name: bind.name.clone(), sig_exp: sig_exp(&bind.sig_exp)? }))
        .collect::<Result<Vec<_>>>()?;
      DecKind::Signature(binds)
    }
    SDecKind::Functor(binds) => {
      let binds = binds
        .iter()
        .map(|bind| {
          Ok(FunctorBind {
            name: bind.name.clone(),
            param: bind.param.clone(),
            param_sig: sig_exp(&bind.param_sig)?,
            body: str_exp(cx, &bind.body)?,
          })
        })
        .collect::<Result<Vec<_>>>()?;
      DecKind::Functor(binds)
    }
  };
  Ok(Dec { pos, kind })
}

fn val_bind(cx: &mut Cx, bind: &sml_syntax::ValBind) -> Result<ValBind> {
  let pat = pat::get(&bind.pat)?;
  let exp = lower_exp::get(cx, &bind.exp)?;
  if bind.rec && !is_fn(&exp) {
    return Err(Error { pos: bind.exp.pos, kind: ErrorKind::RecNotFn });
  }
  Ok(ValBind { rec: bind.rec, pat, exp })
}

fn is_fn(exp: &sml_hir::Exp) -> bool {
  match &exp.kind {
    ExpKind::Fn(_) => true,
    ExpKind::Typed(exp, _) => is_fn(exp),
    _ => false,
  }
}

/// a long name, allowed only with an option checked by the parser, is bound as one name.
fn fun_name(path: &sml_syntax::Path) -> Name {
  if path.prefix.is_empty() { path.last.clone() } else { Name::new(path.to_string()) }
}

/// `fun f p1 p2 = e1 | f q1 q2 = e2` becomes
/// `val rec f = fn a1 => fn a2 => case (a1, a2) of (p1, p2) => e1 | (q1, q2) => e2`.
fn fun_bind(cx: &mut Cx, bind: &sml_syntax::FunBind) -> Result<ValBind> {
  let Some(first) = bind.clauses.first() else { unreachable!("a `fun` binding has a clause") };
  let name = fun_name(&first.name);
  let arity = first.pats.len();
  if arity == 0 {
    return Err(Error { pos: first.pos, kind: ErrorKind::EmptyFun });
  }
  let mut arms = Vec::with_capacity(bind.clauses.len());
  for clause in &bind.clauses {
    let clause_name = fun_name(&clause.name);
    if clause_name != name {
      let kind = ErrorKind::FunBindMismatchedName(name, clause_name);
      return Err(Error { pos: clause.pos, kind });
    }
    if clause.pats.len() != arity {
      let kind = ErrorKind::FunBindWrongNumPats(arity, clause.pats.len());
      return Err(Error { pos: clause.pos, kind });
    }
    let mut pats = clause.pats.iter().map(pat::get).collect::<Result<Vec<_>>>()?;
    let pat = match pats.pop() {
      Some(pat) if pats.is_empty() => pat,
      Some(last) => {
        pats.push(last);
        tuple_pat(clause.pos, pats)
      }
      None => unreachable!("arity is checked to be non-zero"),
    };
    let mut body = lower_exp::get(cx, &clause.body)?;
    if let Some(ret_ty) = &clause.ret_ty {
      let body_pos = body.pos;
      body = exp(body_pos, ExpKind::Typed(body, ty::get(ret_ty)?));
    }
    arms.push(Arm { pat, exp: body });
  }
  let pos = bind.pos;
  let func = if arity == 1 {
    fn_exp(pos, arms, MatchFlavor::Fun)
  } else {
    let names: Vec<_> = (0..arity).map(|_| cx.fresh("arg")).collect();
    let head = tuple_exp(pos, names.iter().map(|name| name_exp(pos, name.clone())).collect());
    let mut ret = case(pos, head, arms, MatchFlavor::Fun);
    for name in names.into_iter().rev() {
      let arm = Arm { pat: name_pat(pos, name), exp: ret };
      ret = fn_exp(pos, vec![arm], MatchFlavor::Derived);
    }
    ret
  };
  Ok(ValBind { rec: true, pat: name_pat(pos, name), exp: func })
}

fn ty_binds(binds: &[sml_syntax::TyBind]) -> Result<Vec<TyBind>> {
  binds
    .iter()
    .map(|bind| {
      Ok(TyBind {
        ty_vars: ty::ty_vars(&bind.ty_vars),
        name: bind.name.clone(),
        ty: ty::get(&bind.ty)?,
      })
    })
    .collect()
}

fn dat_binds(binds: &[sml_syntax::DatBind]) -> Result<Vec<DatBind>> {
  binds
    .iter()
    .map(|bind| {
      Ok(DatBind {
        pos: bind.pos,
        ty_vars: ty::ty_vars(&bind.ty_vars),
        name: bind.name.clone(),
        cons: con_binds(&bind.cons)?,
      })
    })
    .collect()
}

fn con_binds(binds: &[sml_syntax::ConBind]) -> Result<Vec<ConBind>> {
  binds
    .iter()
    .map(|bind| Ok(ConBind { name: bind.name.clone(), ty: ty::get_opt(bind.ty.as_ref())? }))
    .collect()
}

fn str_exp(cx: &mut Cx, str_exp_: &sml_syntax::StrExp) -> Result<Rc<StrExp>> {
  let kind = match &str_exp_.kind {
    sml_syntax::StrExpKind::Struct(decs) => StrExpKind::Struct(get_decs(cx, decs)?),
    sml_syntax::StrExpKind::Path(path) => StrExpKind::Path(ty::path_of(path)),
    sml_syntax::StrExpKind::Ascription(inner, asc, sig) => {
      let asc = match asc {
        sml_syntax::Ascription::Transparent => sml_hir::Ascription::Transparent,
        sml_syntax::Ascription::Opaque => sml_hir::Ascription::Opaque,
      };
      StrExpKind::Ascription(str_exp(cx, inner)?, asc, sig_exp(sig)?)
    }
    sml_syntax::StrExpKind::App(name, arg) => StrExpKind::App(name.clone(), str_exp(cx, arg)?),
    sml_syntax::StrExpKind::Let(decs, body) => {
      StrExpKind::Let(get_decs(cx, decs)?, str_exp(cx, body)?)
    }
  };
  Ok(Rc::new(StrExp { pos: str_exp_.pos, kind }))
}

fn sig_exp(sig_exp_: &sml_syntax::SigExp) -> Result<Rc<SigExp>> {
  let kind = match &sig_exp_.kind {
    sml_syntax::SigExpKind::Spec(specs) => {
      SigExpKind::Spec(specs.iter().map(spec).collect::<Result<Vec<_>>>()?)
    }
    sml_syntax::SigExpKind::Name(name) => SigExpKind::Name(name.clone()),
  };
  Ok(Rc::new(SigExp { pos: sig_exp_.pos, kind }))
}

fn spec(spec: &sml_syntax::Spec) -> Result<Spec> {
  let kind = match &spec.kind {
    sml_syntax::SpecKind::Val(vals) => SpecKind::Val(
      vals.iter().map(|(name, t)| Ok((name.clone(), ty::get(t)?))).collect::<Result<Vec<_>>>()?,
    ),
    sml_syntax::SpecKind::Ty(descs) => SpecKind::Ty(ty_descs(descs)?, false),
    sml_syntax::SpecKind::EqTy(descs) => SpecKind::Ty(ty_descs(descs)?, true),
    sml_syntax::SpecKind::Datatype(binds) => SpecKind::Datatype(dat_binds(binds)?),
    sml_syntax::SpecKind::DatatypeCopy(name, path) => {
      SpecKind::DatatypeCopy(name.clone(), ty::path_of(path))
    }
    sml_syntax::SpecKind::Exception(binds) => SpecKind::Exception(con_binds(binds)?),
    sml_syntax::SpecKind::Structure(strs) => SpecKind::Structure(
      strs.iter().map(|(name, sig)| Ok((name.clone(), sig_exp(sig)?))).collect::<Result<Vec<_>>>()?,
    ),
    sml_syntax::SpecKind::Include(sig) => SpecKind::Include(sig_exp(sig)?),
  };
  Ok(Spec { pos: spec.pos, kind })
}

fn ty_descs(descs: &[sml_syntax::TyDesc]) -> Result<Vec<TyDesc>> {
  descs
    .iter()
    .map(|desc| {
      Ok(TyDesc {
        ty_vars: ty::ty_vars(&desc.ty_vars),
        name: desc.name.clone(),
        ty: ty::get_opt(desc.ty.as_ref())?,
      })
    })
    .collect()
}
