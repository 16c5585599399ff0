//! Evaluating declarations.

use crate::error::{Error, ErrorKind};
use crate::step::get_val;
use crate::top_dec;
use crate::types::{FrameKind, Result, St, Step};
use sml_hir::{DecKind, Decs, ExBind, ExpKind, Path, PatKind};
use sml_state::{Closure, Con, Rebind, State, Val};
use sml_statics_types::env::IdStatus;
use std::rc::Rc;
use str_util::Name;

/// Starts running the declarations in order.
pub(crate) fn start(st: &mut St<'_>, decs: &Decs) -> Result<Step> {
  if decs.is_empty() {
    return Ok(Step::DecDone);
  }
  seq(st, Rc::clone(decs), 0)
}

/// Runs the declaration at the index, then the rest after it.
pub(crate) fn seq(st: &mut St<'_>, decs: Decs, idx: usize) -> Result<Step> {
  if idx + 1 < decs.len() {
    st.push(FrameKind::DecSeq(Rc::clone(&decs), idx + 1))?;
  }
  Ok(Step::Dec(decs, idx))
}

pub(crate) fn get(st: &mut St<'_>, decs: &Decs, idx: usize) -> Result<Step> {
  let dec = &decs[idx];
  st.pos = dec.pos;
  // a new node for each declaration, so closures made by earlier ones do not see later ones.
  st.state = st.state.child();
  match &dec.kind {
    DecKind::Val(_, binds) => {
      let non_rec = binds.iter().take_while(|b| !b.rec).count();
      match binds.first() {
        Some(bind) if non_rec != 0 => {
          st.push(FrameKind::ValBind(Rc::clone(decs), idx, Vec::with_capacity(non_rec)))?;
          Ok(Step::Exp(Rc::clone(&bind.exp)))
        }
        _ => val_binds(st, decs, idx, &[]),
      }
    }
    DecKind::Ty(_) => Ok(Step::DecDone),
    DecKind::Datatype(binds) => {
      dat_binds(st, binds)?;
      Ok(Step::DecDone)
    }
    DecKind::DatatypeCopy(name, path) => {
      let cons = get_ty(st, path);
      for con in &cons {
        let (val, id_status) = get_val(st, &Path::new(path.prefix.clone(), con.clone()))?;
        st.state.set_dynamic_val(con.clone(), val, id_status);
      }
      st.state.set_dynamic_ty(name.clone(), cons);
      Ok(Step::DecDone)
    }
    DecKind::Abstype(binds, inner) => {
      let outer = st.state.clone();
      let fst = outer.nested();
      st.state = fst.clone();
      dat_binds(st, binds)?;
      st.state = fst.nested();
      st.push_with(outer, FrameKind::LocalSnd(fst))?;
      start(st, inner)
    }
    DecKind::Exception(binds) => {
      for bind in binds {
        match bind {
          ExBind::New(name, ty) => {
            check_rebind(st, name, IdStatus::Exn)?;
            let id = st.fresh_id(name);
            let val = if ty.is_some() {
              Val::ExnFn(name.clone(), id)
            } else {
              Val::Exn(Con { name: name.clone(), id, arg: None })
            };
            st.state.set_dynamic_val(name.clone(), val, IdStatus::Exn);
          }
          ExBind::Copy(name, path) => {
            check_rebind(st, name, IdStatus::Exn)?;
            let (val, _) = get_val(st, path)?;
            st.state.set_dynamic_val(name.clone(), val, IdStatus::Exn);
          }
        }
      }
      Ok(Step::DecDone)
    }
    DecKind::Local(fst, snd) => {
      st.push(FrameKind::LocalFst(Rc::clone(snd)))?;
      st.state = st.state.nested();
      start(st, fst)
    }
    DecKind::Open(paths) => {
      let envs = paths.iter().map(|path| top_dec::get_str(st, path)).collect::<Result<Vec<_>>>()?;
      for env in envs {
        st.state.extend_dynamic(env);
      }
      Ok(Step::DecDone)
    }
    DecKind::Fixity(fixity, names) => {
      for name in names {
        st.state.set_fixity(name.clone(), *fixity);
      }
      Ok(Step::DecDone)
    }
    DecKind::Structure(_) => top_dec::str_bind_next(st, Rc::clone(decs), idx, Vec::new(), None),
    DecKind::Signature(binds) => {
      let sigs = binds
        .iter()
        .map(|bind| Ok((bind.name.clone(), top_dec::get_sig_exp(st, &bind.sig_exp)?)))
        .collect::<Result<Vec<_>>>()?;
      for (name, sig) in sigs {
        st.state.set_dyn_sig(name, sig);
      }
      Ok(Step::DecDone)
    }
    DecKind::Functor(binds) => {
      top_dec::functor_binds(st, binds)?;
      Ok(Step::DecDone)
    }
  }
}

/// Continues a `val` after the value of one of its non-`rec` bindings is ready.
pub(crate) fn val_bind_next(
  st: &mut St<'_>,
  decs: Decs,
  idx: usize,
  vals: Vec<Val>,
) -> Result<Step> {
  let DecKind::Val(_, binds) = &decs[idx].kind else { unreachable!("not a val") };
  match binds.get(vals.len()) {
    Some(bind) if !bind.rec => {
      let exp = Rc::clone(&bind.exp);
      st.push(FrameKind::ValBind(Rc::clone(&decs), idx, vals))?;
      Ok(Step::Exp(exp))
    }
    _ => val_binds(st, &decs, idx, &vals),
  }
}

/// Binds everything in the `val`, given the values of the non-`rec` bindings.
fn val_binds(st: &mut St<'_>, decs: &Decs, idx: usize, vals: &[Val]) -> Result<Step> {
  let DecKind::Val(_, binds) = &decs[idx].kind else { unreachable!("not a val") };
  let mut ac = Vec::<(Name, Val)>::new();
  for (bind, val) in binds.iter().zip(vals) {
    match crate::pat_match::get(&st.state, &bind.pat, val) {
      Some(xs) => ac.extend(xs),
      None => return Ok(Step::Raise(Val::exn("Bind", 0))),
    }
  }
  let mut group = Vec::<(Name, Rc<sml_hir::Match>)>::new();
  for bind in &binds[vals.len()..] {
    match (rec_name(&bind.pat), fn_match(&bind.exp)) {
      (Some(name), Some(matcher)) => group.push((name.clone(), matcher)),
      _ => return Err(Error { pos: bind.pat.pos, kind: ErrorKind::BadRec }),
    }
  }
  let group: Rc<[_]> = Rc::from(group);
  for (name, body) in group.iter() {
    let clos = Closure { state: st.state.clone(), rec: Rc::clone(&group), body: Rc::clone(body) };
    ac.push((name.clone(), Val::Closure(Rc::new(clos))));
  }
  for (name, _) in &ac {
    check_rebind(st, name, IdStatus::Val)?;
  }
  for (name, val) in ac {
    st.state.set_dynamic_val(name, val, IdStatus::Val);
  }
  Ok(Step::DecDone)
}

fn rec_name(pat: &sml_hir::Pat) -> Option<&Name> {
  match &pat.kind {
    PatKind::Con(path, None) if path.is_one() => Some(&path.last),
    PatKind::Typed(inner, _) => rec_name(inner),
    _ => None,
  }
}

fn fn_match(exp: &sml_hir::Exp) -> Option<Rc<sml_hir::Match>> {
  match &exp.kind {
    ExpKind::Fn(matcher) => Some(Rc::clone(matcher)),
    ExpKind::Typed(inner, _) => fn_match(inner),
    _ => None,
  }
}

/// Declares the datatypes, with fresh generation ids for each constructor.
pub(crate) fn dat_binds(st: &St<'_>, binds: &[sml_hir::DatBind]) -> Result<()> {
  for bind in binds {
    let mut cons = Vec::with_capacity(bind.cons.len());
    for con in &bind.cons {
      check_rebind(st, &con.name, IdStatus::Con)?;
      let id = st.fresh_id(&con.name);
      let val = if con.ty.is_some() {
        Val::ConFn(con.name.clone(), id)
      } else {
        Val::Con(Con { name: con.name.clone(), id, arg: None })
      };
      st.state.set_dynamic_val(con.name.clone(), val, IdStatus::Con);
      cons.push(con.name.clone());
    }
    st.state.set_dynamic_ty(bind.name.clone(), cons);
  }
  Ok(())
}

/// Returns the constructor names of the type. Types that are not datatypes have none.
pub(crate) fn get_ty(st: &St<'_>, path: &Path) -> Vec<Name> {
  let found = if path.is_one() {
    st.state.dynamic_ty(path.last.as_str())
  } else {
    let got = st.state.with_dynamic_str(&path.prefix, |env| env.ty_env.get(&path.last).cloned());
    got.ok().flatten()
  };
  found.unwrap_or_default()
}

/// Finishes a `local` or `abstype`.
///
/// The second part ran in a scope nested in the first. Its bindings are copied to a new node whose
/// parent is `outer`, so the first part's bindings go out of scope. Closures made by the second
/// part keep the original chain, so they still see the first part.
pub(crate) fn finish_local(st: &mut St<'_>, outer: &State, fst: &State) {
  let snd = fst.nested();
  snd.absorb(&st.state, snd.id());
  snd.reparent(outer);
  st.state = snd;
}

fn check_rebind(st: &St<'_>, name: &Name, id_status: IdStatus) -> Result<()> {
  if !st.options.check_rebind {
    return Ok(());
  }
  let ok = match st.state.rebind(name.as_str()) {
    Rebind::Allowed => true,
    Rebind::Half => !id_status.is_con(),
    Rebind::Never => false,
  };
  if ok { Ok(()) } else { Err(st.err(ErrorKind::InvalidRebindName(name.clone()))) }
}
