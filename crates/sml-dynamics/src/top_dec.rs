//! Evaluating structures, signatures, and functors.

use crate::dec;
use crate::error::{ErrorKind, Item};
use crate::types::{FrameKind, Result, St, Step};
use sml_hir::{DecKind, Decs, Path, SigExpKind, SpecKind, StrExpKind};
use sml_state::{DynEnv, DynFunctor, DynSig};
use sml_statics_types::env::IdStatus;
use std::rc::Rc;
use str_util::Name;

pub(crate) fn get_str_exp(st: &mut St<'_>, str_exp: &sml_hir::StrExp) -> Result<Step> {
  st.pos = str_exp.pos;
  match &str_exp.kind {
    StrExpKind::Struct(decs) => {
      let inner = st.state.nested();
      st.push(FrameKind::Struct(inner.id()))?;
      st.state = inner;
      dec::start(st, decs)
    }
    StrExpKind::Path(path) => Ok(Step::Str(get_str(st, path)?)),
    StrExpKind::Ascription(inner, _, sig_exp) => {
      let sig = get_sig_exp(st, sig_exp)?;
      st.push(FrameKind::Ascription(sig))?;
      Ok(Step::StrExp(Rc::clone(inner)))
    }
    StrExpKind::App(name, arg) => {
      let Some(functor) = st.state.dyn_functor(name.as_str()) else {
        return Err(st.err(ErrorKind::Undefined(Item::Functor, name.to_string())));
      };
      st.push(FrameKind::FunctorArg(functor))?;
      Ok(Step::StrExp(Rc::clone(arg)))
    }
    StrExpKind::Let(decs, body) => {
      st.push(FrameKind::StrLet(Rc::clone(body)))?;
      st.state = st.state.nested();
      dec::start(st, decs)
    }
  }
}

/// Continues a `structure` declaration after one of its bindings is ready.
pub(crate) fn str_bind_next(
  st: &mut St<'_>,
  decs: Decs,
  idx: usize,
  mut envs: Vec<(Name, DynEnv)>,
  env: Option<DynEnv>,
) -> Result<Step> {
  let DecKind::Structure(binds) = &decs[idx].kind else { unreachable!("not a structure") };
  if let Some(env) = env {
    envs.push((binds[envs.len()].name.clone(), env));
  }
  match binds.get(envs.len()) {
    Some(bind) => {
      let str_exp = Rc::clone(&bind.str_exp);
      st.push(FrameKind::StrBind(Rc::clone(&decs), idx, envs))?;
      Ok(Step::StrExp(str_exp))
    }
    None => {
      for (name, env) in envs {
        st.state.set_dynamic_str(name, env);
      }
      Ok(Step::DecDone)
    }
  }
}

/// Runs the functor body with the parameter bound to the argument, in the state the functor was
/// declared in.
pub(crate) fn functor_body(st: &mut St<'_>, functor: &DynFunctor, arg: DynEnv) -> Result<Step> {
  let scope = functor.state.nested();
  scope.set_dynamic_str(functor.param.clone(), arg.filter(&functor.param_sig));
  let caller = st.state.clone();
  st.push_restore(caller)?;
  st.state = scope;
  Ok(Step::StrExp(Rc::clone(&functor.body)))
}

pub(crate) fn functor_binds(st: &St<'_>, binds: &[sml_hir::FunctorBind]) -> Result<()> {
  let mut functors = Vec::with_capacity(binds.len());
  for bind in binds {
    let functor = DynFunctor {
      param: bind.param.clone(),
      param_sig: get_sig_exp(st, &bind.param_sig)?,
      body: Rc::clone(&bind.body),
      state: st.state.clone(),
    };
    functors.push((bind.name.clone(), Rc::new(functor)));
  }
  for (name, functor) in functors {
    st.state.set_dyn_functor(name, functor);
  }
  Ok(())
}

/// Returns the env of the structure at the path.
pub(crate) fn get_str(st: &St<'_>, path: &Path) -> Result<DynEnv> {
  let names: Vec<_> = path.prefix.iter().chain(std::iter::once(&path.last)).cloned().collect();
  st.state
    .with_dynamic_str(&names, DynEnv::clone)
    .map_err(|name| st.err(ErrorKind::Undefined(Item::Struct, name.to_string())))
}

/// Returns the names a signature lets through, and their statuses.
pub(crate) fn get_sig_exp(st: &St<'_>, sig_exp: &sml_hir::SigExp) -> Result<DynSig> {
  match &sig_exp.kind {
    SigExpKind::Name(name) => st
      .state
      .dyn_sig(name.as_str())
      .ok_or_else(|| st.err(ErrorKind::Undefined(Item::Sig, name.to_string()))),
    SigExpKind::Spec(specs) => {
      let mut ret = DynSig::default();
      for spec in specs {
        get_spec(st, &mut ret, spec)?;
      }
      Ok(ret)
    }
  }
}

fn get_spec(st: &St<'_>, sig: &mut DynSig, spec: &sml_hir::Spec) -> Result<()> {
  match &spec.kind {
    SpecKind::Val(binds) => {
      for (name, _) in binds {
        sig.val_env.insert(name.clone(), IdStatus::Val);
      }
    }
    SpecKind::Ty(descs, _) => {
      for desc in descs {
        sig.ty_env.insert(desc.name.clone(), Vec::new());
      }
    }
    SpecKind::Datatype(binds) => {
      for bind in binds {
        let cons: Vec<_> = bind.cons.iter().map(|con| con.name.clone()).collect();
        for con in &cons {
          sig.val_env.insert(con.clone(), IdStatus::Con);
        }
        sig.ty_env.insert(bind.name.clone(), cons);
      }
    }
    SpecKind::DatatypeCopy(name, path) => {
      let cons = match sig.ty_env.get(&path.last) {
        Some(cons) if path.is_one() => cons.clone(),
        _ => dec::get_ty(st, path),
      };
      for con in &cons {
        sig.val_env.insert(con.clone(), IdStatus::Con);
      }
      sig.ty_env.insert(name.clone(), cons);
    }
    SpecKind::Exception(binds) => {
      for bind in binds {
        sig.val_env.insert(bind.name.clone(), IdStatus::Exn);
      }
    }
    SpecKind::Structure(binds) => {
      for (name, sig_exp) in binds {
        let inner = get_sig_exp(st, sig_exp)?;
        sig.str_env.insert(name.clone(), inner);
      }
    }
    SpecKind::Include(sig_exp) => {
      let inner = get_sig_exp(st, sig_exp)?;
      sig.extend(inner);
    }
  }
  Ok(())
}
