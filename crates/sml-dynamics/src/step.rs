//! Stepping a stack machine.
//!
//! Nothing here recurses on the structure of the program. Instead each step either finishes with a
//! result, or pushes a frame saying what to do with the result of a sub-part and moves on to that
//! sub-part. This way deep SML recursion only grows the frame stack, which has a limit.

use crate::error::{ErrorKind, Item};
use crate::types::{Frame, FrameKind, Result, St, Step};
use crate::{builtin, dec, pat_match, top_dec};
use sml_hir::{ExpKind, Path, SCon};
use sml_state::{Closure, Con, Val};
use sml_statics_types::env::IdStatus;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Runs until the frames are all popped, and returns the final step, which is a value, a raised
/// exception, the end of a declaration, or a structure.
pub(crate) fn run(st: &mut St<'_>, mut step: Step) -> Result<Step> {
  loop {
    step = match step {
      Step::Exp(exp) => exp_step(st, &exp)?,
      Step::Dec(decs, idx) => dec::get(st, &decs, idx)?,
      Step::StrExp(str_exp) => top_dec::get_str_exp(st, &str_exp)?,
      Step::Raise(val) => match st.frames.pop() {
        None => return Ok(Step::Raise(val)),
        Some(frame) => raise(st, frame, val),
      },
      done => match st.frames.pop() {
        None => return Ok(done),
        Some(frame) => ret(st, frame, done)?,
      },
    };
  }
}

fn exp_step(st: &mut St<'_>, exp: &sml_hir::Exp) -> Result<Step> {
  st.pos = exp.pos;
  let ret = match &exp.kind {
    ExpKind::SCon(scon) => Step::Val(match scon {
      SCon::Int(n) => Val::Int(*n),
      SCon::Real(x) => Val::Real(*x),
      SCon::Word(w) => Val::Word(*w),
      SCon::Char(c) => Val::Char(*c),
      SCon::String(s) => Val::String(s.clone()),
    }),
    ExpKind::Path(path) => Step::Val(get_val(st, path)?.0),
    ExpKind::Record(rows) => {
      let mut rows: Vec<_> = rows.iter().rev().cloned().collect();
      match rows.pop() {
        None => Step::Val(Val::unit()),
        Some((lab, exp)) => {
          st.push(FrameKind::Record(BTreeMap::new(), lab, rows))?;
          Step::Exp(exp)
        }
      }
    }
    ExpKind::Let(decs, body) => {
      st.push(FrameKind::Let(Rc::clone(body)))?;
      st.state = st.state.nested();
      dec::start(st, decs)?
    }
    ExpKind::App(func, arg) => {
      st.push(FrameKind::AppFunc(Rc::clone(arg)))?;
      Step::Exp(Rc::clone(func))
    }
    ExpKind::Handle(inner, matcher) => {
      st.push(FrameKind::Handle(Rc::clone(matcher)))?;
      Step::Exp(Rc::clone(inner))
    }
    ExpKind::Raise(inner) => {
      st.push(FrameKind::Raise)?;
      Step::Exp(Rc::clone(inner))
    }
    ExpKind::Fn(matcher) => {
      let clos =
        Closure { state: st.state.clone(), rec: Rc::from(Vec::new()), body: Rc::clone(matcher) };
      Step::Val(Val::Closure(Rc::new(clos)))
    }
    ExpKind::Typed(inner, _) => Step::Exp(Rc::clone(inner)),
  };
  Ok(ret)
}

/// Gives a finished result to the frame.
fn ret(st: &mut St<'_>, frame: Frame, step: Step) -> Result<Step> {
  match (frame.kind, step) {
    (FrameKind::Record(mut rows, lab, mut rest), Step::Val(val)) => {
      rows.insert(lab, val);
      st.state = frame.state;
      match rest.pop() {
        None => Ok(Step::Val(Val::Record(rows))),
        Some((lab, exp)) => {
          st.push(FrameKind::Record(rows, lab, rest))?;
          Ok(Step::Exp(exp))
        }
      }
    }
    (FrameKind::AppFunc(arg), Step::Val(func)) => {
      st.state = frame.state;
      st.push(FrameKind::AppArg(func))?;
      Ok(Step::Exp(arg))
    }
    (FrameKind::AppArg(func), Step::Val(arg)) => {
      st.state = frame.state;
      apply(st, func, arg)
    }
    (FrameKind::Restore, step @ (Step::Val(_) | Step::Str(_))) => {
      st.state = frame.state;
      Ok(step)
    }
    (FrameKind::Raise, Step::Val(val)) => match val {
      Val::Exn(_) => Ok(Step::Raise(val)),
      _ => Err(st.err(ErrorKind::RaiseNotExn)),
    },
    // nothing was raised, so the handler is not needed
    (FrameKind::Handle(_), Step::Val(val)) => {
      st.state = frame.state;
      Ok(Step::Val(val))
    }
    (FrameKind::Let(body), Step::DecDone) => {
      st.push_restore(frame.state)?;
      Ok(Step::Exp(body))
    }
    (FrameKind::DecSeq(decs, idx), Step::DecDone) => dec::seq(st, decs, idx),
    (FrameKind::ValBind(decs, idx, mut vals), Step::Val(val)) => {
      st.state = frame.state;
      vals.push(val);
      dec::val_bind_next(st, decs, idx, vals)
    }
    (FrameKind::LocalFst(snd), Step::DecDone) => {
      let fst = st.state.clone();
      st.state = fst.nested();
      st.push_with(frame.state, FrameKind::LocalSnd(fst))?;
      dec::start(st, &snd)
    }
    (FrameKind::LocalSnd(fst), Step::DecDone) => {
      dec::finish_local(st, &frame.state, &fst);
      Ok(Step::DecDone)
    }
    (FrameKind::StrBind(decs, idx, envs), Step::Str(env)) => {
      st.state = frame.state;
      top_dec::str_bind_next(st, decs, idx, envs, Some(env))
    }
    (FrameKind::Struct(id), Step::DecDone) => {
      let env = st.state.dynamic_env_since(id);
      st.state = frame.state;
      Ok(Step::Str(env))
    }
    (FrameKind::Ascription(sig), Step::Str(env)) => Ok(Step::Str(env.filter(&sig))),
    (FrameKind::FunctorArg(functor), Step::Str(env)) => {
      st.state = frame.state;
      top_dec::functor_body(st, &functor, env)
    }
    (FrameKind::StrLet(body), Step::DecDone) => {
      st.push_restore(frame.state)?;
      Ok(Step::StrExp(body))
    }
    (kind, step) => unreachable!("bad frame {kind:?} for {step:?}"),
  }
}

/// Unwinds by one frame with the raised exception.
fn raise(st: &mut St<'_>, frame: Frame, val: Val) -> Step {
  match frame.kind {
    FrameKind::Handle(matcher) => {
      st.state = frame.state;
      // if the handler does not catch it, keep unwinding
      arms(st, &matcher, &val).unwrap_or(Step::Raise(val))
    }
    _ => Step::Raise(val),
  }
}

fn apply(st: &mut St<'_>, func: Val, arg: Val) -> Result<Step> {
  match func {
    Val::Closure(clos) => {
      let caller = st.state.clone();
      st.push_restore(caller)?;
      let call = clos.state.nested();
      for (name, body) in clos.rec.iter() {
        let f =
          Closure { state: clos.state.clone(), rec: Rc::clone(&clos.rec), body: Rc::clone(body) };
        call.set_dynamic_val(name.clone(), Val::Closure(Rc::new(f)), IdStatus::Val);
      }
      st.state = call;
      Ok(arms(st, &clos.body, &arg).unwrap_or_else(|| Step::Raise(Val::exn("Match", 0))))
    }
    Val::ConFn(name, id) => Ok(Step::Val(Val::Con(Con { name, id, arg: Some(Box::new(arg)) }))),
    Val::ExnFn(name, id) => Ok(Step::Val(Val::Exn(Con { name, id, arg: Some(Box::new(arg)) }))),
    Val::Builtin(b) => builtin::apply(st, b, arg),
    _ => Err(st.err(ErrorKind::NotFunction)),
  }
}

/// Tries the arms in order. For the first that matches, sets up a scope with its bindings and
/// returns the step to evaluate its body.
pub(crate) fn arms(st: &mut St<'_>, matcher: &sml_hir::Match, val: &Val) -> Option<Step> {
  for arm in &matcher.arms {
    if let Some(binds) = pat_match::get(&st.state, &arm.pat, val) {
      let scope = st.state.nested();
      for (name, val) in binds {
        scope.set_dynamic_val(name, val, IdStatus::Val);
      }
      st.state = scope;
      return Some(Step::Exp(Rc::clone(&arm.exp)));
    }
  }
  None
}

/// Returns the value at the path.
///
/// A dotted path that does not resolve through structures may still name a flat value, as made
/// by `fun A.b x = ...` with long function names allowed.
pub(crate) fn get_val(st: &St<'_>, path: &Path) -> Result<(Val, IdStatus)> {
  let found = if path.is_one() {
    st.state.dynamic_val(path.last.as_str())
  } else {
    let got = st.state.with_dynamic_str(&path.prefix, |env| env.val_env.get(&path.last).cloned());
    got.ok().flatten()
  };
  found
    .or_else(|| if path.is_one() { None } else { st.state.dynamic_val(&path.to_string()) })
    .ok_or_else(|| st.err(ErrorKind::Undefined(Item::Val, path.to_string())))
}
