//! Dynamics types.

use crate::Options;
use crate::error::{Error, ErrorKind};
use sml_hir::{Decs, Lab};
use sml_state::{DynEnv, DynFunctor, DynSig, State, Val};
use std::collections::BTreeMap;
use std::rc::Rc;
use str_util::Name;

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub(crate) enum Step {
  Exp(Rc<sml_hir::Exp>),
  Val(Val),
  Raise(Val),
  /// The declaration at the index.
  Dec(Decs, usize),
  DecDone,
  StrExp(Rc<sml_hir::StrExp>),
  Str(DynEnv),
}

#[derive(Debug)]
pub(crate) struct Frame {
  /// The state when this was pushed.
  pub(crate) state: State,
  pub(crate) kind: FrameKind,
}

#[derive(Debug)]
pub(crate) enum FrameKind {
  /// The rows done so far, the label of the row being evaluated, and the rest of the rows in
  /// reverse.
  Record(BTreeMap<Lab, Val>, Lab, Vec<(Lab, Rc<sml_hir::Exp>)>),
  AppFunc(Rc<sml_hir::Exp>),
  AppArg(Val),
  /// Sets the state back once the inner value is ready, as for function calls and `let` bodies.
  Restore,
  Raise,
  Handle(Rc<sml_hir::Match>),
  Let(Rc<sml_hir::Exp>),
  /// Runs the declaration at the index next.
  DecSeq(Decs, usize),
  /// The values of the non-`rec` bindings of the `val` at the index, so far.
  ValBind(Decs, usize, Vec<Val>),
  /// The second part of a `local`.
  LocalFst(Decs),
  /// The last node of the first part of a `local` or `abstype`.
  LocalSnd(State),
  /// The values of the bindings of the `structure` at the index, so far.
  StrBind(Decs, usize, Vec<(Name, DynEnv)>),
  /// The id of the scope holding the body of a `struct`.
  Struct(u32),
  Ascription(DynSig),
  FunctorArg(Rc<DynFunctor>),
  StrLet(Rc<sml_hir::StrExp>),
}

#[derive(Debug)]
pub(crate) struct St<'a> {
  pub(crate) options: &'a Options,
  /// Where the generation counters live.
  pub(crate) top: State,
  pub(crate) state: State,
  pub(crate) frames: Vec<Frame>,
  pub(crate) output: Vec<String>,
  /// The position of what is being evaluated, for errors.
  pub(crate) pos: usize,
}

impl<'a> St<'a> {
  pub(crate) fn new(options: &'a Options, state: State) -> Self {
    St { options, top: state.clone(), state, frames: Vec::new(), output: Vec::new(), pos: 0 }
  }

  pub(crate) fn err(&self, kind: ErrorKind) -> Error {
    Error { pos: self.pos, kind }
  }

  pub(crate) fn push(&mut self, kind: FrameKind) -> Result<()> {
    let state = self.state.clone();
    self.push_with(state, kind)
  }

  pub(crate) fn push_with(&mut self, state: State, kind: FrameKind) -> Result<()> {
    if self.frames.len() >= self.options.max_frames {
      return Err(self.err(ErrorKind::TooManyFrames(self.options.max_frames)));
    }
    log::trace!("push frame {}", self.frames.len());
    self.frames.push(Frame { state, kind });
    Ok(())
  }

  /// Arranges for the state to be set to `state` once the next value is ready.
  ///
  /// If the top frame would already do that, this does nothing, so tail calls use no frames.
  pub(crate) fn push_restore(&mut self, state: State) -> Result<()> {
    if matches!(self.frames.last(), Some(Frame { kind: FrameKind::Restore, .. })) {
      return Ok(());
    }
    self.push_with(state, FrameKind::Restore)
  }

  /// Returns a new generation id for the constructor or exception name.
  pub(crate) fn fresh_id(&self, name: &Name) -> u32 {
    let ret = self.top.counter(name.as_str());
    self.top.set_counter(name.clone(), ret + 1);
    ret
  }
}
