//! See [`St`].

use crate::error::{Error, ErrorKind, Warning, WarningKind};
use crate::pat_match;
use crate::Options;
use sml_hir::MatchFlavor;
use sml_state::State;
use sml_statics_types::env::TyConInfo;
use sml_statics_types::subst::{Subst, UnifyCx, UnifyError};
use sml_statics_types::ty::{Equality, FixedVar, Ty, TyCon};
use str_util::Name;

/// The counter for type constructor generation ids. Not a valid SML identifier.
const TY_CON_COUNTER: &str = "%ty-con";

/// The mutable state.
#[derive(Debug)]
pub(crate) struct St<'a> {
  pub(crate) subst: Subst,
  pub(crate) options: &'a Options,
  /// the state everything is being elaborated into. all counters live here.
  pub(crate) top: State,
  warnings: Vec<Warning>,
  matches: Vec<Match>,
  fixed_id: u32,
  dummies: u32,
  /// how many functor bodies we are in.
  pub(crate) functor_depth: usize,
  /// how many functor applications we are in. their bodies were already checked when declared,
  /// so warnings are not reported again.
  pub(crate) replaying: usize,
}

impl<'a> St<'a> {
  pub(crate) fn new(options: &'a Options, top: State) -> Self {
    Self {
      subst: Subst::default(),
      options,
      top,
      warnings: Vec::new(),
      matches: Vec::new(),
      fixed_id: 0,
      dummies: 0,
      functor_depth: 0,
      replaying: 0,
    }
  }

  /// Unifies `want` and `got`, reporting errors at `pos`.
  pub(crate) fn unify(
    &mut self,
    state: &State,
    pos: usize,
    want: &Ty,
    got: &Ty,
  ) -> Result<(), Error> {
    let equality = |tc: &TyCon| state.ty_con_equality(tc);
    let cx = UnifyCx { equality: &equality, real_equality: self.options.real_equality };
    match self.subst.unify(&cx, want, got) {
      Ok(()) => Ok(()),
      Err(e) => Err(self.unify_error(pos, e)),
    }
  }

  /// Requires that `ty` admit equality.
  pub(crate) fn make_equality(&mut self, state: &State, pos: usize, ty: &Ty) -> Result<(), Error> {
    let equality = |tc: &TyCon| state.ty_con_equality(tc);
    let cx = UnifyCx { equality: &equality, real_equality: self.options.real_equality };
    match self.subst.make_equality(&cx, ty) {
      Ok(()) => Ok(()),
      Err(e) => Err(self.unify_error(pos, e)),
    }
  }

  fn unify_error(&self, pos: usize, e: UnifyError) -> Error {
    let kind = match e {
      UnifyError::Circularity(mv, ty) => {
        ErrorKind::Circularity(self.subst.display(&Ty::MetaVar(mv)), self.subst.display(&ty))
      }
      UnifyError::Mismatch(want, got) => {
        ErrorKind::IncompatibleTys(self.subst.display(&want), self.subst.display(&got))
      }
      UnifyError::NotEquality(ty) => ErrorKind::NotEquality(self.subst.display(&ty)),
      UnifyError::NotOverload(ov, ty) => ErrorKind::NotOverload(ov, self.subst.display(&ty)),
      UnifyError::MissingRow(lab, ty) => ErrorKind::MissingRow(lab, self.subst.display(&ty)),
    };
    Error { pos, kind }
  }

  /// Returns a fresh fixed type variable.
  pub(crate) fn fresh_fixed(&mut self, name: Name) -> FixedVar {
    self.fixed_id += 1;
    FixedVar { id: self.fixed_id, name }
  }

  /// Returns a type constructor with a new generation id.
  pub(crate) fn fresh_ty_con(&mut self, name: Name) -> TyCon {
    let id = self.top.counter(TY_CON_COUNTER) + 1;
    self.top.set_counter(Name::new(TY_CON_COUNTER), id);
    TyCon { name, id }
  }

  /// Returns a fresh dummy type for a meta variable left over at the top level, and registers it
  /// in `state`.
  pub(crate) fn fresh_dummy(&mut self, state: &State, equality: bool) -> TyCon {
    self.dummies += 1;
    let tc = self.fresh_ty_con(Name::new(format!("?.X{}", self.dummies)));
    let equality = if equality { Equality::Always } else { Equality::Never };
    state.set_ty_con_info(tc.clone(), TyConInfo { arity: 0, equality, cons: Vec::new() });
    tc
  }

  pub(crate) fn warn(&mut self, pos: usize, kind: WarningKind) {
    if self.replaying == 0 {
      self.warnings.push(Warning { pos, kind });
    }
  }

  /// Records a match to check for exhaustiveness and redundancy once types are known.
  pub(crate) fn insert_match(
    &mut self,
    state: &State,
    pos: usize,
    kind: MatchKind,
    pats: Vec<pat_match::Pat>,
    displays: Vec<String>,
  ) {
    if self.replaying == 0 {
      self.matches.push(Match { pos, kind, pats, displays, state: state.clone() });
    }
  }

  /// Checks the recorded matches and returns all the warnings, in order of position.
  pub(crate) fn finish(mut self) -> Vec<Warning> {
    for m in std::mem::take(&mut self.matches) {
      let pats: Vec<_> = m.pats.into_iter().map(|p| p.resolve(&self.subst)).collect();
      let ck = pat_match::Checker { state: &m.state };
      match m.kind {
        MatchKind::Bind => {
          if !ck.is_exhaustive(&pats) {
            self.warn(m.pos, WarningKind::NonExhaustiveBinding);
          }
        }
        MatchKind::Arms(flavor) => {
          if flavor == MatchFlavor::Derived {
            continue;
          }
          let res = ck.check_arms(&pats, &m.displays);
          if let Some(pat) = res.duplicate {
            self.warn(m.pos, WarningKind::DuplicateRule(pat));
          }
          if let Some(pat) = res.rules_after_unused {
            self.warn(m.pos, WarningKind::RulesAfterUnused(pat));
          }
          if !res.exhaustive && flavor != MatchFlavor::Handle {
            self.warn(m.pos, WarningKind::NonExhaustiveMatch);
          }
        }
      }
    }
    self.warnings.sort_by_key(|w| w.pos);
    self.warnings
  }
}

#[derive(Debug)]
struct Match {
  pos: usize,
  kind: MatchKind,
  pats: Vec<pat_match::Pat>,
  displays: Vec<String>,
  state: State,
}

/// What a match to check came from.
#[derive(Debug, Clone, Copy)]
pub(crate) enum MatchKind {
  /// A `val` binding.
  Bind,
  /// Some arms.
  Arms(MatchFlavor),
}
