//! Utilities.

use diagnostic::{Code, Severity};
use sml_hir::{Exp, ExpKind, Lab, Match, MatchFlavor, Pat, PatKind, Path};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use str_util::Name;

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

/// The lowering context.
#[derive(Debug, Default)]
pub(crate) struct Cx {
  fresh: u32,
}

impl Cx {
  /// returns a name that cannot be written in source, so it shadows nothing the user wrote.
  pub(crate) fn fresh(&mut self, hint: &str) -> Name {
    self.fresh += 1;
    Name::new(format!("%{hint}{}", self.fresh))
  }
}

/// A kind of lowering error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
  /// A `fun` clause for a different function than the first clause.
  FunBindMismatchedName(Name, Name),
  /// A `fun` clause with a different number of patterns than the first clause.
  FunBindWrongNumPats(usize, usize),
  /// A label appeared twice in one record.
  DuplicateLab(Lab),
  /// `val rec` with something other than `fn` on the right.
  RecNotFn,
  /// A `fun` clause with no patterns.
  EmptyFun,
}

/// A lowering error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
  pub(crate) pos: usize,
  pub(crate) kind: ErrorKind,
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      ErrorKind::FunBindMismatchedName(want, got) => {
        write!(f, "expected a function clause for `{want}`, found one for `{got}`")
      }
      ErrorKind::FunBindWrongNumPats(want, got) => {
        let s = if *want == 1 { "" } else { "s" };
        write!(f, "expected {want} pattern{s}, found {got}")
      }
      ErrorKind::DuplicateLab(lab) => write!(f, "duplicate label: `{lab}`"),
      ErrorKind::RecNotFn => f.write_str("the expression for a `val rec` was not a `fn`"),
      ErrorKind::EmptyFun => f.write_str("`fun` requires at least 1 parameter"),
    }
  }
}

impl Error {
  /// Returns the byte offset for this.
  #[must_use]
  pub fn pos(&self) -> usize {
    self.pos
  }

  /// Returns the kind for this.
  #[must_use]
  pub fn kind(&self) -> &ErrorKind {
    &self.kind
  }

  /// Returns the code for this.
  #[must_use]
  pub fn code(&self) -> Code {
    match self.kind {
      ErrorKind::FunBindMismatchedName(..) => Code::n(4001),
      ErrorKind::FunBindWrongNumPats(..) => Code::n(4002),
      ErrorKind::DuplicateLab(_) => Code::n(4003),
      ErrorKind::RecNotFn => Code::n(4004),
      ErrorKind::EmptyFun => Code::n(4005),
    }
  }

  /// Returns the severity for this.
  #[must_use]
  pub fn severity(&self) -> Severity {
    Severity::Error
  }
}

/// collects the rows into a map, erroring on duplicate labels.
pub(crate) fn rows<T>(
  pos: usize,
  iter: impl IntoIterator<Item = (Lab, T)>,
) -> Result<BTreeMap<Lab, T>> {
  let mut ret = BTreeMap::new();
  for (lab, val) in iter {
    if ret.contains_key(&lab) {
      return Err(Error { pos, kind: ErrorKind::DuplicateLab(lab) });
    }
    ret.insert(lab, val);
  }
  Ok(ret)
}

pub(crate) fn tuple<T>(iter: impl IntoIterator<Item = T>) -> Vec<(Lab, T)> {
  iter.into_iter().enumerate().map(|(idx, x)| (Lab::tuple(idx), x)).collect()
}

pub(crate) fn name(s: &str) -> Name {
  Name::new(s)
}

// constructing HIR //

pub(crate) fn exp(pos: usize, kind: ExpKind) -> Rc<Exp> {
  Rc::new(Exp { pos, kind })
}

pub(crate) fn path_exp(pos: usize, s: &str) -> Rc<Exp> {
  exp(pos, ExpKind::Path(Path::one(name(s))))
}

pub(crate) fn name_exp(pos: usize, name: Name) -> Rc<Exp> {
  exp(pos, ExpKind::Path(Path::one(name)))
}

pub(crate) fn unit_exp(pos: usize) -> Rc<Exp> {
  exp(pos, ExpKind::Record(Vec::new()))
}

pub(crate) fn tuple_exp(pos: usize, exps: Vec<Rc<Exp>>) -> Rc<Exp> {
  exp(pos, ExpKind::Record(tuple(exps)))
}

pub(crate) fn app(pos: usize, func: Rc<Exp>, arg: Rc<Exp>) -> Rc<Exp> {
  exp(pos, ExpKind::App(func, arg))
}

pub(crate) fn fn_exp(pos: usize, arms: Vec<sml_hir::Arm>, flavor: MatchFlavor) -> Rc<Exp> {
  exp(pos, ExpKind::Fn(Rc::new(Match { pos, arms, flavor })))
}

/// `case head of arms`, as `(fn arms) head`.
pub(crate) fn case(
  pos: usize,
  head: Rc<Exp>,
  arms: Vec<sml_hir::Arm>,
  flavor: MatchFlavor,
) -> Rc<Exp> {
  app(pos, fn_exp(pos, arms, flavor), head)
}

pub(crate) fn if_exp(pos: usize, cond: Rc<Exp>, yes: Rc<Exp>, no: Rc<Exp>) -> Rc<Exp> {
  let arms = vec![
    sml_hir::Arm { pat: con_pat(pos, "true"), exp: yes },
    sml_hir::Arm { pat: con_pat(pos, "false"), exp: no },
  ];
  case(pos, cond, arms, MatchFlavor::Derived)
}

/// `case fst of _ => snd`.
pub(crate) fn seq(pos: usize, fst: Rc<Exp>, snd: Rc<Exp>) -> Rc<Exp> {
  let arms = vec![sml_hir::Arm { pat: Pat { pos, kind: PatKind::Wild }, exp: snd }];
  case(pos, fst, arms, MatchFlavor::Derived)
}

pub(crate) fn con_pat(pos: usize, s: &str) -> Pat {
  Pat { pos, kind: PatKind::Con(Path::one(name(s)), None) }
}

pub(crate) fn name_pat(pos: usize, name: Name) -> Pat {
  Pat { pos, kind: PatKind::Con(Path::one(name), None) }
}

pub(crate) fn tuple_pat(pos: usize, pats: Vec<Pat>) -> Pat {
  let rows = tuple(pats).into_iter().collect();
  Pat { pos, kind: PatKind::Record(rows, false) }
}
