//! Substitutions from meta variables to types, and the operations over them: unification,
//! generalization, and instantiation.
//!
//! Meta variables carry a rank, the depth of `let`-style nesting at which they were made. A meta
//! variable may be generalized at a binding iff its rank is greater than the rank outside of the
//! binding. Solving a meta variable with a type lowers the ranks of the variables in that type.

use crate::overload::{Basic, Overload};
use crate::ty::{Equality, FixedVar, MetaVar, RecordTy, Ty, TyCon, TyScheme};
use fast_hash::FxHashMap;
use sml_lab::Lab;

/// What is known about an unsolved meta variable.
#[derive(Debug, Default, Clone)]
pub struct Unsolved {
  /// The rank.
  pub rank: u32,
  /// Whether it may only be solved with an equality type.
  pub equality: bool,
  /// The types it may be solved with, if restricted.
  pub overload: Option<Overload>,
  /// The rows it must have, if it came from a `...` pattern or a selector.
  pub record: Option<RecordTy>,
}

#[derive(Debug, Clone)]
enum Entry {
  Solved(Ty),
  Unsolved(Unsolved),
}

/// A substitution.
#[derive(Debug, Default)]
pub struct Subst {
  entries: Vec<Entry>,
}

/// Context for unification.
pub struct UnifyCx<'a> {
  /// Whether a type constructor admits equality.
  pub equality: &'a dyn Fn(&TyCon) -> Equality,
  /// Whether `real` admits equality.
  pub real_equality: bool,
}

impl std::fmt::Debug for UnifyCx<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("UnifyCx").field("real_equality", &self.real_equality).finish_non_exhaustive()
  }
}

/// An error when unifying.
#[derive(Debug)]
pub enum UnifyError {
  /// A meta variable would occur in its own solution.
  Circularity(MetaVar, Ty),
  /// Two types have different shapes.
  Mismatch(Ty, Ty),
  /// A type needed to admit equality, but did not.
  NotEquality(Ty),
  /// A type was not one of an overload's members.
  NotOverload(Overload, Ty),
  /// A record was missing a row.
  MissingRow(Lab, Ty),
}

/// An error when generalizing.
#[derive(Debug)]
pub enum GeneralizeError {
  /// A record type from a `...` pattern or selector was never resolved to a concrete record.
  UnresolvedRecord(RecordTy),
}

impl Subst {
  /// Returns a fresh meta variable with no restrictions.
  pub fn fresh(&mut self, rank: u32) -> Ty {
    self.fresh_kind(Unsolved { rank, ..Unsolved::default() })
  }

  /// Returns a fresh meta variable with the given restrictions.
  pub fn fresh_kind(&mut self, kind: Unsolved) -> Ty {
    let mv = MetaVar(u32::try_from(self.entries.len()).unwrap_or(u32::MAX));
    self.entries.push(Entry::Unsolved(kind));
    Ty::MetaVar(mv)
  }

  /// Returns a fresh meta variable restricted to the overload.
  pub fn fresh_overload(&mut self, rank: u32, overload: Overload) -> Ty {
    self.fresh_kind(Unsolved { rank, overload: Some(overload), ..Unsolved::default() })
  }

  /// Returns the info for an unsolved meta variable, or `None` if it is solved.
  #[must_use]
  pub fn unsolved(&self, mv: MetaVar) -> Option<&Unsolved> {
    match self.entries.get(mv.0 as usize)? {
      Entry::Solved(_) => None,
      Entry::Unsolved(u) => Some(u),
    }
  }

  fn unsolved_mut(&mut self, mv: MetaVar) -> Option<&mut Unsolved> {
    match self.entries.get_mut(mv.0 as usize)? {
      Entry::Solved(_) => None,
      Entry::Unsolved(u) => Some(u),
    }
  }

  /// Solves `mv` with `ty` without any checks. Used for defaulting.
  pub fn set_solved(&mut self, mv: MetaVar, ty: Ty) {
    if let Some(entry) = self.entries.get_mut(mv.0 as usize) {
      *entry = Entry::Solved(ty);
    }
  }

  /// Resolves solved meta variables at the top of the type only.
  #[must_use]
  pub fn shallow(&self, ty: &Ty) -> Ty {
    let mut ty = ty;
    while let Ty::MetaVar(mv) = ty {
      match self.entries.get(mv.0 as usize) {
        Some(Entry::Solved(t)) => ty = t,
        Some(Entry::Unsolved(_)) | None => break,
      }
    }
    ty.clone()
  }

  /// Resolves all solved meta variables in the type.
  #[must_use]
  pub fn apply(&self, ty: &Ty) -> Ty {
    match self.shallow(ty) {
      ty @ (Ty::BoundVar(_) | Ty::MetaVar(_) | Ty::FixedVar(_)) => ty,
      Ty::Record(rows) => {
        Ty::Record(rows.iter().map(|(lab, ty)| (lab.clone(), self.apply(ty))).collect())
      }
      Ty::Con(args, tc) => Ty::Con(args.iter().map(|ty| self.apply(ty)).collect(), tc),
      Ty::Fn(param, res) => Ty::fun(self.apply(&param), self.apply(&res)),
    }
  }

  /// Resolves all solved meta variables in the scheme.
  #[must_use]
  pub fn apply_scheme(&self, scheme: &TyScheme) -> TyScheme {
    TyScheme { bound: scheme.bound.clone(), overload: scheme.overload, ty: self.apply(&scheme.ty) }
  }

  /// Unifies `want` and `got`.
  ///
  /// # Errors
  ///
  /// If they could not be unified. The substitution may be partially updated.
  pub fn unify(&mut self, cx: &UnifyCx<'_>, want: &Ty, got: &Ty) -> Result<(), UnifyError> {
    let want = self.shallow(want);
    let got = self.shallow(got);
    match (&want, &got) {
      (Ty::MetaVar(a), Ty::MetaVar(b)) if a == b => Ok(()),
      (Ty::MetaVar(mv), other) | (other, Ty::MetaVar(mv)) => self.solve(cx, *mv, other.clone()),
      (Ty::FixedVar(a), Ty::FixedVar(b)) if a == b => Ok(()),
      (Ty::BoundVar(a), Ty::BoundVar(b)) if a == b => Ok(()),
      (Ty::Record(want_rows), Ty::Record(got_rows)) => {
        if want_rows.len() != got_rows.len() || want_rows.keys().ne(got_rows.keys()) {
          return Err(UnifyError::Mismatch(want.clone(), got.clone()));
        }
        for (want, got) in want_rows.values().zip(got_rows.values()) {
          self.unify(cx, want, got)?;
        }
        Ok(())
      }
      (Ty::Con(want_args, want_tc), Ty::Con(got_args, got_tc)) => {
        if want_tc != got_tc || want_args.len() != got_args.len() {
          return Err(UnifyError::Mismatch(want.clone(), got.clone()));
        }
        for (want, got) in want_args.iter().zip(got_args) {
          self.unify(cx, want, got)?;
        }
        Ok(())
      }
      (Ty::Fn(want_param, want_res), Ty::Fn(got_param, got_res)) => {
        self.unify(cx, want_param, got_param)?;
        self.unify(cx, want_res, got_res)
      }
      _ => Err(UnifyError::Mismatch(want.clone(), got.clone())),
    }
  }

  /// solves the unsolved `mv` with `ty`, which is shallowly resolved and not `mv`.
  fn solve(&mut self, cx: &UnifyCx<'_>, mv: MetaVar, ty: Ty) -> Result<(), UnifyError> {
    let Some(u) = self.unsolved(mv).cloned() else {
      unreachable!("solve a solved meta var")
    };
    if let Ty::MetaVar(other) = ty {
      return self.merge(cx, mv, u, other);
    }
    if self.occurs(mv, &ty) {
      cov_mark::hit("circularity");
      return Err(UnifyError::Circularity(mv, ty));
    }
    self.lower_ranks(&ty, u.rank);
    self.set_solved(mv, ty.clone());
    if u.equality {
      self.make_equality(cx, &ty)?;
    }
    if let Some(ov) = u.overload {
      let is_member = match &ty {
        Ty::Con(args, tc) if args.is_empty() => {
          Basic::from_ty_con(tc).is_some_and(|b| ov.contains(b))
        }
        _ => false,
      };
      if !is_member {
        return Err(UnifyError::NotOverload(ov, ty));
      }
    }
    if let Some(rows) = u.record {
      let Ty::Record(got_rows) = &ty else {
        return Err(UnifyError::Mismatch(Ty::Record(rows), ty));
      };
      for (lab, want) in &rows {
        match got_rows.get(lab) {
          Some(got) => self.unify(cx, want, got)?,
          None => return Err(UnifyError::MissingRow(lab.clone(), ty.clone())),
        }
      }
    }
    Ok(())
  }

  /// merges the knowledge about unsolved `mv` into unsolved `other`, then solves `mv` with `other`.
  fn merge(
    &mut self,
    cx: &UnifyCx<'_>,
    mv: MetaVar,
    u: Unsolved,
    other: MetaVar,
  ) -> Result<(), UnifyError> {
    let Some(o) = self.unsolved(other).cloned() else {
      unreachable!("merge with a solved meta var")
    };
    let equality = u.equality || o.equality;
    let mut overload = match (u.overload, o.overload) {
      (Some(a), Some(b)) => match a.intersect(b) {
        Some(x) => Some(x),
        None => return Err(UnifyError::Mismatch(Ty::MetaVar(mv), Ty::MetaVar(other))),
      },
      (a, b) => a.or(b),
    };
    if equality {
      if let Some(ov) = overload {
        match ov.equality(cx.real_equality) {
          Some(x) => overload = Some(x),
          None => return Err(UnifyError::NotEquality(Ty::MetaVar(mv))),
        }
      }
    }
    let mut common = Vec::<(Ty, Ty)>::new();
    let record = match (u.record, o.record) {
      (Some(mut a), Some(b)) => {
        for (lab, ty) in b {
          match a.get(&lab) {
            Some(t) => common.push((t.clone(), ty)),
            None => {
              a.insert(lab, ty);
            }
          }
        }
        Some(a)
      }
      (a, b) => a.or(b),
    };
    if record.is_some() && overload.is_some() {
      return Err(UnifyError::Mismatch(Ty::MetaVar(mv), Ty::MetaVar(other)));
    }
    let rank = u.rank.min(o.rank);
    let record_tys: Vec<Ty> = match (&record, equality) {
      (Some(rows), true) => rows.values().cloned().collect(),
      _ => Vec::new(),
    };
    if let Some(entry) = self.unsolved_mut(other) {
      *entry = Unsolved { rank, equality, overload, record };
    }
    self.set_solved(mv, Ty::MetaVar(other));
    for (a, b) in common {
      self.unify(cx, &a, &b)?;
    }
    for ty in record_tys {
      self.make_equality(cx, &ty)?;
    }
    Ok(())
  }

  /// Requires that `ty` admit equality.
  ///
  /// # Errors
  ///
  /// If it cannot.
  pub fn make_equality(&mut self, cx: &UnifyCx<'_>, ty: &Ty) -> Result<(), UnifyError> {
    match self.shallow(ty) {
      Ty::BoundVar(_) => Ok(()),
      Ty::MetaVar(mv) => {
        let Some(u) = self.unsolved_mut(mv) else { return Ok(()) };
        u.equality = true;
        if let Some(ov) = u.overload {
          match ov.equality(cx.real_equality) {
            Some(x) => u.overload = Some(x),
            None => return Err(UnifyError::NotEquality(Ty::MetaVar(mv))),
          }
        }
        let rows: Vec<Ty> = u.record.iter().flat_map(|rows| rows.values().cloned()).collect();
        for ty in rows {
          self.make_equality(cx, &ty)?;
        }
        Ok(())
      }
      Ty::FixedVar(fv) => {
        if fv.is_equality() {
          Ok(())
        } else {
          Err(UnifyError::NotEquality(Ty::FixedVar(fv)))
        }
      }
      Ty::Record(rows) => {
        for ty in rows.values() {
          self.make_equality(cx, ty)?;
        }
        Ok(())
      }
      Ty::Con(args, tc) => match (cx.equality)(&tc) {
        Equality::Always => Ok(()),
        Equality::Never => Err(UnifyError::NotEquality(Ty::Con(args, tc))),
        Equality::IfArgs => {
          for ty in &args {
            self.make_equality(cx, ty)?;
          }
          Ok(())
        }
      },
      ty @ Ty::Fn(..) => Err(UnifyError::NotEquality(ty)),
    }
  }

  fn occurs(&self, mv: MetaVar, ty: &Ty) -> bool {
    match self.shallow(ty) {
      Ty::MetaVar(other) => {
        mv == other
          || self
            .unsolved(other)
            .and_then(|u| u.record.as_ref())
            .is_some_and(|rows| rows.values().any(|ty| self.occurs(mv, ty)))
      }
      Ty::BoundVar(_) | Ty::FixedVar(_) => false,
      Ty::Record(rows) => rows.values().any(|ty| self.occurs(mv, ty)),
      Ty::Con(args, _) => args.iter().any(|ty| self.occurs(mv, ty)),
      Ty::Fn(param, res) => self.occurs(mv, &param) || self.occurs(mv, &res),
    }
  }

  /// Lowers the rank of every unsolved meta variable in `ty` to at most `rank`.
  pub fn lower_ranks(&mut self, ty: &Ty, rank: u32) {
    for mv in self.meta_vars(ty) {
      if let Some(u) = self.unsolved_mut(mv) {
        u.rank = u.rank.min(rank);
      }
    }
  }

  /// Returns the unsolved meta variables in `ty`, in order of first appearance.
  #[must_use]
  pub fn meta_vars(&self, ty: &Ty) -> Vec<MetaVar> {
    let mut ret = Vec::new();
    self.meta_vars_(ty, &mut ret);
    ret
  }

  fn meta_vars_(&self, ty: &Ty, ac: &mut Vec<MetaVar>) {
    match self.shallow(ty) {
      Ty::MetaVar(mv) => {
        if !ac.contains(&mv) {
          ac.push(mv);
          if let Some(rows) = self.unsolved(mv).and_then(|u| u.record.as_ref()) {
            for ty in rows.values() {
              self.meta_vars_(ty, ac);
            }
          }
        }
      }
      Ty::BoundVar(_) | Ty::FixedVar(_) => {}
      Ty::Record(rows) => {
        for ty in rows.values() {
          self.meta_vars_(ty, ac);
        }
      }
      Ty::Con(args, _) => {
        for ty in &args {
          self.meta_vars_(ty, ac);
        }
      }
      Ty::Fn(param, res) => {
        self.meta_vars_(&param, ac);
        self.meta_vars_(&res, ac);
      }
    }
  }

  /// Solves every overloaded meta variable in `ty` with its default type.
  pub fn default_overloads(&mut self, ty: &Ty) {
    for mv in self.meta_vars(ty) {
      if let Some(ov) = self.unsolved(mv).and_then(|u| u.overload) {
        cov_mark::hit("default_overload");
        self.set_solved(mv, ov.default().ty_con().into_ty());
      }
    }
  }

  /// Generalizes `ty` into a scheme, binding the meta variables with rank greater than `rank`
  /// and the given fixed variables. Overloaded meta variables that would be bound are defaulted
  /// instead.
  ///
  /// # Errors
  ///
  /// If a record meta variable would be bound.
  pub fn generalize(
    &mut self,
    ty: &Ty,
    rank: u32,
    fixed: &[FixedVar],
  ) -> Result<TyScheme, GeneralizeError> {
    for mv in self.meta_vars(ty) {
      let Some(u) = self.unsolved(mv) else { continue };
      if u.rank <= rank {
        continue;
      }
      if let Some(ov) = u.overload {
        cov_mark::hit("default_overload");
        self.set_solved(mv, ov.default().ty_con().into_ty());
      } else if let Some(rows) = &u.record {
        return Err(GeneralizeError::UnresolvedRecord(rows.clone()));
      }
    }
    let ty = self.apply(ty);
    let mut g = Generalizer {
      subst: self,
      rank,
      fixed,
      bound: Vec::new(),
      metas: FxHashMap::default(),
      fixed_idx: FxHashMap::default(),
    };
    let ty = g.go(&ty);
    Ok(TyScheme { bound: g.bound, overload: None, ty })
  }

  /// Instantiates the scheme with fresh meta variables.
  pub fn instantiate(&mut self, scheme: &TyScheme, rank: u32) -> Ty {
    let args: Vec<_> = scheme
      .bound
      .iter()
      .map(|&equality| {
        self.fresh_kind(Unsolved { rank, equality, overload: scheme.overload, record: None })
      })
      .collect();
    scheme.ty.apply_bv(&args)
  }
}

impl TyCon {
  /// Returns the nullary type of this.
  #[must_use]
  pub fn into_ty(self) -> Ty {
    Ty::Con(Vec::new(), self)
  }
}

struct Generalizer<'a> {
  subst: &'a Subst,
  rank: u32,
  fixed: &'a [FixedVar],
  bound: Vec<bool>,
  metas: FxHashMap<MetaVar, usize>,
  fixed_idx: FxHashMap<FixedVar, usize>,
}

impl Generalizer<'_> {
  fn go(&mut self, ty: &Ty) -> Ty {
    match ty {
      Ty::BoundVar(_) => ty.clone(),
      Ty::MetaVar(mv) => match self.subst.unsolved(*mv) {
        Some(u) if u.rank > self.rank => {
          if let Some(&idx) = self.metas.get(mv) {
            return Ty::BoundVar(idx);
          }
          let idx = self.bound.len();
          self.bound.push(u.equality);
          self.metas.insert(*mv, idx);
          Ty::BoundVar(idx)
        }
        _ => ty.clone(),
      },
      Ty::FixedVar(fv) => {
        if !self.fixed.contains(fv) {
          return ty.clone();
        }
        if let Some(&idx) = self.fixed_idx.get(fv) {
          return Ty::BoundVar(idx);
        }
        let idx = self.bound.len();
        self.bound.push(fv.is_equality());
        self.fixed_idx.insert(fv.clone(), idx);
        Ty::BoundVar(idx)
      }
      Ty::Record(rows) => {
        Ty::Record(rows.iter().map(|(lab, ty)| (lab.clone(), self.go(ty))).collect())
      }
      Ty::Con(args, tc) => Ty::Con(args.iter().map(|ty| self.go(ty)).collect(), tc.clone()),
      Ty::Fn(param, res) => Ty::fun(self.go(param), self.go(res)),
    }
  }
}
