//! Displaying types.

use crate::overload::Overload;
use crate::subst::Subst;
use crate::ty::{MetaVar, Ty, TyScheme};
use fast_hash::FxHashMap;
use fmt_util::{comma_seq, sep_seq};
use sml_lab::Lab;
use std::fmt;

/// A type ready for display. Type variables are named `'a`, `'b`, ... in order of first
/// appearance, with `''` for equality variables.
#[derive(Debug)]
pub struct TyDisplay {
  ty: Ty,
  bound: Vec<bool>,
  overload: Option<Overload>,
  metas: FxHashMap<MetaVar, MetaInfo>,
}

#[derive(Debug, Clone, Copy)]
struct MetaInfo {
  equality: bool,
  overload: Option<Overload>,
}

impl Ty {
  /// Returns a value that displays this.
  #[must_use]
  pub fn display(&self) -> TyDisplay {
    TyDisplay { ty: self.clone(), bound: Vec::new(), overload: None, metas: FxHashMap::default() }
  }
}

impl TyScheme {
  /// Returns a value that displays this.
  #[must_use]
  pub fn display(&self) -> TyDisplay {
    TyDisplay {
      ty: self.ty.clone(),
      bound: self.bound.clone(),
      overload: self.overload,
      metas: FxHashMap::default(),
    }
  }
}

impl Subst {
  /// Returns a value that displays `ty` after applying this.
  #[must_use]
  pub fn display(&self, ty: &Ty) -> TyDisplay {
    let ty = self.apply(ty);
    let metas = self
      .meta_vars(&ty)
      .into_iter()
      .filter_map(|mv| {
        let u = self.unsolved(mv)?;
        Some((mv, MetaInfo { equality: u.equality, overload: u.overload }))
      })
      .collect();
    TyDisplay { ty, bound: Vec::new(), overload: None, metas }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Var {
  Bound(usize),
  Meta(MetaVar),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
  Arrow,
  Star,
  App,
}

struct Cx<'a> {
  this: &'a TyDisplay,
  order: Vec<Var>,
}

impl fmt::Display for TyDisplay {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut order = Vec::new();
    vars(&self.ty, &mut order);
    let cx = Cx { this: self, order };
    cx.ty(f, &self.ty, Prec::Arrow)
  }
}

fn vars(ty: &Ty, ac: &mut Vec<Var>) {
  let var = match ty {
    Ty::BoundVar(idx) => Var::Bound(*idx),
    Ty::MetaVar(mv) => Var::Meta(*mv),
    Ty::FixedVar(_) => return,
    Ty::Record(rows) => {
      for ty in rows.values() {
        vars(ty, ac);
      }
      return;
    }
    Ty::Con(args, _) => {
      for ty in args {
        vars(ty, ac);
      }
      return;
    }
    Ty::Fn(param, res) => {
      vars(param, ac);
      vars(res, ac);
      return;
    }
  };
  if !ac.contains(&var) {
    ac.push(var);
  }
}

impl Cx<'_> {
  fn var(&self, f: &mut fmt::Formatter<'_>, var: Var) -> fmt::Result {
    let equality = match var {
      Var::Bound(idx) => {
        if let Some(ov) = self.this.overload {
          return write!(f, "{ov}");
        }
        self.this.bound.get(idx).copied().unwrap_or(false)
      }
      Var::Meta(mv) => match self.this.metas.get(&mv) {
        Some(MetaInfo { overload: Some(ov), .. }) => return write!(f, "{ov}"),
        Some(info) => info.equality,
        None => false,
      },
    };
    let idx = self.order.iter().position(|&v| v == var).unwrap_or(0);
    f.write_str(if equality { "''" } else { "'" })?;
    let rem = u8::try_from(idx % 26).unwrap_or(0);
    for _ in 0..=idx / 26 {
      write!(f, "{}", char::from(b'a' + rem))?;
    }
    Ok(())
  }

  fn ty(&self, f: &mut fmt::Formatter<'_>, ty: &Ty, prec: Prec) -> fmt::Result {
    match ty {
      Ty::BoundVar(idx) => self.var(f, Var::Bound(*idx)),
      Ty::MetaVar(mv) => self.var(f, Var::Meta(*mv)),
      Ty::FixedVar(fv) => f.write_str(fv.name.as_str()),
      Ty::Record(rows) => {
        if rows.is_empty() {
          return f.write_str("unit");
        }
        if Lab::is_tuple(rows.keys()) {
          if prec > Prec::Star {
            f.write_str("(")?;
          }
          sep_seq(f, " * ", rows.values().map(|ty| Sub { cx: self, ty, prec: Prec::App }))?;
          if prec > Prec::Star {
            f.write_str(")")?;
          }
          return Ok(());
        }
        f.write_str("{ ")?;
        comma_seq(f, rows.iter().map(|(lab, ty)| Row { cx: self, lab, ty }))?;
        f.write_str(" }")
      }
      Ty::Con(args, tc) => {
        match args.as_slice() {
          [] => {}
          [arg] => {
            self.ty(f, arg, Prec::App)?;
            f.write_str(" ")?;
          }
          args => {
            f.write_str("(")?;
            comma_seq(f, args.iter().map(|ty| Sub { cx: self, ty, prec: Prec::Arrow }))?;
            f.write_str(") ")?;
          }
        }
        f.write_str(tc.name.as_str())
      }
      Ty::Fn(param, res) => {
        if prec > Prec::Arrow {
          f.write_str("(")?;
        }
        self.ty(f, param, Prec::Star)?;
        f.write_str(" -> ")?;
        self.ty(f, res, Prec::Arrow)?;
        if prec > Prec::Arrow {
          f.write_str(")")?;
        }
        Ok(())
      }
    }
  }
}

struct Sub<'a> {
  cx: &'a Cx<'a>,
  ty: &'a Ty,
  prec: Prec,
}

impl fmt::Display for Sub<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.cx.ty(f, self.ty, self.prec)
  }
}

struct Row<'a> {
  cx: &'a Cx<'a>,
  lab: &'a Lab,
  ty: &'a Ty,
}

impl fmt::Display for Row<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} : ", self.lab)?;
    self.cx.ty(f, self.ty, Prec::Arrow)
  }
}
