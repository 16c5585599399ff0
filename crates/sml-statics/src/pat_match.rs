//! Checking matches for exhaustiveness and redundancy.
//!
//! This is the usefulness algorithm from [Warnings for pattern matching][1]: a pattern vector is
//! useful with respect to some rows if some value matches it but none of the rows. A match is
//! exhaustive iff the wildcard is not useful with respect to its arms.
//!
//! [1]: http://moscova.inria.fr/~maranget/papers/warn/index.html

use sml_lab::Lab;
use sml_state::State;
use sml_statics_types::subst::Subst;
use sml_statics_types::ty::{Ty, TyCon};
use std::collections::BTreeMap;
use str_util::Name;

/// A pattern as elaborated. The record types may not be known until the end of elaboration.
#[derive(Debug, Clone)]
pub(crate) enum Pat {
  Any,
  Con(Con, Vec<Pat>),
  Record(BTreeMap<Lab, Pat>, Ty),
}

/// A pattern ready for checking.
#[derive(Debug, Clone)]
pub(crate) enum Resolved {
  Any,
  Con(Con, Vec<Resolved>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Con {
  /// the only constructor of a record type with these labels.
  Record(Vec<Lab>),
  /// a datatype constructor.
  Named(Name, TyCon),
  /// an exception constructor. there are infinitely many of these.
  Exn(Name),
  /// a special constant, written out. also infinitely many of these.
  SCon(String),
}

impl Pat {
  pub(crate) fn resolve(self, subst: &Subst) -> Resolved {
    match self {
      Pat::Any => Resolved::Any,
      Pat::Con(con, args) => {
        Resolved::Con(con, args.into_iter().map(|p| p.resolve(subst)).collect())
      }
      Pat::Record(mut rows, ty) => {
        let mut labs: Vec<Lab> = match subst.apply(&ty) {
          Ty::Record(ty_rows) => ty_rows.into_keys().collect(),
          Ty::MetaVar(mv) => subst
            .unsolved(mv)
            .and_then(|u| u.record.as_ref())
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default(),
          _ => Vec::new(),
        };
        for lab in rows.keys() {
          if !labs.contains(lab) {
            labs.push(lab.clone());
          }
        }
        labs.sort_unstable();
        let args =
          labs.iter().map(|lab| rows.remove(lab).map_or(Resolved::Any, |p| p.resolve(subst)));
        let args: Vec<_> = args.collect();
        Resolved::Con(Con::Record(labs), args)
      }
    }
  }
}

/// The results of checking arms.
#[derive(Debug)]
pub(crate) struct Arms {
  pub(crate) exhaustive: bool,
  /// the first arm that, with the ones before it, covers every value, if there are arms after it.
  pub(crate) rules_after_unused: Option<String>,
  /// the first arm written the same as an earlier one.
  pub(crate) duplicate: Option<String>,
}

#[derive(Debug)]
pub(crate) struct Checker<'a> {
  pub(crate) state: &'a State,
}

type Row = Vec<Resolved>;

impl Checker<'_> {
  pub(crate) fn is_exhaustive(&self, pats: &[Resolved]) -> bool {
    let rows: Vec<Row> = pats.iter().map(|p| vec![p.clone()]).collect();
    !self.useful(&rows, &[Resolved::Any])
  }

  pub(crate) fn check_arms(&self, pats: &[Resolved], displays: &[String]) -> Arms {
    let mut duplicate = None::<String>;
    for (idx, d) in displays.iter().enumerate() {
      if displays[..idx].contains(d) {
        duplicate = Some(d.clone());
        break;
      }
    }
    let mut rules_after_unused = None::<String>;
    for idx in 0..pats.len().saturating_sub(1) {
      if self.is_exhaustive(&pats[..=idx]) {
        rules_after_unused = displays.get(idx).cloned();
        break;
      }
    }
    let exhaustive = rules_after_unused.is_some() || self.is_exhaustive(pats);
    Arms { exhaustive, rules_after_unused, duplicate }
  }

  /// returns all the constructors of the type of `con` with their arities, or `None` if there are
  /// too many to list.
  fn span(&self, con: &Con) -> Option<Vec<(Con, usize)>> {
    match con {
      Con::Record(labs) => Some(vec![(con.clone(), labs.len())]),
      Con::Named(_, tc) => {
        let info = self.state.ty_con_info(tc)?;
        if info.cons.is_empty() {
          return None;
        }
        let ret = info
          .cons
          .iter()
          .map(|c| (Con::Named(c.name.clone(), tc.clone()), usize::from(c.arg.is_some())))
          .collect();
        Some(ret)
      }
      Con::Exn(_) | Con::SCon(_) => None,
    }
  }

  fn useful(&self, rows: &[Row], v: &[Resolved]) -> bool {
    let Some((head, rest)) = v.split_first() else { return rows.is_empty() };
    match head {
      Resolved::Con(con, args) => {
        let rows = specialize(rows, con, args.len());
        let mut v = args.clone();
        v.extend_from_slice(rest);
        self.useful(&rows, &v)
      }
      Resolved::Any => {
        let mut heads = Vec::<(&Con, usize)>::new();
        for row in rows {
          if let Some(Resolved::Con(con, args)) = row.first() {
            if !heads.iter().any(|&(c, _)| c == con) {
              heads.push((con, args.len()));
            }
          }
        }
        let span = heads.first().and_then(|&(con, _)| self.span(con));
        match span {
          Some(all) if all.iter().all(|(c, _)| heads.iter().any(|&(h, _)| h == c)) => {
            all.iter().any(|(con, arity)| {
              let rows = specialize(rows, con, *arity);
              let mut v = vec![Resolved::Any; *arity];
              v.extend_from_slice(rest);
              self.useful(&rows, &v)
            })
          }
          _ => {
            let rows: Vec<Row> = rows
              .iter()
              .filter_map(|row| match row.split_first() {
                Some((Resolved::Any, rest)) => Some(rest.to_vec()),
                _ => None,
              })
              .collect();
            self.useful(&rows, rest)
          }
        }
      }
    }
  }
}

/// keeps the rows that could match `con`, replacing their heads with the arguments.
fn specialize(rows: &[Row], con: &Con, arity: usize) -> Vec<Row> {
  rows
    .iter()
    .filter_map(|row| {
      let (head, rest) = row.split_first()?;
      let mut ret = match head {
        Resolved::Any => vec![Resolved::Any; arity],
        Resolved::Con(c, args) => {
          if c != con {
            return None;
          }
          args.clone()
        }
      };
      ret.extend_from_slice(rest);
      Some(ret)
    })
    .collect()
}
