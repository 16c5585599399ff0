//! Matching a value against a pattern.

use sml_hir::{Path, PatKind, SCon};
use sml_state::{Builtin, State, Val};
use sml_statics_types::env::IdStatus;
use str_util::Name;

/// Returns the bindings if `val` matches `pat`.
pub(crate) fn get(state: &State, pat: &sml_hir::Pat, val: &Val) -> Option<Vec<(Name, Val)>> {
  let mut ac = Vec::new();
  go(state, &mut ac, pat, val).then_some(ac)
}

fn go(state: &State, ac: &mut Vec<(Name, Val)>, pat: &sml_hir::Pat, val: &Val) -> bool {
  match &pat.kind {
    PatKind::Wild => true,
    PatKind::SCon(scon) => match (scon, val) {
      (SCon::Int(a), Val::Int(b)) => a == b,
      (SCon::Word(a), Val::Word(b)) => a == b,
      #[allow(clippy::float_cmp)]
      (SCon::Real(a), Val::Real(b)) => a == b,
      (SCon::Char(a), Val::Char(b)) => a == b,
      (SCon::String(a), Val::String(b)) => a == b,
      _ => false,
    },
    PatKind::Con(path, None) => match con(state, path) {
      Some(c) => same_nullary(&c, val),
      None => {
        if path.is_one() {
          ac.push((path.last.clone(), val.clone()));
          true
        } else {
          false
        }
      }
    },
    PatKind::Con(path, Some(arg)) => match (con(state, path), val) {
      (Some(Val::ConFn(name, id)), Val::Con(c)) | (Some(Val::ExnFn(name, id)), Val::Exn(c)) => {
        c.name == name && c.id == id && c.arg.as_ref().is_some_and(|v| go(state, ac, arg, v))
      }
      (Some(Val::Builtin(Builtin::Ref)), Val::Ref(cell)) => {
        let inner = cell.borrow().clone();
        go(state, ac, arg, &inner)
      }
      _ => false,
    },
    PatKind::Record(rows, rest) => {
      let Val::Record(vals) = val else { return false };
      if !rest && rows.len() != vals.len() {
        return false;
      }
      rows.iter().all(|(lab, pat)| vals.get(lab).is_some_and(|v| go(state, ac, pat, v)))
    }
    PatKind::Typed(inner, _) => go(state, ac, inner, val),
    PatKind::As(name, inner) => {
      ac.push((name.clone(), val.clone()));
      go(state, ac, inner, val)
    }
  }
}

/// Returns the constructor the path refers to, if it refers to one.
fn con(state: &State, path: &Path) -> Option<Val> {
  let found = if path.is_one() {
    state.dynamic_val(path.last.as_str())
  } else {
    state.with_dynamic_str(&path.prefix, |env| env.val_env.get(&path.last).cloned()).ok().flatten()
  };
  match found {
    Some((val, IdStatus::Con | IdStatus::Exn)) => Some(val),
    Some((_, IdStatus::Val)) | None => None,
  }
}

fn same_nullary(con: &Val, val: &Val) -> bool {
  match (con, val) {
    (Val::Bool(a), Val::Bool(b)) => a == b,
    (Val::Con(a), Val::Con(b)) | (Val::Exn(a), Val::Exn(b)) => a.same_con(b) && b.arg.is_none(),
    _ => false,
  }
}
