//! What each call to interpret added to the state.

use crate::check::first_state;
use pretty_assertions::assert_eq;
use sml_interp::{Interpreted, Options, interpret};
use sml_state::{State, display_val};

#[track_caller]
fn go(s: &str, state: &State) -> Interpreted {
  match interpret(s, state, &Options::default()) {
    Ok(x) => x,
    Err(e) => panic!("{s}: {e}"),
  }
}

fn names(state: &State, since_id: u32) -> Vec<String> {
  let mut ret: Vec<_> =
    state.dynamic_changes(since_id).into_iter().map(|c| c.name.as_str().to_owned()).collect();
  ret.sort_unstable();
  ret
}

#[test]
fn only_new() {
  let s0 = first_state(&Options::default());
  let r1 = go("val a = 1 fun f x = x", &s0);
  assert_eq!(names(&r1.state, s0.id() + 1), ["a", "f"]);
  let r2 = go("val b = 2 val a = 3", &r1.state);
  assert_eq!(names(&r2.state, r1.state.id() + 1), ["a", "b"]);
  assert!(r2.state.dynamic_changes(r2.state.id() + 1).is_empty());
}

#[test]
fn shadowed_once() {
  let s0 = first_state(&Options::default());
  let r = go("val a = 1 val a = 2", &s0);
  let changes = r.state.dynamic_changes(s0.id() + 1);
  assert_eq!(changes.len(), 1);
  assert_eq!("2", display_val(&changes[0].val).to_string());
}

#[test]
fn with_types() {
  let s0 = first_state(&Options::default());
  let r = go("val a = 1 fun f x = x", &s0);
  let tys: Vec<_> = r
    .state
    .dynamic_changes(s0.id() + 1)
    .into_iter()
    .map(|c| (c.name.as_str().to_owned(), c.ty.map(|t| t.display().to_string())))
    .collect();
  assert!(tys.contains(&("a".to_owned(), Some("int".to_owned()))));
  assert!(tys.contains(&("f".to_owned(), Some("'a -> 'a".to_owned()))));
}

#[test]
fn local_not_included() {
  let s0 = first_state(&Options::default());
  let r = go("local val hidden = 1 in val shown = hidden end", &s0);
  assert_eq!(names(&r.state, s0.id() + 1), ["shown"]);
}

#[test]
fn raised_keeps_earlier() {
  let s0 = first_state(&Options::default());
  let r = go("val a = 1 val b = raise Div val c = 3", &s0);
  assert!(r.evaluation_errored);
  assert_eq!(names(&r.state, s0.id() + 1), ["a"]);
  assert!(r.state.static_val("a").is_some());
  assert!(r.state.static_val("c").is_none());
}

#[test]
fn raised_keeps_earlier_types() {
  let s0 = first_state(&Options::default());
  let r1 = go("val x = 1 val y = raise Div val x = \"s\" datatype t = T", &s0);
  assert!(r1.evaluation_errored);
  let Some(vi) = r1.state.static_val("x") else { panic!("x has no type") };
  assert_eq!("int", vi.ty_scheme.display().to_string());
  assert!(r1.state.static_val("T").is_none());
  assert!(!r1.state.static_changes(s0.id() + 1).ty_env.contains_key("t"));
  let r2 = go("val z = x + 1", &r1.state);
  assert!(!r2.evaluation_errored);
  let Some((val, _)) = r2.state.dynamic_val("z") else { panic!("z not bound") };
  assert_eq!("2", display_val(&val).to_string());
}

#[test]
fn statics() {
  let s0 = first_state(&Options::default());
  let r = go("datatype t = A | B val x = A", &s0);
  let env = r.state.static_changes(s0.id() + 1);
  assert!(env.ty_env.contains_key("t"));
  assert!(env.val_env.contains_key("A"));
  assert!(env.val_env.contains_key("x"));
  assert!(!env.val_env.contains_key("nil"));
}

#[test]
fn old_state_unchanged() {
  let s0 = first_state(&Options::default());
  let r1 = go("val a = 1", &s0);
  let r2 = go("val a = 2", &r1.state);
  let Some((val, _)) = r1.state.dynamic_val("a") else { panic!("a not bound") };
  assert_eq!("1", display_val(&val).to_string());
  let Some((val, _)) = r2.state.dynamic_val("a") else { panic!("a not bound") };
  assert_eq!("2", display_val(&val).to_string());
  assert!(s0.dynamic_val("a").is_none());
}
