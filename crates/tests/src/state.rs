//! The state chain itself.

use pretty_assertions::assert_eq;
use sml_fixity::{Fixity, Infix};
use sml_state::{MissingState, Rebind, State, Val, display_val};
use sml_statics_types::env::IdStatus;
use str_util::Name;

#[test]
fn ids() {
  let root = State::new();
  assert_eq!(root.id(), 0);
  assert!(root.parent().is_none());
  let a = root.nested();
  assert_eq!(a.id(), 1);
  let b = a.child();
  assert_eq!(b.id(), 1);
  assert_eq!(b.parent().map(|p| p.id()), Some(1));
  assert_eq!(b.nested().id(), 2);
}

#[test]
fn lookup_walks_up() {
  let root = State::new();
  root.set_dynamic_val(Name::new("x"), Val::Int(1), IdStatus::Val);
  let a = root.nested();
  a.set_dynamic_val(Name::new("y"), Val::Int(2), IdStatus::Val);
  let b = a.child();
  b.set_dynamic_val(Name::new("x"), Val::Int(3), IdStatus::Val);
  let get = |s: &State, name: &str| s.dynamic_val(name).map(|(v, _)| display_val(&v).to_string());
  assert_eq!(get(&b, "x").as_deref(), Some("3"));
  assert_eq!(get(&b, "y").as_deref(), Some("2"));
  assert_eq!(get(&a, "x").as_deref(), Some("1"));
  assert_eq!(get(&root, "y"), None);
}

#[test]
fn set_counter_at() {
  let root = State::new();
  let a = root.nested();
  let b = a.nested();
  assert_eq!(b.set_counter_at(Name::new("E"), 5, a.id()), Ok(()));
  assert_eq!(b.counter("E"), 5);
  assert_eq!(a.counter("E"), 5);
  assert_eq!(root.counter("E"), 0);
  assert_eq!(b.set_counter_at(Name::new("E"), 1, 7), Err(MissingState(7)));
}

#[test]
fn fixity_and_rebind() {
  let root = State::new();
  root.set_fixity(Name::new("+"), Fixity::Infix(Infix::left(6)));
  let a = root.nested();
  assert_eq!(a.infix("+"), Some(Infix::left(6)));
  a.set_fixity(Name::new("+"), Fixity::Nonfix);
  assert_eq!(a.infix("+"), None);
  assert_eq!(root.infix("+"), Some(Infix::left(6)));
  root.set_rebind(Name::new("nil"), Rebind::Never);
  assert_eq!(a.rebind("nil"), Rebind::Never);
  assert_eq!(a.rebind("x"), Rebind::Allowed);
}

#[test]
fn absorb_and_reparent() {
  let outer = State::new().nested();
  outer.set_dynamic_val(Name::new("a"), Val::Int(1), IdStatus::Val);
  let fst = outer.nested();
  fst.set_dynamic_val(Name::new("hidden"), Val::Int(2), IdStatus::Val);
  let snd = fst.nested();
  snd.set_dynamic_val(Name::new("shown"), Val::Int(3), IdStatus::Val);
  let snd_more = snd.child();
  snd_more.set_dynamic_val(Name::new("also"), Val::Int(4), IdStatus::Val);
  let done = snd.nested();
  done.absorb(&snd_more, snd.id());
  done.reparent(&outer);
  assert!(done.dynamic_val("shown").is_some());
  assert!(done.dynamic_val("also").is_some());
  assert!(done.dynamic_val("a").is_some());
  assert!(done.dynamic_val("hidden").is_none());
}

#[test]
#[should_panic(expected = "cannot re-parent")]
fn reparent_cycle() {
  let root = State::new();
  let a = root.nested();
  root.reparent(&a);
}

#[test]
fn dynamic_env_since() {
  let root = State::new();
  root.set_dynamic_val(Name::new("old"), Val::Int(1), IdStatus::Val);
  let a = root.nested();
  a.set_dynamic_val(Name::new("new"), Val::Int(2), IdStatus::Val);
  let env = a.child().dynamic_env_since(a.id());
  assert!(env.val_env.contains_key("new"));
  assert!(!env.val_env.contains_key("old"));
}
