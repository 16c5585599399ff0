//! The program state: a chain of scopes, each holding static and dynamic bindings.
//!
//! Lookups walk up the parent links and return the first entry found. Each REPL submission
//! extends a fresh child of the state it started from, so older states are never changed and a
//! caller may keep any of them around to continue from later.
//!
//! Ids are non-decreasing from parent to child. [`State::nested`] starts a new scope with a
//! greater id, and [`State::child`] adds a node to the same scope with the same id.

mod env;
mod val;

pub use env::{DynEnv, DynFunctor, DynSig, StaticFunctor};
pub use val::{Builtin, Closure, Con, Val, ValDisplay, display_val};

use fast_hash::{FxHashMap, FxHashSet};
use sml_fixity::{Fixity, Infix};
use sml_statics_types::env::{Env, IdStatus, Sig, TyConEnv, TyConInfo, TyInfo, ValInfo};
use sml_statics_types::ty::{Equality, TyCon, TyScheme};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use str_util::Name;

/// A node in the state chain. Cheap to clone.
#[derive(Clone)]
pub struct State(Rc<Node>);

struct Node {
  id: u32,
  parent: RefCell<Option<State>>,
  scope: RefCell<Scope>,
}

#[derive(Default)]
struct Scope {
  fixities: FxHashMap<Name, Fixity>,
  rebind: FxHashMap<Name, Rebind>,
  counters: FxHashMap<Name, u32>,
  env: Env,
  sigs: FxHashMap<Name, Sig>,
  static_functors: FxHashMap<Name, Rc<StaticFunctor>>,
  ty_cons: TyConEnv,
  dyn_env: DynEnv,
  dyn_sigs: FxHashMap<Name, DynSig>,
  dyn_functors: FxHashMap<Name, Rc<DynFunctor>>,
}

impl fmt::Debug for State {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("State")
      .field("id", &self.id())
      .field("parent", &self.parent().map(|p| p.id()))
      .finish_non_exhaustive()
  }
}

/// Whether a name may be bound again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebind {
  /// Never, like `true` or `nil`.
  Never,
  /// Only as a value variable, not as a constructor or exception, like `it`.
  Half,
  /// Freely.
  Allowed,
}

/// An attempt to write to a state with an id that is not an ancestor's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingState(pub u32);

impl fmt::Display for MissingState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "no state with id {} in the chain", self.0)
  }
}

/// A value bound since some state, with its type.
#[derive(Debug, Clone)]
pub struct DynamicChange {
  /// The name.
  pub name: Name,
  /// The value.
  pub val: Val,
  /// The identifier status.
  pub id_status: IdStatus,
  /// The type, if elaboration ran.
  pub ty: Option<TyScheme>,
}

impl Default for State {
  fn default() -> Self {
    Self::new()
  }
}

impl State {
  /// Returns a new root state with id 0 and nothing in it.
  #[must_use]
  pub fn new() -> Self {
    State(Rc::new(Node { id: 0, parent: RefCell::new(None), scope: RefCell::default() }))
  }

  fn with_id(&self, id: u32) -> Self {
    let node =
      Node { id, parent: RefCell::new(Some(self.clone())), scope: RefCell::default() };
    State(Rc::new(node))
  }

  /// Returns the id.
  #[must_use]
  pub fn id(&self) -> u32 {
    self.0.id
  }

  /// Returns the parent.
  #[must_use]
  pub fn parent(&self) -> Option<State> {
    self.0.parent.borrow().clone()
  }

  /// Returns a new child starting a new scope, with an id one greater than this.
  #[must_use]
  pub fn nested(&self) -> Self {
    self.with_id(self.id() + 1)
  }

  /// Returns a new child in the same scope, with the same id as this.
  #[must_use]
  pub fn child(&self) -> Self {
    self.with_id(self.id())
  }

  /// Makes `parent` the parent of this.
  ///
  /// # Panics
  ///
  /// If `parent` does not have a smaller id than this, which could make a cycle.
  pub fn reparent(&self, parent: &State) {
    assert!(
      parent.id() < self.id(),
      "cannot re-parent state {} onto state {}",
      self.id(),
      parent.id()
    );
    log::debug!("re-parent state {} onto {}", self.id(), parent.id());
    *self.0.parent.borrow_mut() = Some(parent.clone());
  }

  /// calls `f` on each scope up the chain until it returns `Some`, not entering ancestors with id
  /// less than `id_limit`.
  fn find<T, F>(&self, id_limit: u32, mut f: F) -> Option<T>
  where
    F: FnMut(&Scope) -> Option<T>,
  {
    let mut cur = self.clone();
    loop {
      if let Some(x) = f(&cur.0.scope.borrow()) {
        return Some(x);
      }
      let parent = cur.parent()?;
      if parent.id() < id_limit {
        return None;
      }
      cur = parent;
    }
  }

  fn update<T, F>(&self, f: F) -> T
  where
    F: FnOnce(&mut Scope) -> T,
  {
    f(&mut self.0.scope.borrow_mut())
  }

  fn update_at<T, F>(&self, at_id: u32, f: F) -> Result<T, MissingState>
  where
    F: FnOnce(&mut Scope) -> T,
  {
    let mut cur = self.clone();
    loop {
      if cur.id() == at_id {
        return Ok(cur.update(f));
      }
      if cur.id() < at_id {
        return Err(MissingState(at_id));
      }
      cur = cur.parent().ok_or(MissingState(at_id))?;
    }
  }

  /// returns the nodes with id at least `since_id`, newest first.
  fn nodes_since(&self, since_id: u32) -> Vec<State> {
    let mut ret = Vec::new();
    let mut cur = Some(self.clone());
    while let Some(s) = cur {
      if s.id() < since_id {
        break;
      }
      cur = s.parent();
      ret.push(s);
    }
    ret
  }

  // fixity //

  /// Returns the infix status of the name, if it is infix.
  #[must_use]
  pub fn infix(&self, name: &str) -> Option<Infix> {
    self.find(0, |s| s.fixities.get(name).copied()).and_then(Fixity::infix)
  }

  /// Sets the fixity of the name.
  pub fn set_fixity(&self, name: Name, fixity: Fixity) {
    self.update(|s| s.fixities.insert(name, fixity));
  }

  // rebind //

  /// Returns whether the name may be bound again.
  #[must_use]
  pub fn rebind(&self, name: &str) -> Rebind {
    self.find(0, |s| s.rebind.get(name).copied()).unwrap_or(Rebind::Allowed)
  }

  /// Sets whether the name may be bound again.
  pub fn set_rebind(&self, name: Name, rebind: Rebind) {
    self.update(|s| s.rebind.insert(name, rebind));
  }

  // counters //

  /// Returns the next unused generation id for the name.
  #[must_use]
  pub fn counter(&self, name: &str) -> u32 {
    self.find(0, |s| s.counters.get(name).copied()).unwrap_or(0)
  }

  /// Sets the next unused generation id for the name.
  pub fn set_counter(&self, name: Name, n: u32) {
    self.update(|s| s.counters.insert(name, n));
  }

  /// Sets the next unused generation id for the name in the nearest ancestor with the id.
  ///
  /// # Errors
  ///
  /// If there is no such ancestor.
  pub fn set_counter_at(&self, name: Name, n: u32, at_id: u32) -> Result<(), MissingState> {
    self.update_at(at_id, |s| {
      s.counters.insert(name, n);
    })
  }

  // statics //

  /// Returns info for the value.
  #[must_use]
  pub fn static_val(&self, name: &str) -> Option<ValInfo> {
    self.static_val_limited(name, 0)
  }

  /// Returns info for the value, not looking into ancestors with id less than `id_limit`.
  #[must_use]
  pub fn static_val_limited(&self, name: &str, id_limit: u32) -> Option<ValInfo> {
    self.find(id_limit, |s| s.env.val_env.get(name).cloned())
  }

  /// Returns info for the type.
  #[must_use]
  pub fn static_ty(&self, name: &str) -> Option<TyInfo> {
    self.find(0, |s| s.env.ty_env.get(name).cloned())
  }

  /// Calls `f` with the static env of the structure at the non-empty path.
  ///
  /// # Errors
  ///
  /// Returns the first name not found.
  pub fn with_static_str<T, F>(&self, path: &[Name], f: F) -> Result<T, Name>
  where
    F: FnOnce(&Env) -> T,
  {
    let Some((first, rest)) = path.split_first() else {
      unreachable!("empty structure path")
    };
    let mut f = Some(f);
    let res = self.find(0, |s| {
      let env = s.env.str_env.get(first)?;
      Some(match env.get_str(rest) {
        Ok(env) => Ok(f.take().map(|f| f(env))),
        Err(name) => Err(name.clone()),
      })
    });
    match res {
      None => Err(first.clone()),
      Some(Err(name)) => Err(name),
      Some(Ok(x)) => x.ok_or_else(|| first.clone()),
    }
  }

  /// Returns the signature.
  #[must_use]
  pub fn sig(&self, name: &str) -> Option<Sig> {
    self.find(0, |s| s.sigs.get(name).cloned())
  }

  /// Returns the functor.
  #[must_use]
  pub fn static_functor(&self, name: &str) -> Option<Rc<StaticFunctor>> {
    self.find(0, |s| s.static_functors.get(name).cloned())
  }

  /// Returns info for the type constructor.
  #[must_use]
  pub fn ty_con_info(&self, tc: &TyCon) -> Option<TyConInfo> {
    self.find(0, |s| s.ty_cons.get(tc).cloned())
  }

  /// Returns whether the type constructor admits equality.
  #[must_use]
  pub fn ty_con_equality(&self, tc: &TyCon) -> Equality {
    self.find(0, |s| s.ty_cons.get(tc).map(|x| x.equality)).unwrap_or(Equality::Never)
  }

  /// Sets info for the value.
  pub fn set_static_val(&self, name: Name, val_info: ValInfo) {
    self.update(|s| s.env.val_env.insert(name, val_info));
  }

  /// Sets info for the type.
  pub fn set_static_ty(&self, name: Name, ty_info: TyInfo) {
    self.update(|s| s.env.ty_env.insert(name, ty_info));
  }

  /// Sets the static env of the structure.
  pub fn set_static_str(&self, name: Name, env: Env) {
    self.update(|s| s.env.str_env.insert(name, env));
  }

  /// Sets the signature.
  pub fn set_sig(&self, name: Name, sig: Sig) {
    self.update(|s| s.sigs.insert(name, sig));
  }

  /// Sets the functor.
  pub fn set_static_functor(&self, name: Name, functor: Rc<StaticFunctor>) {
    self.update(|s| s.static_functors.insert(name, functor));
  }

  /// Sets info for the type constructor.
  pub fn set_ty_con_info(&self, tc: TyCon, info: TyConInfo) {
    self.update(|s| s.ty_cons.insert(tc, info));
  }

  /// Adds everything in the env to this node.
  pub fn extend_static(&self, env: Env) {
    self.update(|s| s.env.extend(env));
  }

  /// Adds all the type constructor info to this node.
  pub fn extend_ty_cons(&self, ty_cons: TyConEnv) {
    self.update(|s| s.ty_cons.extend(ty_cons));
  }

  /// Returns the static bindings made in nodes with id at least `since_id`.
  #[must_use]
  pub fn static_env_since(&self, since_id: u32) -> Env {
    let mut ret = Env::default();
    for s in self.nodes_since(since_id).into_iter().rev() {
      ret.extend(s.0.scope.borrow().env.clone());
    }
    ret
  }

  /// Returns the type constructor info added in nodes with id at least `since_id`.
  #[must_use]
  pub fn ty_cons_since(&self, since_id: u32) -> TyConEnv {
    let mut ret = TyConEnv::default();
    for s in self.nodes_since(since_id) {
      for (tc, info) in &s.0.scope.borrow().ty_cons {
        ret.entry(tc.clone()).or_insert_with(|| info.clone());
      }
    }
    ret
  }

  // dynamics //

  /// Returns the value and its status.
  #[must_use]
  pub fn dynamic_val(&self, name: &str) -> Option<(Val, IdStatus)> {
    self.find(0, |s| s.dyn_env.val_env.get(name).cloned())
  }

  /// Returns the constructor names of the type.
  #[must_use]
  pub fn dynamic_ty(&self, name: &str) -> Option<Vec<Name>> {
    self.find(0, |s| s.dyn_env.ty_env.get(name).cloned())
  }

  /// Calls `f` with the dynamic env of the structure at the non-empty path.
  ///
  /// # Errors
  ///
  /// Returns the first name not found.
  pub fn with_dynamic_str<T, F>(&self, path: &[Name], f: F) -> Result<T, Name>
  where
    F: FnOnce(&DynEnv) -> T,
  {
    let Some((first, rest)) = path.split_first() else {
      unreachable!("empty structure path")
    };
    let mut f = Some(f);
    let res = self.find(0, |s| {
      let env = s.dyn_env.str_env.get(first)?;
      Some(match env.get_str(rest) {
        Ok(env) => Ok(f.take().map(|f| f(env))),
        Err(name) => Err(name.clone()),
      })
    });
    match res {
      None => Err(first.clone()),
      Some(Err(name)) => Err(name),
      Some(Ok(x)) => x.ok_or_else(|| first.clone()),
    }
  }

  /// Returns the signature.
  #[must_use]
  pub fn dyn_sig(&self, name: &str) -> Option<DynSig> {
    self.find(0, |s| s.dyn_sigs.get(name).cloned())
  }

  /// Returns the functor.
  #[must_use]
  pub fn dyn_functor(&self, name: &str) -> Option<Rc<DynFunctor>> {
    self.find(0, |s| s.dyn_functors.get(name).cloned())
  }

  /// Sets the value.
  pub fn set_dynamic_val(&self, name: Name, val: Val, id_status: IdStatus) {
    self.update(|s| s.dyn_env.val_env.insert(name, (val, id_status)));
  }

  /// Sets the constructor names of the type.
  pub fn set_dynamic_ty(&self, name: Name, cons: Vec<Name>) {
    self.update(|s| s.dyn_env.ty_env.insert(name, cons));
  }

  /// Sets the dynamic env of the structure.
  pub fn set_dynamic_str(&self, name: Name, env: DynEnv) {
    self.update(|s| s.dyn_env.str_env.insert(name, env));
  }

  /// Sets the signature.
  pub fn set_dyn_sig(&self, name: Name, sig: DynSig) {
    self.update(|s| s.dyn_sigs.insert(name, sig));
  }

  /// Sets the functor.
  pub fn set_dyn_functor(&self, name: Name, functor: Rc<DynFunctor>) {
    self.update(|s| s.dyn_functors.insert(name, functor));
  }

  /// Adds everything in the env to this node.
  pub fn extend_dynamic(&self, env: DynEnv) {
    self.update(|s| s.dyn_env.extend(env));
  }

  /// Returns the dynamic bindings made in nodes with id at least `since_id`.
  #[must_use]
  pub fn dynamic_env_since(&self, since_id: u32) -> DynEnv {
    let mut ret = DynEnv::default();
    for s in self.nodes_since(since_id).into_iter().rev() {
      ret.extend(s.0.scope.borrow().dyn_env.clone());
    }
    ret
  }

  /// Copies into this node everything bound in the nodes of `other` with id at least `since_id`,
  /// except the counters.
  ///
  /// Used to splice the bindings of a scope into an enclosing one, as for the body of `local`.
  pub fn absorb(&self, other: &State, since_id: u32) {
    for s in other.nodes_since(since_id).into_iter().rev() {
      if Rc::ptr_eq(&s.0, &self.0) {
        continue;
      }
      let scope = s.0.scope.borrow();
      self.update(|this| {
        this.fixities.extend(scope.fixities.iter().map(|(k, &v)| (k.clone(), v)));
        this.rebind.extend(scope.rebind.iter().map(|(k, &v)| (k.clone(), v)));
        this.env.extend(scope.env.clone());
        this.sigs.extend(scope.sigs.iter().map(|(k, v)| (k.clone(), v.clone())));
        let functors = scope.static_functors.iter().map(|(k, v)| (k.clone(), v.clone()));
        this.static_functors.extend(functors);
        this.ty_cons.extend(scope.ty_cons.iter().map(|(k, v)| (k.clone(), v.clone())));
        this.dyn_env.extend(scope.dyn_env.clone());
        this.dyn_sigs.extend(scope.dyn_sigs.iter().map(|(k, v)| (k.clone(), v.clone())));
        this.dyn_functors.extend(scope.dyn_functors.iter().map(|(k, v)| (k.clone(), v.clone())));
      });
    }
  }

  // reconciling and diffing //

  /// Copies the static info from `statics`, the result of elaborating what this is the result of
  /// evaluating, onto this. Only static info for things that were bound in this at or after
  /// `since_id` is copied, so that if evaluation stopped early, the two agree.
  pub fn reconcile(&self, statics: &State, since_id: u32) {
    let dynamic = self.dynamic_env_since(since_id);
    let mut env = statics.static_env_since(since_id);
    env.val_env.retain(|name, _| dynamic.val_env.contains_key(name));
    env.str_env.retain(|name, _| dynamic.str_env.contains_key(name));
    let ty_cons = statics.ty_cons_since(since_id);
    let mut sigs = FxHashMap::<Name, Sig>::default();
    let mut functors = FxHashMap::<Name, Rc<StaticFunctor>>::default();
    let mut counters = FxHashMap::<Name, u32>::default();
    for s in statics.nodes_since(since_id).into_iter().rev() {
      let scope = s.0.scope.borrow();
      sigs.extend(scope.sigs.iter().map(|(k, v)| (k.clone(), v.clone())));
      functors.extend(scope.static_functors.iter().map(|(k, v)| (k.clone(), v.clone())));
      counters.extend(scope.counters.iter().map(|(k, &v)| (k.clone(), v)));
    }
    let counters: Vec<_> =
      counters.into_iter().map(|(name, n)| (n.max(self.counter(name.as_str())), name)).collect();
    self.update(|s| {
      s.env.extend(env);
      s.ty_cons.extend(ty_cons);
      s.sigs.extend(sigs);
      s.static_functors.extend(functors);
      for (n, name) in counters {
        s.counters.insert(name, n);
      }
    });
  }

  /// Returns the values bound at or after `since_id` that are still visible, oldest first, paired
  /// with their types.
  #[must_use]
  pub fn dynamic_changes(&self, since_id: u32) -> Vec<DynamicChange> {
    let mut seen = FxHashSet::<Name>::default();
    let mut ret = Vec::<DynamicChange>::new();
    for s in self.nodes_since(since_id) {
      let scope = s.0.scope.borrow();
      let mut names: Vec<_> = scope.dyn_env.val_env.keys().collect();
      names.sort_unstable_by(|a, b| b.cmp(a));
      for name in names {
        if !seen.insert(name.clone()) {
          continue;
        }
        let Some((val, id_status)) = scope.dyn_env.val_env.get(name) else { continue };
        let ty = self.static_val(name.as_str()).map(|vi| vi.ty_scheme);
        ret.push(DynamicChange {
          name: name.clone(),
          val: val.clone(),
          id_status: *id_status,
          ty,
        });
      }
    }
    ret.reverse();
    ret
  }

  /// Returns the static bindings made at or after `since_id`.
  #[must_use]
  pub fn static_changes(&self, since_id: u32) -> Env {
    self.static_env_since(since_id)
  }
}
