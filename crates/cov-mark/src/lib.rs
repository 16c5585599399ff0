//! Coverage markers, for asserting in tests that a particular code path was taken.

use fast_hash::FxHashSet;
use std::cell::RefCell;

thread_local! {
  static HIT: RefCell<FxHashSet<&'static str>> = RefCell::new(FxHashSet::default());
}

/// Records that the named marker was hit.
///
/// No-ops when `debug_assertions` is off.
pub fn hit(name: &'static str) {
  if cfg!(debug_assertions) {
    HIT.with(|hit| hit.borrow_mut().insert(name));
  }
}

/// Asserts the named marker was previously hit on this thread.
///
/// No-ops when `debug_assertions` is off.
///
/// # Panics
///
/// If the marker was not hit.
pub fn check(name: &'static str) {
  if cfg!(debug_assertions) {
    HIT.with(|hit| assert!(hit.borrow().contains(name), "{name} not hit"));
  }
}
