//! The dynamic semantics, aka, running a program.
//!
//! This is a stack machine, so deep recursion in SML does not use deep recursion in Rust.
//!
//! Each top-level declaration runs in its own child of the state, so the bindings come out in
//! declaration order. Constructors and exceptions get generation ids from counters in the state
//! passed in, so two declarations of the same name make different values.

#![allow(clippy::too_many_lines)]

mod builtin;
mod dec;
mod error;
mod pat_match;
mod step;
mod top_dec;
mod types;

pub use error::{Error, ErrorKind, Item};

use sml_hir::Decs;
use sml_state::{State, Val};
use std::rc::Rc;
use types::{St, Step};

/// Options for running.
#[derive(Debug, Clone, Copy)]
pub struct Options {
  /// The most stack frames there may be at once.
  pub max_frames: usize,
  /// Check that names like `true` are not re-bound. Usually static analysis does this.
  pub check_rebind: bool,
}

impl Default for Options {
  fn default() -> Self {
    Self { max_frames: 1_000_000, check_rebind: false }
  }
}

/// The result of running.
#[derive(Debug)]
pub struct Evaluated {
  /// The state after the declarations that ran to completion.
  pub state: State,
  /// The exception that escaped, if any. Declarations after the one that raised it did not run.
  pub raised: Option<Val>,
  /// How many of the top-level declarations ran to completion.
  pub completed: usize,
  /// What was printed, in order.
  pub output: Vec<String>,
}

/// Runs the declarations, starting from `state`.
///
/// # Errors
///
/// If something went wrong that is not an SML exception, like running out of frames.
pub fn get(decs: &Decs, state: &State, options: &Options) -> Result<Evaluated, Error> {
  elapsed::log("sml_dynamics::get", || {
    let mut st = St::new(options, state.clone());
    let mut raised = None::<Val>;
    let mut completed = 0usize;
    for idx in 0..decs.len() {
      let before = st.state.clone();
      match step::run(&mut st, Step::Dec(Rc::clone(decs), idx))? {
        Step::DecDone => completed = idx + 1,
        Step::Raise(val) => {
          st.state = before;
          raised = Some(val);
          break;
        }
        step => unreachable!("declaration finished with {step:?}"),
      }
    }
    if let Some(val) = &raised {
      log::debug!("uncaught exception: {}", sml_state::display_val(val));
    }
    Ok(Evaluated { state: st.state, raised, completed, output: st.output })
  })
}
