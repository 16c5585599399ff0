//! Static analysis: type inference and checking, and match checking.
//!
//! Elaboration works in place on the [`State`] passed in, so on success that state holds the
//! static bindings of the declarations. Nested scopes, like those of `let` or `local`, are
//! nested states whose bindings are copied out as needed.
//!
//! With help from [this article][1].
//!
//! [1]: http://dev.stephendiehl.com/fun/006_hindley_milner.html

#![allow(clippy::too_many_lines, clippy::single_match_else)]

mod dec;
mod error;
mod exp;
mod pat;
mod pat_match;
mod st;
mod top_dec;
mod ty;
mod util;

pub use error::{Error, ErrorKind, Item, Warning, WarningKind};

use sml_state::State;

/// Options for elaboration.
#[derive(Debug, Clone, Copy)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
  /// Reject real constants in patterns.
  pub strict_mode: bool,
  /// Let `real` admit equality.
  pub real_equality: bool,
  /// Let a qualified name like `A.b` be found as a single flat name if there is no structure `A`.
  pub allow_long_function_names: bool,
}

impl Default for Options {
  fn default() -> Self {
    Self { strict_mode: true, real_equality: false, allow_long_function_names: false }
  }
}

/// Elaborates the declarations into `state`, returning the warnings.
///
/// # Errors
///
/// The first error found. On error, `state` may hold some of the bindings.
pub fn get(decs: &[sml_hir::Dec], state: &State, options: &Options) -> Result<Vec<Warning>, Error> {
  elapsed::log("sml_statics::get", || {
    let mut st = st::St::new(options, state.clone());
    dec::get_decs(&mut st, &util::Cx::default(), state, decs)?;
    let warnings = st.finish();
    log::debug!("{} warnings", warnings.len());
    Ok(warnings)
  })
}
