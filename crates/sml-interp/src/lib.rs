//! Interpreting SML source text, from start to finish.
//!
//! Each call takes a state and returns a new one that extends it. The old state is never changed,
//! so on error the caller may simply keep using it.
//!
//! The stages are:
//!
//! 1. lex, with [`sml_lex`]
//! 2. parse, with [`sml_parse`], which resolves infix operators using the fixities in the state
//! 3. lower, with [`sml_hir_lower`], which removes derived forms
//! 4. elaborate, with [`sml_statics`]
//! 5. evaluate, with [`sml_dynamics`]
//!
//! Elaboration and evaluation each extend their own new child of the old state. Afterwards the
//! static info is copied onto the evaluated state, but only for what evaluation actually bound.
//! If an exception escaped, that static info comes from elaborating again only the declarations
//! that ran to completion.

mod config;
mod error;
mod initial;
mod modules;

pub use config::{ConfigError, Options};
pub use error::{Error, ErrorKind};
pub use initial::{builtin_ty, initial_state};
pub use modules::{available_modules, first_state};

use sml_state::{State, Val};
use std::fmt;

/// A warning. Warnings never stop interpreting.
#[derive(Debug, Clone)]
pub enum Warning {
  /// From static analysis, like a non-exhaustive match.
  Statics(sml_statics::Warning),
  /// Text that was printed.
  Output(String),
}

impl fmt::Display for Warning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Warning::Statics(w) => w.fmt(f),
      Warning::Output(s) => f.write_str(s),
    }
  }
}

/// The result of interpreting.
#[derive(Debug)]
pub struct Interpreted {
  /// The new state.
  pub state: State,
  /// Whether an exception escaped.
  pub evaluation_errored: bool,
  /// The exception that escaped, if any.
  pub error: Option<Val>,
  /// Warnings from static analysis, then printed output, each in order.
  pub warnings: Vec<Warning>,
}

/// Interprets the source, starting from the state.
///
/// An SML exception that escapes is not an error. It is reported in the result, whose state has
/// the bindings from before it was raised.
///
/// # Errors
///
/// If the source could not be lexed, parsed, or elaborated, or evaluating it failed in a way that
/// is not an SML exception.
pub fn interpret(source: &str, state: &State, options: &Options) -> Result<Interpreted, Error> {
  elapsed::log("sml_interp::interpret", || {
    let tokens = elapsed::log("sml_lex::get", || sml_lex::get(source, &options.lex()))?;
    let mut cx = sml_parse::ParserContext { state: state.nested(), options: options.parse() };
    let top_decs = elapsed::log("sml_parse::get", || sml_parse::get(&tokens, &mut cx))?;
    let decs = elapsed::log("sml_hir_lower::get", || sml_hir_lower::get(&top_decs))?;
    let mut warnings = Vec::<Warning>::new();
    let statics = state.nested();
    if !options.disable_elaboration {
      let ws = sml_statics::get(&decs, &statics, &options.statics())?;
      warnings.extend(ws.into_iter().map(Warning::Statics));
    }
    if options.disable_evaluation {
      // with neither, only the fixities from parsing are left.
      let state = if options.disable_elaboration { cx.state } else { statics };
      return Ok(Interpreted { state, evaluation_errored: false, error: None, warnings });
    }
    let top = state.nested();
    let evaluated = sml_dynamics::get(&decs, &top, &options.dynamics())?;
    if !options.disable_elaboration {
      if evaluated.completed == decs.len() {
        evaluated.state.reconcile(&statics, top.id());
      } else {
        // the later declarations may have shadowed names, so only the ones that ran count.
        let prefix = state.nested();
        sml_statics::get(&decs[..evaluated.completed], &prefix, &options.statics())?;
        evaluated.state.reconcile(&prefix, top.id());
      }
    }
    warnings.extend(evaluated.output.into_iter().map(Warning::Output));
    Ok(Interpreted {
      state: evaluated.state,
      evaluation_errored: evaluated.raised.is_some(),
      error: evaluated.raised,
      warnings,
    })
  })
}
