//! Types for static analysis: types themselves, substitutions over meta variables, type schemes,
//! and the environments that map names to them.

pub mod env;
pub mod overload;
pub mod subst;
pub mod ty;

mod display;

pub use display::TyDisplay;
