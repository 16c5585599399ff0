//! Lowering the surface syntax tree into HIR, removing derived forms.
//!
//! | surface | lowered |
//! |---|---|
//! | `a andalso b` | `if a then b else false` |
//! | `a orelse b` | `if a then true else b` |
//! | `if c then t else e` | `case c of true => t \| false => e` |
//! | `case e of m` | `(fn m) e` |
//! | `(e1, ..., en)` | `{1 = e1, ..., n = en}` |
//! | `[e1, ..., en]` | `e1 :: ... :: en :: nil` |
//! | `(e1; ...; en)` | `case e1 of _ => ... en` |
//! | `while c do b` | `let val rec w = fn () => if c then (b; w ()) else () in w () end` |
//! | `#lab` | `fn {lab = x, ...} => x` |
//! | `fun` | `val rec` of curried `fn`s around a `case` |
//! | `do e` | `val () = e` |

mod dec;
mod exp;
mod pat;
mod ty;
mod util;

pub use util::{Error, ErrorKind};

/// Lowers the declarations.
///
/// # Errors
///
/// On the first construct that is syntactically valid but cannot be lowered, like `fun` clauses
/// that disagree on the name.
pub fn get(decs: &[sml_syntax::TopDec]) -> Result<sml_hir::Decs, Error> {
  let mut cx = util::Cx::default();
  dec::get_decs(&mut cx, decs)
}
