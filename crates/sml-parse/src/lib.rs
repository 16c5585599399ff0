//! Parsing tokens into a syntax tree, resolving infix applications as we go.
//!
//! Fixity declarations take effect on the state in the [`ParserContext`] as soon as they are
//! parsed, so the rest of the input is parsed with them in force.

mod dec;
mod exp;
mod parser;
mod pat;
mod top_dec;
mod ty;
mod util;

pub use parser::{Error, ErrorKind, Expected};

use sml_lex::Token;
use sml_state::State;
use sml_syntax::{Dec, DecKind, Pat, PatKind, Path, TopDec, ValBind};
use str_util::Name;

/// Options for parsing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Options {
  /// Allow Successor ML features: a leading `|` in matches, trailing `;` in sequences, `if`
  /// without `else`, and `do` declarations.
  pub allow_successor_ml: bool,
  /// Allow `fun A.f x = ...`, binding the name `A.f`.
  pub allow_long_function_names: bool,
}

/// The context for parsing.
#[derive(Debug)]
pub struct ParserContext {
  /// The state, whose fixity table is read and updated.
  pub state: State,
  /// The options.
  pub options: Options,
}

/// Parses all of the tokens. Top-level expressions `e` are parsed as `val it = e`.
///
/// # Errors
///
/// If the tokens are not a valid program, or ran out before the end of one.
pub fn get(tokens: &[Token], cx: &mut ParserContext) -> Result<Vec<TopDec>, Error> {
  let mut p = parser::Parser::new(tokens, cx);
  let mut ret = Vec::new();
  loop {
    if p.eat_kw_opt(";") {
      continue;
    }
    if p.at_end() {
      return Ok(ret);
    }
    if dec::dec_start(&p) {
      ret.push(dec::dec(&mut p)?);
      continue;
    }
    let pos = p.pos();
    let exp = exp::exp(&mut p)?;
    if !p.at_end() && !p.at_kw(";") {
      return Err(p.expected(Expected::Kw(";")));
    }
    let pat = Pat { pos, kind: PatKind::Path(Path::one(Name::new("it"))) };
    let bind = ValBind { rec: false, pat, exp };
    ret.push(Dec { pos, kind: DecKind::Val(Vec::new(), vec![bind]) });
  }
}
