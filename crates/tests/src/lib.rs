//! Tests.
//!
//! - If you're not sure where to put a test, put it in misc.
//! - If you have many similar tests, put them in an existing or new module.

#![cfg(test)]

mod check;
mod config;
mod diff;
mod error;
mod exn;
mod fixity;
mod frames;
mod lex;
mod local;
mod matching;
mod misc;
mod modules;
mod num;
mod output;
mod state;
mod std_basis;
mod ty;
