//! Lexing on its own.

use pretty_assertions::assert_eq;
use sml_lex::{Options, TokenKind};

fn kinds(s: &str) -> Vec<TokenKind> {
  match sml_lex::get(s, &Options::default()) {
    Ok(tokens) => tokens.into_iter().map(|t| t.kind).collect(),
    Err(e) => panic!("couldn't lex {s:?}: {e}"),
  }
}

#[test]
fn word() {
  assert_eq!(kinds("0w42"), vec![TokenKind::Word(42)]);
  assert_eq!(kinds("0wx1f"), vec![TokenKind::Word(31)]);
}

#[test]
fn ints() {
  assert_eq!(
    kinds("42 ~3 0x1f 007"),
    vec![TokenKind::Numeric(42), TokenKind::Int(-3), TokenKind::Int(31), TokenKind::Int(7)]
  );
}

#[test]
fn round_trip() {
  let s = r#"val x = 0w42 + ~3 handle Foo => 0x1f; #"a" "hi\n" 1.5e3 'a ''b <> => ( ) * = 1"#;
  let tokens = match sml_lex::get(s, &Options::default()) {
    Ok(x) => x,
    Err(e) => panic!("couldn't lex: {e}"),
  };
  assert!(tokens.len() > 15);
  for token in tokens {
    assert_eq!(&s[token.pos..token.pos + token.text.len()], token.text.as_str());
    assert_eq!(kinds(&token.text), vec![token.kind]);
  }
}

#[test]
fn long_ident() {
  let got = kinds("List.map");
  assert_eq!(got.len(), 1);
  assert!(matches!(&got[0], TokenKind::LongIdent(_)));
  cov_mark::check("long_ident");
}

#[test]
fn comments_skipped() {
  assert_eq!(kinds("(* a (* nested *) comment *) 1"), vec![TokenKind::Numeric(1)]);
  let options = Options { allow_comment_token: true, ..Options::default() };
  let got = match sml_lex::get("(* hi *) 1", &options) {
    Ok(x) => x,
    Err(e) => panic!("couldn't lex: {e}"),
  };
  assert_eq!(got.len(), 2);
  assert_eq!(got[0].kind, TokenKind::Comment);
}

#[test]
fn incomplete() {
  for s in ["\"abc", "(* abc", "(* (* *)"] {
    match sml_lex::get(s, &Options::default()) {
      Ok(_) => panic!("lexed {s:?}"),
      Err(e) => assert!(e.is_incomplete(), "{s:?} not incomplete: {e}"),
    }
  }
}

#[test]
fn out_of_range() {
  match sml_lex::get("1073741824", &Options::default()) {
    Ok(_) => panic!("lexed out of range int"),
    Err(e) => {
      assert!(!e.is_incomplete());
      assert_eq!(e.to_string(), "numeric constant out of range");
    }
  }
}
