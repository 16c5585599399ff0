//! Test helpers.

mod expect;

use pretty_assertions::assert_eq;
use sml_interp::{ErrorKind, Interpreted, Options, Warning};
use sml_state::{State, display_val};
use std::fmt;

/// Initializes logging for this test binary. Set `RUST_LOG` to see it.
pub(crate) fn init_logger() {
  // ignore the Err if we already initialized logging, since that's fine.
  _ = env_logger::builder().is_test(true).try_init();
}

/// Returns the state with every library module loaded.
pub(crate) fn first_state(options: &Options) -> State {
  init_logger();
  match sml_interp::first_state(&sml_interp::available_modules(), options) {
    Ok(x) => x,
    Err(e) => panic!("couldn't make first state: {e}"),
  }
}

/// Interprets `s` starting from the first state.
#[track_caller]
pub(crate) fn run(options: &Options, s: &str) -> Result<Interpreted, sml_interp::Error> {
  let state = first_state(options);
  log::debug!("interpret from state {}", state.id());
  sml_interp::interpret(s, &state, options)
}

/// Interprets `s` and checks it against the expectation comments in it.
///
/// Expectation comments are regular SML comments except they:
/// - are always on only one line
/// - start with `(**`
/// - point at the things that should have errors or warnings
/// - contain the expected message for those things
///
/// ```ignore
/// check(r#"
/// val _ = nope
/// (**     ^^^^ undefined value: nope *)
/// "#);
/// ```
///
/// Every error and warning must be expected, and every expectation must be met. An exception that
/// escapes fails the check, so use [`check_raise`] for that.
#[track_caller]
pub(crate) fn check(s: &str) {
  check_with(&Options::default(), s);
}

/// Like [`check`], with options.
#[track_caller]
pub(crate) fn check_with(options: &Options, s: &str) {
  let cx = Check::new(options, s);
  if !cx.reasons.is_empty() {
    panic!("{cx}")
  }
}

/// Like [`check`], but the expectation comments should not be satisfied.
///
/// Use this instead of ignoring tests, for things that should work but do not yet.
#[allow(dead_code)]
#[track_caller]
pub(crate) fn fail(s: &str) {
  let cx = Check::new(&Options::default(), s);
  if cx.reasons.is_empty() {
    panic!("unexpected pass: {cx}")
  }
}

/// Interprets `s` with no errors, then checks each name is bound to a value that displays as
/// wanted.
#[track_caller]
pub(crate) fn check_vals(s: &str, want: &[(&str, &str)]) {
  let got = ok(&Options::default(), s);
  for &(name, want) in want {
    let Some((val, _)) = got.state.dynamic_val(name) else { panic!("{name} not bound") };
    assert_eq!(want, display_val(&val).to_string(), "value of {name}");
  }
}

/// Interprets `s` with no errors, then checks each name has the wanted type.
#[track_caller]
pub(crate) fn check_tys(s: &str, want: &[(&str, &str)]) {
  let got = ok(&Options::default(), s);
  for &(name, want) in want {
    let Some(vi) = got.state.static_val(name) else { panic!("{name} has no type") };
    assert_eq!(want, vi.ty_scheme.display().to_string(), "type of {name}");
  }
}

/// Interprets `s`, which should raise an exception that displays as `want`.
#[track_caller]
pub(crate) fn check_raise(s: &str, want: &str) {
  let got = match run(&Options::default(), s) {
    Ok(x) => x,
    Err(e) => panic!("unexpected error: {e}"),
  };
  assert!(got.evaluation_errored, "nothing was raised");
  let Some(val) = &got.error else { panic!("errored, but no exception") };
  assert_eq!(want, display_val(val).to_string());
}

/// Interprets `s`, which should print exactly `want`.
#[track_caller]
pub(crate) fn check_output(s: &str, want: &[&str]) {
  let got = ok(&Options::default(), s);
  let got: Vec<_> = got
    .warnings
    .iter()
    .filter_map(|w| match w {
      Warning::Output(s) => Some(s.as_str()),
      Warning::Statics(_) => None,
    })
    .collect();
  assert_eq!(want, got.as_slice());
}

/// Interprets `s`, which should fail with an error of the kind whose message contains `msg`.
#[track_caller]
pub(crate) fn check_err(options: &Options, s: &str, kind: ErrorKind, msg: &str) {
  match run(options, s) {
    Ok(_) => panic!("unexpected success, wanted {kind}: {msg}"),
    Err(e) => {
      assert_eq!(kind, e.kind(), "wrong kind for {e}");
      assert!(e.message().contains(msg), "want not contained in got\n  want: {msg}\n  got: {e}");
    }
  }
}

#[track_caller]
fn ok(options: &Options, s: &str) -> Interpreted {
  match run(options, s) {
    Ok(got) => {
      if let Some(val) = &got.error {
        panic!("uncaught exception: {}", display_val(val));
      }
      got
    }
    Err(e) => panic!("unexpected error: {e}"),
  }
}

struct Check {
  file: expect::File,
  reasons: Vec<Reason>,
}

enum Reason {
  NoneEmitted(usize),
  GotButNotWanted(expect::Region, String),
  Mismatched(expect::Region, String, String),
  Unmet(expect::Region, String),
  Raised(String),
}

impl Check {
  fn new(options: &Options, s: &str) -> Self {
    let file = expect::File::new(s);
    let mut got = Vec::<(usize, String)>::new();
    match run(options, s) {
      Ok(interpreted) => {
        if let Some(val) = &interpreted.error {
          let reasons = vec![Reason::Raised(display_val(val).to_string())];
          return Self { file, reasons };
        }
        for w in interpreted.warnings {
          if let Warning::Statics(w) = w {
            got.push((w.pos(), w.to_string()));
          }
        }
      }
      Err(e) => got.push((e.pos(), e.to_string())),
    }
    let mut reasons = Vec::new();
    if got.is_empty() && file.len() != 0 {
      reasons.push(Reason::NoneEmitted(file.len()));
    }
    let mut met = Vec::<expect::Region>::new();
    for (pos, msg) in got {
      let exact = expect::Region::at(s, pos);
      let line = expect::Region::Line(exact.line());
      let found = [exact, line].into_iter().find_map(|r| file.get(r).map(|e| (r, e)));
      match found {
        None => reasons.push(Reason::GotButNotWanted(exact, msg)),
        Some((region, want)) => {
          if want.matches(&msg) {
            met.push(region);
          } else {
            reasons.push(Reason::Mismatched(region, want.to_string(), msg));
          }
        }
      }
    }
    if !reasons.iter().any(|r| matches!(r, Reason::NoneEmitted(_))) {
      for (&region, want) in file.iter() {
        if !met.contains(&region) {
          reasons.push(Reason::Unmet(region, want.to_string()));
        }
      }
    }
    Self { file, reasons }
  }
}

impl fmt::Display for Check {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("\n\n  reasons:\n")?;
    for reason in &self.reasons {
      f.write_str("  - ")?;
      match reason {
        Reason::NoneEmitted(n) => writeln!(f, "wanted {n} diagnostics, but got none")?,
        Reason::GotButNotWanted(r, got) => {
          writeln!(f, "{r}: got a diagnostic, but wanted none")?;
          writeln!(f, "    - got:  {got}")?;
        }
        Reason::Mismatched(r, want, got) => {
          writeln!(f, "{r}: mismatched")?;
          writeln!(f, "    - want: {want}")?;
          writeln!(f, "    - got:  {got}")?;
        }
        Reason::Unmet(r, want) => {
          writeln!(f, "{r}: wanted a diagnostic, but got none")?;
          writeln!(f, "    - want: {want}")?;
        }
        Reason::Raised(val) => writeln!(f, "uncaught exception: {val}")?,
      }
    }
    let n = self.file.len();
    writeln!(f, "\n  {n} expectations")
  }
}
