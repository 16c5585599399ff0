//! Expectations.

use std::collections::BTreeMap;
use std::fmt;

/// A map from regions to expectations.
#[derive(Debug)]
pub(crate) struct File(BTreeMap<Region, Expect>);

impl File {
  pub(crate) fn new(s: &str) -> Self {
    Self(s.lines().enumerate().filter_map(|(line_n, line_s)| get_one(line_n, line_s)).collect())
  }

  pub(crate) fn get(&self, r: Region) -> Option<&Expect> {
    self.0.get(&r)
  }

  pub(crate) fn len(&self) -> usize {
    self.0.len()
  }

  pub(crate) fn iter(&self) -> impl Iterator<Item = (&Region, &Expect)> + '_ {
    self.0.iter()
  }
}

/// See [`get_one`].
const COMMENT_START: &str = "(**";

/// Parses expectation comments from a line of text. The line will be the following in order:
///
/// - zero or more of any character
/// - the string `COMMENT_START` (the comment start)
/// - zero or more spaces
/// - one arrow character (^, +, v, -)
/// - zero or more non-spaces (usually more of the arrow character)
/// - one space
/// - one or more of any character (the message)
/// - zero or more spaces
/// - the string `*)` (the comment end)
/// - zero or more of any character
///
/// `^` and `v` point at the column of the arrow on the line above or below. `+` and `-` point at
/// the whole line above or below.
fn get_one(line_n: usize, line_s: &str) -> Option<(Region, Expect)> {
  let (before, inner) = line_s.split_once(COMMENT_START)?;
  let (inner, _) = inner.split_once("*)")?;
  let non_space_idx = inner.find(|c| c != ' ')?;
  let inner = &inner[non_space_idx..];
  let (arrows, msg) = inner.split_once(' ')?;
  let msg = msg.trim_end_matches(' ');
  let (line, exact) = match arrows.chars().next()? {
    '^' => (line_n.checked_sub(1)?, true),
    '+' => (line_n.checked_sub(1)?, false),
    'v' => (line_n + 1, true),
    '-' => (line_n + 1, false),
    c => panic!("invalid arrow: {c}"),
  };
  let region = if exact {
    Region::Exact { line, col: before.len() + COMMENT_START.len() + non_space_idx }
  } else {
    Region::Line(line)
  };
  Some((region, Expect::new(msg)))
}

/// A region that an expectation comment can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Region {
  /// An entire line.
  Line(usize),
  /// The start of something on a line.
  Exact { line: usize, col: usize },
}

impl Region {
  /// Returns the exact region for the byte offset in `s`.
  pub(crate) fn at(s: &str, pos: usize) -> Self {
    let before = &s[..pos.min(s.len())];
    let line = before.matches('\n').count();
    let col = before.rfind('\n').map_or(before.len(), |idx| before.len() - idx - 1);
    Region::Exact { line, col }
  }

  pub(crate) fn line(self) -> usize {
    match self {
      Region::Line(line) | Region::Exact { line, .. } => line,
    }
  }
}

impl fmt::Display for Region {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // don't add 1 for the line because the check strings usually have the first line blank.
    match self {
      Region::Exact { line, col } => write!(f, "{line}:{}", col + 1),
      Region::Line(line) => write!(f, "{line}"),
    }
  }
}

/// Something expected in a source file.
#[derive(Debug)]
pub(crate) struct Expect {
  pub(crate) kind: Kind,
  pub(crate) msg: String,
}

impl Expect {
  fn new(msg: &str) -> Self {
    match msg.strip_prefix("exact: ") {
      Some(msg) => Self { kind: Kind::Exact, msg: msg.to_owned() },
      None => Self { kind: Kind::Contains, msg: msg.to_owned() },
    }
  }

  pub(crate) fn matches(&self, got: &str) -> bool {
    match self.kind {
      Kind::Exact => self.msg == got,
      Kind::Contains => got.contains(&self.msg),
    }
  }
}

impl fmt::Display for Expect {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.kind, self.msg)
  }
}

/// A kind of expectation.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Kind {
  /// There should be a diagnostic that exactly matches the message.
  Exact,
  /// There should be a diagnostic that contains the message.
  Contains,
}

impl fmt::Display for Kind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Kind::Exact => f.write_str("exact"),
      Kind::Contains => f.write_str("contains"),
    }
  }
}
