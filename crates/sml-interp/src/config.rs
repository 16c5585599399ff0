//! Options for interpreting, and loading them from TOML.

use serde::Deserialize;
use std::fmt;

/// Options for interpreting.
///
/// In TOML, the keys are kebab-case, like `strict-mode`. Every key is optional.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
  /// Allow non-ASCII letters in identifiers and characters above 255 in strings.
  pub allow_unicode_in_strings: bool,
  /// Allow Successor ML features.
  pub allow_successor_ml: bool,
  /// Skip static analysis.
  pub disable_elaboration: bool,
  /// Skip running.
  pub disable_evaluation: bool,
  /// Allow `fun A.f x = ...`.
  pub allow_long_function_names: bool,
  /// Reject real constants in patterns.
  pub strict_mode: bool,
  /// Let `real` admit equality.
  pub real_equality: bool,
  /// Emit comments as tokens.
  pub allow_comment_token: bool,
  /// The most evaluation frames there may be at once.
  pub max_frames: usize,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      allow_unicode_in_strings: false,
      allow_successor_ml: false,
      disable_elaboration: false,
      disable_evaluation: false,
      allow_long_function_names: false,
      strict_mode: true,
      real_equality: false,
      allow_comment_token: false,
      max_frames: 1_000_000,
    }
  }
}

impl Options {
  /// Parses options from a TOML document.
  ///
  /// # Errors
  ///
  /// If the document is not valid TOML, has unknown keys, or has values of the wrong type.
  pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
    toml::from_str(contents).map_err(ConfigError)
  }

  pub(crate) fn lex(&self) -> sml_lex::Options {
    sml_lex::Options {
      allow_unicode: self.allow_unicode_in_strings,
      allow_comment_token: self.allow_comment_token,
    }
  }

  pub(crate) fn parse(&self) -> sml_parse::Options {
    sml_parse::Options {
      allow_successor_ml: self.allow_successor_ml,
      allow_long_function_names: self.allow_long_function_names,
    }
  }

  pub(crate) fn statics(&self) -> sml_statics::Options {
    sml_statics::Options {
      strict_mode: self.strict_mode,
      real_equality: self.real_equality,
      allow_long_function_names: self.allow_long_function_names,
    }
  }

  pub(crate) fn dynamics(&self) -> sml_dynamics::Options {
    // without static analysis, nothing else catches bad re-binding.
    sml_dynamics::Options { max_frames: self.max_frames, check_rebind: self.disable_elaboration }
  }
}

/// An error from loading options.
#[derive(Debug)]
pub struct ConfigError(toml::de::Error);

impl ConfigError {
  /// Returns the underlying TOML error.
  #[must_use]
  pub fn toml(&self) -> &toml::de::Error {
    &self.0
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "couldn't parse config: {}", self.0)
  }
}

impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    Some(&self.0)
  }
}
