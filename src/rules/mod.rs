//! Rule transforms: pure `&str -> String` rewrites of a transcript.
//!
//! Each transform is order-sensitive and meant to be chained inside a
//! candidate pipeline (see `correction::candidates`).

pub mod abbreviation;
pub mod currency;
pub mod email;
pub mod names;
pub mod numbers;
pub mod punctuation;
pub mod tables;

pub use names::{IndelRatio, LevenshteinRatio, Similarity};
pub use tables::RuleTables;

use regex::Regex;

/// Compile a pattern that is fixed at build time.
///
/// Only called with literals or `regex::escape`d words, which always compile.
#[allow(clippy::expect_used)]
pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in rule pattern must compile")
}
