//! Basic punctuation insertion.

use crate::rules::compile;
use regex::Regex;
use std::sync::LazyLock;

/// Marks that end a sentence.
pub const TERMINAL_MARKS: [char; 3] = ['.', '!', '?'];

static GREETING_NAME: LazyLock<Regex> = LazyLock::new(|| compile(r"^([A-Z][a-z]+)\s+([a-z])"));
static SPACE_BEFORE_MARK: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+([.,!?])"));

/// Add a comma after an opening capitalized word ("Ansh please" → "Ansh,
/// please"), end the text with a period unless it already has a terminal
/// mark, and remove whitespace before punctuation.
///
/// Applying it twice gives the same result as applying it once.
pub fn insert_punctuation(text: &str) -> String {
    let mut s = GREETING_NAME.replace(text, "$1, $2").into_owned();

    if !s.ends_with(TERMINAL_MARKS) {
        s.push('.');
    }

    SPACE_BEFORE_MARK.replace_all(&s, "$1").into_owned()
}
