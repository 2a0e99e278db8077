//! Entity extraction used by the evaluation metrics.

use crate::defaults::EVAL_NAME_THRESHOLD;
use crate::lexicon::Lexicon;
use crate::rules::compile;
use crate::rules::{IndelRatio, Similarity};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Punctuation marks counted by the punctuation F1.
pub const SCORED_MARKS: [char; 3] = ['.', ',', '?'];

static EMAIL: LazyLock<Regex> = LazyLock::new(|| compile(r"[\w.\-+]+@[\w.-]+\.[a-z]{2,}"));
static NUMBER: LazyLock<Regex> = LazyLock::new(|| compile(r"[₹$]?\s?[0-9][0-9,.]*"));

/// Email addresses in `text`, lowercased, in order of appearance.
pub fn extract_emails(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    EMAIL
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Drop the rupee sign and digit separators, trim, lowercase.
pub fn normalize_number(raw: &str) -> String {
    raw.replace(['₹', ','], "").trim().to_lowercase()
}

/// Normalized numbers (amounts included) in order of appearance.
pub fn extract_numbers(text: &str) -> Vec<String> {
    NUMBER
        .find_iter(text)
        .map(|m| normalize_number(m.as_str()))
        .collect()
}

/// Scored punctuation marks in order.
pub fn punctuation_marks(text: &str) -> Vec<char> {
    text.chars().filter(|c| SCORED_MARKS.contains(c)).collect()
}

/// Lexicon names mentioned in `text`, lowercased.
///
/// Multi-word names must appear verbatim (case-insensitive). Single-word
/// names match any token whose Indel ratio against the name reaches
/// [`EVAL_NAME_THRESHOLD`]; tokens are lowercased with surrounding `.,?`
/// removed.
pub fn names_in_text(text: &str, lexicon: &Lexicon) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|t| t.trim_matches(SCORED_MARKS).to_lowercase())
        .collect();

    let mut found = BTreeSet::new();
    for name in lexicon.iter() {
        let name = name.to_lowercase();
        let present = if name.contains(' ') {
            lower.contains(&name)
        } else {
            tokens
                .iter()
                .any(|t| IndelRatio.similarity(&name, t) >= EVAL_NAME_THRESHOLD)
        };
        if present {
            found.insert(name);
        }
    }
    found
}
