//! Proper-name correction against the lexicon.
//!
//! Tokens that could be names are fuzzy-matched against every lexicon entry.
//! The similarity function is injected through [`Similarity`] so the matching
//! policy does not depend on one particular edit-distance implementation.

use crate::config::ScorerKind;
use crate::lexicon::Lexicon;

/// Similarity score between two strings, in `0.0..=100.0`.
pub trait Similarity: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Name for logging/diagnostics.
    fn name(&self) -> &'static str;
}

/// Indel ratio: `100 * (1 - indel_distance / (len_a + len_b))`.
///
/// Insertions and deletions only, so a substitution costs two edits. Two
/// empty strings are identical (100).
#[derive(Debug, Clone, Copy, Default)]
pub struct IndelRatio;

impl Similarity for IndelRatio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let total = a.len() + b.len();
        if total == 0 {
            return 100.0;
        }
        let lcs = longest_common_subsequence(&a, &b);
        200.0 * lcs as f64 / total as f64
    }

    fn name(&self) -> &'static str {
        "indel"
    }
}

/// Normalized Levenshtein similarity scaled to 0..=100.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinRatio;

impl Similarity for LevenshteinRatio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b) * 100.0
    }

    fn name(&self) -> &'static str {
        "levenshtein"
    }
}

/// Build the configured similarity function.
pub fn similarity_for(kind: ScorerKind) -> Box<dyn Similarity> {
    match kind {
        ScorerKind::Indel => Box::new(IndelRatio),
        ScorerKind::Levenshtein => Box::new(LevenshteinRatio),
    }
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Fold a string for matching: lowercase, non-alphanumerics become spaces,
/// surrounding whitespace trimmed. "Ansh," and "ansh" fold to the same key.
pub fn fold_for_matching(s: &str) -> String {
    let folded: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect();
    folded.trim().to_string()
}

/// Best lexicon match for `token` as `(name, score)`.
///
/// Ties keep the earliest lexicon entry. Returns `None` for an empty lexicon
/// or a token with nothing left to match after folding.
pub fn best_match<'a>(
    token: &str,
    lexicon: &'a Lexicon,
    similarity: &dyn Similarity,
) -> Option<(&'a str, f64)> {
    let query = fold_for_matching(token);
    if query.is_empty() {
        return None;
    }

    let mut best: Option<(&'a str, f64)> = None;
    for name in lexicon.iter() {
        let score = similarity.similarity(&query, &fold_for_matching(name));
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((name, score));
        }
    }
    best
}

/// Whether a token's casing allows it to be a name: first letter uppercase,
/// or every cased letter lowercase.
fn looks_like_name(token: &str) -> bool {
    let starts_upper = token.chars().next().is_some_and(char::is_uppercase);
    let all_lower =
        token.chars().any(char::is_lowercase) && !token.chars().any(char::is_uppercase);
    starts_upper || all_lower
}

/// First character uppercase, the rest lowercase.
pub fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Replace name-like tokens with their lexicon spelling.
///
/// Tokens longer than two characters with name-like casing are matched; a
/// match scoring at least `threshold` is replaced by the lexicon form.
/// Unmatched candidates are capitalized when they open the text or follow a
/// token ending in a comma. Output tokens are joined by single spaces.
pub fn correct_names(
    text: &str,
    lexicon: &Lexicon,
    similarity: &dyn Similarity,
    threshold: f64,
) -> String {
    let mut out: Vec<String> = Vec::new();
    for token in text.split_whitespace() {
        if token.chars().count() <= 2 || !looks_like_name(token) {
            out.push(token.to_string());
            continue;
        }

        match best_match(token, lexicon, similarity) {
            Some((name, score)) if score >= threshold => {
                tracing::trace!(token, name, score, "name corrected");
                out.push(name.to_string());
            }
            _ => {
                let sentence_start = out.last().is_none_or(|prev| prev.ends_with(','));
                if sentence_start {
                    out.push(capitalize(token));
                } else {
                    out.push(token.to_string());
                }
            }
        }
    }
    out.join(" ")
}
