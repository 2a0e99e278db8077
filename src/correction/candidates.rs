//! Candidate generation: fixed rule pipelines over one utterance.
//!
//! Each pipeline applies its transforms to an independent copy of the input.
//! Results are deduplicated, longest first, and capped at
//! [`MAX_CANDIDATES`](crate::defaults::MAX_CANDIDATES).

use crate::defaults::{MAX_CANDIDATES, NAME_MATCH_THRESHOLD};
use crate::lexicon::Lexicon;
use crate::rules::abbreviation::normalize_abbreviations;
use crate::rules::currency::normalize_currency;
use crate::rules::email::{fix_email_spacing, normalize_email_tokens};
use crate::rules::names::correct_names;
use crate::rules::numbers::normalize_spoken_numbers;
use crate::rules::punctuation::insert_punctuation;
use crate::rules::{IndelRatio, RuleTables, Similarity};
use std::cmp::Reverse;
use std::sync::Arc;

/// The rewrite pipelines, in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    /// abbreviation → email tokens → spoken numbers → currency → names → punctuation
    Full,
    /// abbreviation → email tokens → punctuation
    EmailFocused,
    /// abbreviation → email spacing only → punctuation
    Minimal,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 3] = [
        PipelineKind::Full,
        PipelineKind::EmailFocused,
        PipelineKind::Minimal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PipelineKind::Full => "full",
            PipelineKind::EmailFocused => "email",
            PipelineKind::Minimal => "minimal",
        }
    }
}

/// Turns one noisy utterance into a small set of plausible rewrites.
#[derive(Clone)]
pub struct CandidateGenerator {
    tables: Arc<RuleTables>,
    lexicon: Arc<Lexicon>,
    similarity: Arc<dyn Similarity>,
    name_threshold: f64,
}

impl std::fmt::Debug for CandidateGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateGenerator")
            .field("lexicon", &format_args!("[{} names]", self.lexicon.len()))
            .field("similarity", &self.similarity.name())
            .field("name_threshold", &self.name_threshold)
            .finish_non_exhaustive()
    }
}

impl CandidateGenerator {
    /// Generator with the English tables, Indel similarity and the default
    /// name threshold.
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            tables: Arc::new(RuleTables::english()),
            lexicon,
            similarity: Arc::new(IndelRatio),
            name_threshold: NAME_MATCH_THRESHOLD,
        }
    }

    pub fn with_tables(mut self, tables: Arc<RuleTables>) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn with_name_threshold(mut self, threshold: f64) -> Self {
        self.name_threshold = threshold;
        self
    }

    pub fn tables(&self) -> &RuleTables {
        &self.tables
    }

    /// Run a single pipeline over `text`.
    pub fn run_pipeline(&self, kind: PipelineKind, text: &str) -> String {
        let tables = self.tables.as_ref();
        let s = normalize_abbreviations(text, tables);
        let s = match kind {
            PipelineKind::Full => {
                let s = normalize_email_tokens(&s, tables);
                let s = normalize_spoken_numbers(&s, tables);
                let s = normalize_currency(&s);
                correct_names(
                    &s,
                    &self.lexicon,
                    self.similarity.as_ref(),
                    self.name_threshold,
                )
            }
            PipelineKind::EmailFocused => normalize_email_tokens(&s, tables),
            PipelineKind::Minimal => fix_email_spacing(&s, tables),
        };
        insert_punctuation(&s)
    }

    /// Produce 1..=3 unique candidates, longest first.
    ///
    /// Equal-length candidates keep pipeline order (full, email, minimal).
    pub fn generate(&self, text: &str) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::with_capacity(PipelineKind::ALL.len());
        for kind in PipelineKind::ALL {
            let candidate = self.run_pipeline(kind, text);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        let candidates = rank(candidates);
        tracing::debug!(input = text, count = candidates.len(), "candidates generated");
        candidates
    }
}

/// Longest first (stable), capped.
fn rank(mut candidates: Vec<String>) -> Vec<String> {
    candidates.sort_by_key(|c| Reverse(c.chars().count()));
    candidates.truncate(MAX_CANDIDATES);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> CandidateGenerator {
        CandidateGenerator::new(Arc::new(Lexicon::from_names(["Ansh", "Priya"])))
    }

    #[test]
    fn test_full_pipeline_applies_every_rule() {
        let out = generator().run_pipeline(
            PipelineKind::Full,
            "hey ansh can u send the payment proof to my g mail dot com",
        );
        assert_eq!(out, "Hey Ansh can you send the payment proof to my gmail.com.");
    }

    #[test]
    fn test_email_pipeline_skips_names() {
        let out = generator().run_pipeline(
            PipelineKind::EmailFocused,
            "hey ansh can u send the payment proof to my g mail dot com",
        );
        assert_eq!(out, "Hey, ansh can you send the payment proof to my gmail.com.");
    }

    #[test]
    fn test_minimal_pipeline_keeps_spoken_email_words() {
        let out = generator().run_pipeline(
            PipelineKind::Minimal,
            "hey ansh can u send the payment proof to my g mail dot com",
        );
        assert_eq!(
            out,
            "Hey, ansh can you send the payment proof to my g mail dot com."
        );
    }

    #[test]
    fn test_generate_orders_longest_first() {
        let candidates =
            generator().generate("hey ansh can u send the payment proof to my g mail dot com");
        assert_eq!(candidates.len(), 3);
        assert_eq!(
            candidates[0],
            "Hey, ansh can you send the payment proof to my g mail dot com."
        );
        for pair in candidates.windows(2) {
            assert!(pair[0].chars().count() >= pair[1].chars().count());
        }
    }

    #[test]
    fn test_agreeing_pipelines_give_one_candidate() {
        let candidates = generator().generate("ansh pls call");
        assert_eq!(candidates, vec!["Ansh, please call.".to_string()]);
    }

    #[test]
    fn test_rank_is_stable_for_equal_lengths() {
        let ranked = rank(vec![
            "bb".to_string(),
            "aaa".to_string(),
            "cc".to_string(),
            "d".to_string(),
        ]);
        assert_eq!(ranked, vec!["aaa", "bb", "cc"]);
    }

    #[test]
    fn test_rank_counts_characters_not_bytes() {
        // "₹1" is 2 chars but 4 bytes.
        let ranked = rank(vec!["₹1".to_string(), "abc".to_string()]);
        assert_eq!(ranked, vec!["abc", "₹1"]);
    }

    #[test]
    fn test_identical_outputs_are_deduplicated() {
        let candidates = generator().generate("hello");
        assert_eq!(candidates, vec!["Hello.".to_string()]);
    }

    #[test]
    fn test_empty_input_still_yields_a_candidate() {
        let candidates = generator().generate("");
        assert_eq!(candidates, vec![".".to_string()]);
    }

    #[test]
    fn test_never_more_than_three() {
        for input in [
            "",
            "   ",
            "my number is double nine five two",
            "please pay rs 123456",
            "j o h n d at gmail dot com",
        ] {
            let candidates = generator().generate(input);
            assert!(!candidates.is_empty() && candidates.len() <= MAX_CANDIDATES);
        }
    }

    #[test]
    fn test_currency_scenario() {
        let candidates = generator().generate("please pay rs 123456");
        assert!(
            candidates.iter().any(|c| c.contains("₹1,23,456")),
            "got {candidates:?}"
        );
    }

    #[test]
    fn test_spoken_number_scenario() {
        let out = generator().run_pipeline(PipelineKind::Full, "my number is double nine five two");
        assert_eq!(out, "My, number is 9952.");
    }

    #[test]
    fn test_threshold_controls_name_replacement() {
        let strict = generator().with_name_threshold(100.0);
        let out = strict.run_pipeline(PipelineKind::Full, "call priyaa now");
        assert_eq!(out, "Call, priyaa now.");

        let default = generator().run_pipeline(PipelineKind::Full, "call priyaa now");
        assert_eq!(default, "Call Priya now.");
    }
}
