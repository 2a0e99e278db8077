//! Fixed replacement tables used by the rule transforms.
//!
//! Tables are plain data compiled once into a [`RuleTables`] value and passed
//! by reference into every transform, so transforms stay pure functions of
//! their input and can be tested with custom tables.

use crate::rules::compile;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Spoken abbreviations and common ASR misspellings, matched as whole words
/// regardless of case.
pub const ABBREVIATIONS: &[(&str, &str)] = &[
    ("pls", "please"),
    ("u", "you"),
    ("ur", "your"),
    ("im", "I'm"),
    ("adress", "address"),
    ("ofer", "offer"),
    ("ofering", "offering"),
    ("lets", "let's"),
];

/// Compound words with a canonical hyphenated spelling.
pub const COMPOUNDS: &[(&str, &str)] = &[
    ("counteroffer", "Counter-offer"),
    ("counter offer", "Counter-offer"),
];

/// Misspelled email providers.
pub const PROVIDER_TYPOS: &[(&str, &str)] = &[
    ("yahooo", "yahoo"),
    ("gmial", "gmail"),
    ("outlok", "outlook"),
];

/// Spoken digit words. "oh" is the usual way of saying zero inside phone numbers.
pub const DIGIT_WORDS: &[(&str, char)] = &[
    ("zero", '0'),
    ("oh", '0'),
    ("one", '1'),
    ("two", '2'),
    ("three", '3'),
    ("four", '4'),
    ("five", '5'),
    ("six", '6'),
    ("seven", '7'),
    ("eight", '8'),
    ("nine", '9'),
];

/// Words that repeat the following digit.
pub const MULTIPLIERS: &[(&str, usize)] = &[("double", 2), ("triple", 3)];

/// First words that make an utterance a question or a greeting.
pub const QUESTION_OPENERS: &[&str] = &[
    "can", "shall", "will", "could", "would", "is", "are", "do", "does", "did", "should", "hey",
    "hello",
];

/// A compiled whole-word replacement.
#[derive(Debug, Clone)]
pub struct WordReplacement {
    pub pattern: Regex,
    pub replacement: String,
}

impl WordReplacement {
    /// Case-insensitive whole-word match of `word` (which may contain spaces).
    pub fn whole_word(word: &str, replacement: &str) -> Self {
        Self {
            pattern: compile(&format!(r"(?i)\b{}\b", regex::escape(word))),
            replacement: replacement.to_string(),
        }
    }

    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, regex::NoExpand(&self.replacement))
            .into_owned()
    }
}

/// All table-driven data the rule transforms need.
#[derive(Debug, Clone)]
pub struct RuleTables {
    pub abbreviations: Vec<WordReplacement>,
    pub compounds: Vec<WordReplacement>,
    pub provider_typos: Vec<WordReplacement>,
    digit_words: HashMap<String, char>,
    multipliers: HashMap<String, usize>,
    question_openers: HashSet<String>,
}

impl RuleTables {
    /// Build tables from custom data.
    pub fn new(
        abbreviations: &[(&str, &str)],
        compounds: &[(&str, &str)],
        provider_typos: &[(&str, &str)],
        digit_words: &[(&str, char)],
        multipliers: &[(&str, usize)],
        question_openers: &[&str],
    ) -> Self {
        let replacements = |pairs: &[(&str, &str)]| {
            pairs
                .iter()
                .map(|(word, replacement)| WordReplacement::whole_word(word, replacement))
                .collect()
        };
        Self {
            abbreviations: replacements(abbreviations),
            compounds: replacements(compounds),
            provider_typos: replacements(provider_typos),
            digit_words: digit_words
                .iter()
                .map(|(w, d)| (w.to_lowercase(), *d))
                .collect(),
            multipliers: multipliers
                .iter()
                .map(|(w, n)| (w.to_lowercase(), *n))
                .collect(),
            question_openers: question_openers.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// The English tables.
    pub fn english() -> Self {
        Self::new(
            ABBREVIATIONS,
            COMPOUNDS,
            PROVIDER_TYPOS,
            DIGIT_WORDS,
            MULTIPLIERS,
            QUESTION_OPENERS,
        )
    }

    /// Digit for a spoken digit word (case-insensitive).
    pub fn digit(&self, word: &str) -> Option<char> {
        self.digit_words.get(&word.to_lowercase()).copied()
    }

    /// Repeat count for a multiplier word (case-insensitive).
    pub fn multiplier(&self, word: &str) -> Option<usize> {
        self.multipliers.get(&word.to_lowercase()).copied()
    }

    /// Whether `word` belongs to the spoken-number vocabulary.
    pub fn is_number_word(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        self.digit_words.contains_key(&lower) || self.multipliers.contains_key(&lower)
    }

    pub fn is_question_opener(&self, word: &str) -> bool {
        self.question_openers.contains(&word.to_lowercase())
    }
}

impl Default for RuleTables {
    fn default() -> Self {
        Self::english()
    }
}
