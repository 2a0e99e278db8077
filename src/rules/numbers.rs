//! Spoken digit sequences to digits.
//!
//! "my number is double nine five two" becomes "my number is 9952". Only
//! digit-by-digit speech is handled; "twenty three" style cardinals are not.

use crate::defaults::DIGIT_WINDOW;
use crate::rules::tables::RuleTables;

/// Convert one run of number words to a digit string.
///
/// "double"/"triple" repeat the following digit word; a multiplier without a
/// digit after it, and any non-digit word, contributes nothing.
pub fn words_to_digits(words: &[&str], tables: &RuleTables) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < words.len() {
        if let Some(times) = tables.multiplier(words[i]) {
            if let Some(digit) = words.get(i + 1).and_then(|next| tables.digit(next)) {
                out.extend(std::iter::repeat_n(digit, times));
                i += 2;
                continue;
            }
        }
        if let Some(digit) = tables.digit(words[i]) {
            out.push(digit);
        }
        i += 1;
    }
    out
}

/// Replace runs of spoken digit words with digit strings.
///
/// A run is at most [`DIGIT_WINDOW`] consecutive number words. If the run
/// yields no digits (e.g. a lone "double"), the current token is copied
/// through and scanning resumes at the next token. Output tokens are joined
/// by single spaces.
pub fn normalize_spoken_numbers(text: &str, tables: &RuleTables) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let run_len = tokens[i..]
            .iter()
            .take(DIGIT_WINDOW)
            .take_while(|t| tables.is_number_word(t))
            .count();

        if run_len > 0 {
            let digits = words_to_digits(&tokens[i..i + run_len], tables);
            if !digits.is_empty() {
                out.push(digits);
                i += run_len;
                continue;
            }
        }

        out.push(tokens[i].to_string());
        i += 1;
    }
    out.join(" ")
}
