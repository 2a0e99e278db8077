//! Abbreviation expansion, sentence capitalization and compound-word fixes.

use crate::rules::tables::RuleTables;

/// Expand spoken abbreviations, capitalize the first letter and normalize
/// known compound words.
///
/// Compound fixes run after capitalization so their canonical casing wins
/// even at the start of the sentence.
pub fn normalize_abbreviations(text: &str, tables: &RuleTables) -> String {
    let mut s = text.to_string();
    for rule in &tables.abbreviations {
        s = rule.apply(&s);
    }

    s = capitalize_first(&s);

    for rule in &tables.compounds {
        s = rule.apply(&s);
    }
    s
}

/// Uppercase the first character if it is lowercase; leave the rest alone.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(chars.as_str());
            out
        }
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(text: &str) -> String {
        normalize_abbreviations(text, &RuleTables::english())
    }

    #[test]
    fn test_expands_whole_word_abbreviations() {
        assert_eq!(
            normalize("pls send ur adress"),
            "Please send your address"
        );
    }

    #[test]
    fn test_abbreviations_are_case_insensitive() {
        assert_eq!(normalize("PLS call U"), "Please call you");
    }

    #[test]
    fn test_does_not_touch_substrings() {
        assert_eq!(normalize("umbrella urgent"), "Umbrella urgent");
    }

    #[test]
    fn test_contractions() {
        assert_eq!(normalize("im sure lets go"), "I'm sure let's go");
    }

    #[test]
    fn test_capitalizes_only_when_lowercase() {
        assert_eq!(normalize("hello there"), "Hello there");
        assert_eq!(normalize("Hello there"), "Hello there");
        assert_eq!(normalize("123 main street"), "123 main street");
    }

    #[test]
    fn test_counter_offer_variants() {
        assert_eq!(
            normalize("send the counteroffer today"),
            "Send the Counter-offer today"
        );
        assert_eq!(normalize("counter offer is fine"), "Counter-offer is fine");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_capitalize_first_handles_multibyte() {
        assert_eq!(capitalize_first("élan"), "Élan");
        assert_eq!(capitalize_first("₹500"), "₹500");
    }
}
