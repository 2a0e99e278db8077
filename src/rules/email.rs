//! Email address repair.
//!
//! ASR output spells addresses out ("j o h n d at gmail dot com"), splits
//! provider names ("g mail") and drops dots before the top-level domain.
//! [`normalize_email_tokens`] rewrites the spoken tokens and then applies the
//! pattern-only fixes in [`fix_email_spacing`], which the minimal pipeline also
//! uses on its own.

use crate::defaults::SPELLED_LETTER_RUN;
use crate::rules::compile;
use crate::rules::tables::RuleTables;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static AT_TOKEN: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\(at\)|\bat\b"));
static DOT_TOKEN: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\bdot\b"));
static SPACE_AROUND_AT: LazyLock<Regex> = LazyLock::new(|| compile(r"\s*@\s*"));
static SPACE_AROUND_DOT: LazyLock<Regex> = LazyLock::new(|| compile(r"\s*\.\s*"));

static SPLIT_MAIL_PROVIDER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)(\w+)\s+mail\s*\.\s*com"));
static MISSING_TLD_DOT: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)@(\w+)(com|org|in|net)\b"));
static EMAIL_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b[\w.\-]+\s*@\s*[\w\s.\-]+\.\s*(?:com|org|in|net)\b")
});
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| compile(r"\s+"));
static REPEATED_DOTS: LazyLock<Regex> = LazyLock::new(|| compile(r"\.{2,}"));

/// Join runs of spelled-out letters: "g m a i l" becomes "gmail".
///
/// A run of at least five consecutive single-character tokens is joined into
/// one token, however long it is. Shorter runs are kept. Output tokens are
/// separated by single spaces.
pub fn collapse_spelled_letters(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let run = tokens[i..]
            .iter()
            .take_while(|t| t.chars().count() == 1)
            .count();
        if run >= SPELLED_LETTER_RUN {
            out.push(tokens[i..i + run].concat());
            i += run;
        } else {
            out.push(tokens[i].to_string());
            i += 1;
        }
    }
    out.join(" ")
}

/// Full email repair: spelled letters, spoken "at"/"dot", spacing, then the
/// pattern-based fixes.
pub fn normalize_email_tokens(text: &str, tables: &RuleTables) -> String {
    let s = collapse_spelled_letters(text);
    let s = AT_TOKEN.replace_all(&s, "@");
    let s = DOT_TOKEN.replace_all(&s, ".");
    let s = SPACE_AROUND_AT.replace_all(&s, "@");
    let s = SPACE_AROUND_DOT.replace_all(&s, ".");
    fix_email_spacing(&s, tables)
}

/// Pattern-only email fixes; spoken words are left alone.
///
/// - "g mail.com" → "gmail.com"
/// - "@gmailcom" → "@gmail.com"
/// - provider typos ("yahooo" → "yahoo")
/// - email-like spans lose internal whitespace and repeated dots
pub fn fix_email_spacing(text: &str, tables: &RuleTables) -> String {
    let s = SPLIT_MAIL_PROVIDER.replace_all(text, "${1}mail.com");
    let mut s = MISSING_TLD_DOT.replace_all(&s, "@${1}.${2}").into_owned();

    for rule in &tables.provider_typos {
        s = rule.apply(&s);
    }

    EMAIL_LIKE
        .replace_all(&s, |caps: &Captures| {
            let compact = WHITESPACE.replace_all(&caps[0], "");
            REPEATED_DOTS.replace_all(&compact, ".").into_owned()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> RuleTables {
        RuleTables::english()
    }

    #[test]
    fn test_collapses_five_single_letters() {
        assert_eq!(collapse_spelled_letters("g m a i l"), "gmail");
        assert_eq!(
            collapse_spelled_letters("mail j o h n d now"),
            "mail johnd now"
        );
    }

    #[test]
    fn test_short_letter_runs_are_kept() {
        assert_eq!(collapse_spelled_letters("i am a b c"), "i am a b c");
    }

    #[test]
    fn test_long_runs_collapse_whole() {
        assert_eq!(collapse_spelled_letters("a b c d e f g"), "abcdefg");
        assert_eq!(collapse_spelled_letters("j o h n d o e"), "johndoe");
        assert_eq!(
            collapse_spelled_letters("call j o h n d o e at five"),
            "call johndoe at five"
        );
    }

    #[test]
    fn test_seven_letter_local_part_repairs() {
        assert_eq!(
            normalize_email_tokens("mail j o h n d o e at gmail dot com", &tables()),
            "mail johndoe@gmail.com"
        );
    }

    #[test]
    fn test_collapse_normalizes_whitespace() {
        assert_eq!(collapse_spelled_letters("  hello   world "), "hello world");
        assert_eq!(collapse_spelled_letters(""), "");
    }

    #[test]
    fn test_spoken_at_and_dot() {
        assert_eq!(
            normalize_email_tokens("john dot doe at gmail dot com", &tables()),
            "john.doe@gmail.com"
        );
    }

    #[test]
    fn test_parenthesized_at() {
        assert_eq!(
            normalize_email_tokens("priya (at) outlook dot com", &tables()),
            "priya@outlook.com"
        );
    }

    #[test]
    fn test_spelled_local_part() {
        assert_eq!(
            normalize_email_tokens("email j o h n d at gmail dot com", &tables()),
            "email johnd@gmail.com"
        );
    }

    #[test]
    fn test_split_provider_name() {
        assert_eq!(
            normalize_email_tokens("send to my g mail dot com", &tables()),
            "send to my gmail.com"
        );
    }

    #[test]
    fn test_missing_dot_before_tld_and_typo() {
        assert_eq!(
            fix_email_spacing("ravi@gmialcom", &tables()),
            "ravi@gmail.com"
        );
        assert_eq!(
            fix_email_spacing("ravi@yahooo.com", &tables()),
            "ravi@yahoo.com"
        );
    }

    #[test]
    fn test_email_like_spans_are_compacted() {
        assert_eq!(
            fix_email_spacing("write to john @ gmail . com today", &tables()),
            "write to john@gmail.com today"
        );
        assert_eq!(
            fix_email_spacing("john..doe@gmail.com", &tables()),
            "john.doe@gmail.com"
        );
    }

    #[test]
    fn test_spacing_fix_leaves_spoken_words() {
        assert_eq!(
            fix_email_spacing("john at gmail dot com", &tables()),
            "john at gmail dot com"
        );
    }

    #[test]
    fn test_plain_text_is_untouched_apart_from_spacing() {
        assert_eq!(
            normalize_email_tokens("see you tomorrow", &tables()),
            "see you tomorrow"
        );
    }
}
