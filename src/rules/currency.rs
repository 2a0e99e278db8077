//! Rupee amounts: symbol normalization and Indian digit grouping.

use crate::rules::compile;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Indian rupee sign.
pub const RUPEE: char = '₹';

static RS_WORD: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\brs\s+"));
static RUPEES_WORD: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\brupees\s+"));
static RUPEE_AMOUNT: LazyLock<Regex> = LazyLock::new(|| compile(r"₹\s*[0-9][0-9,.]*"));

/// Group digits the Indian way: the last three together, then pairs.
///
/// Non-digit characters are discarded first, so "12,3456.7" is treated as
/// "1234567". Inputs of three digits or fewer are returned as-is.
pub fn indian_grouping(number: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.len() <= 3 {
        return digits;
    }

    let (rest, last3) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = rest.len();
    while end > 2 {
        groups.push(&rest[end - 2..end]);
        end -= 2;
    }
    if end > 0 {
        groups.push(&rest[..end]);
    }
    groups.reverse();
    groups.push(last3);
    groups.join(",")
}

/// Turn "rs"/"rupees" into "₹" and regroup every rupee amount.
pub fn normalize_currency(text: &str) -> String {
    let s = RS_WORD.replace_all(text, "₹");
    let s = RUPEES_WORD.replace_all(&s, "₹");
    RUPEE_AMOUNT
        .replace_all(&s, |caps: &Captures| {
            let raw = &caps[0];
            if raw.chars().any(|c| c.is_ascii_digit()) {
                format!("{RUPEE}{}", indian_grouping(raw))
            } else {
                raw.to_string()
            }
        })
        .into_owned()
}
