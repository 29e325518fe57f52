//! Text matching for message filters

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("word separator pattern is valid"));

/// Lower-case the text and collapse every run of non-alphanumeric
/// characters into a single space.
pub fn normalize_words(text: &str) -> String {
    let lowered = text.to_lowercase();
    NON_ALNUM_RUN.replace_all(&lowered, " ").trim().to_string()
}

/// Wrap normalized text in single spaces so that word boundaries become
/// plain substring boundaries.
fn pad(normalized: &str) -> String {
    format!(" {} ", normalized)
}

/// Case-insensitive raw substring match
pub fn contains_substring(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Whole-word match: `needle` must be normalized already and non-empty.
/// Multi-word needles match only as a contiguous run of whole words.
pub fn contains_words(haystack: &str, needle: &str) -> bool {
    pad(&normalize_words(haystack)).contains(&pad(needle))
}
