//! Text normalization applied to every retrieved page before it leaves the
//! pipeline.
//!
//! The steps run in a fixed order:
//! 1. NFKC (compatibility) normalization
//! 2. whitespace runs collapse to a single space, ends trimmed
//! 3. characters in the Unicode "Symbol, other" category (emoji, pictographs)
//!    are removed
//! 4. the text is cut to the first `word_limit` whitespace-delimited words
//!
//! No ellipsis is added when text is cut.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static OTHER_SYMBOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{So}").expect("static pattern \\p{So} is valid"));

/// Normalize `text` and keep at most `word_limit` words.
pub fn normalize(text: &str, word_limit: usize) -> String {
    let composed: String = text.nfkc().collect();
    let collapsed = collapse_whitespace(&composed);
    let stripped = OTHER_SYMBOL.replace_all(&collapsed, "");
    // Removing a symbol can leave a combining mark next to a new base character.
    let recomposed: String = stripped.nfkc().collect();
    truncate_words(&recomposed, word_limit)
}

/// Collapse every whitespace run to one space and trim both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep the first `limit` whitespace-delimited words, joined by single spaces.
pub fn truncate_words(text: &str, limit: usize) -> String {
    text.split_whitespace()
        .take(limit)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
