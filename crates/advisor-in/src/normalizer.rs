//! Text normalization shared by the analyzer and the context ranker.
//!
//! - Lowercase conversion
//! - Whitespace normalization
//! - Whitespace tokenization into word sets

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    /// Multiple whitespace pattern
    static ref MULTI_SPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Lowercase, trim and collapse runs of whitespace
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    MULTI_SPACE.replace_all(lowered.trim(), " ").to_string()
}

/// Number of whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Distinct lowercased whitespace-separated words
pub fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}
