// src/similarity.rs
//! Fuzzy similarity used for subject/object matching.
//!
//! Policy:
//! - both inputs are trimmed and lowercased (case-insensitive), nothing else is normalized;
//! - score = `strsim::normalized_levenshtein` in `0.0..=1.0`;
//! - two blank strings are identical (`1.0`); blank vs non-blank scores `0.0`.

use strsim::normalized_levenshtein;

/// Score returned when both inputs are blank after trimming.
pub const BLANK_PAIR_SIMILARITY: f64 = 1.0;

/// Symmetric, case-insensitive similarity of two short strings.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() && b.is_empty() {
        return BLANK_PAIR_SIMILARITY;
    }
    normalized_levenshtein(&a, &b)
}

/// Best score of `needle` against any of `haystack`; `None` when `haystack` is empty.
pub fn best_similarity<S: AsRef<str>>(haystack: &[S], needle: &str) -> Option<f64> {
    haystack
        .iter()
        .map(|s| similarity(s.as_ref(), needle))
        .fold(None, |best, s| match best {
            Some(b) if b >= s => Some(b),
            _ => Some(s),
        })
}
