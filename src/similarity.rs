//! Token-set similarity scoring.
//!
//! [`token_set_score`] compares two strings as sets of lower-cased
//! alphanumeric tokens, so reordered words, repeated words and missing
//! trailing words are penalized far less than by a plain character ratio.
//! "Instituto Nacional" and "Instit. Nacional de Pesquisas" share the token
//! `nacional`, and each side is compared against that shared core before
//! the two full forms are compared with each other.
//!
//! Character ratios are computed from a minimal diff (via `similar`) as
//! `2 * matched / total`, scaled to 0-100.

use std::collections::BTreeSet;

use similar::{Algorithm, DiffOp, capture_diff_slices};

/// A similarity metric returning an integer score in `[0, 100]`.
pub trait Scorer {
    fn score(&self, a: &str, b: &str) -> u8;
}

/// The default scorer: [`token_set_score`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSetScorer;

impl Scorer for TokenSetScorer {
    fn score(&self, a: &str, b: &str) -> u8 {
        token_set_score(a, b)
    }
}

/// Scores two strings by their best token-set alignment.
///
/// Returns 100 when both inputs tokenize to nothing, 0 when only one does.
pub fn token_set_score(a: &str, b: &str) -> u8 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    match (tokens_a.is_empty(), tokens_b.is_empty()) {
        (true, true) => return 100,
        (true, false) | (false, true) => return 0,
        _ => {}
    }

    let shared = tokens_a
        .intersection(&tokens_b)
        .map(String::as_str)
        .collect::<Vec<_>>();
    let only_a = tokens_a
        .difference(&tokens_b)
        .map(String::as_str)
        .collect::<Vec<_>>();
    let only_b = tokens_b
        .difference(&tokens_a)
        .map(String::as_str)
        .collect::<Vec<_>>();

    let intersection = shared.join(" ");
    let combined_a = extend_with(&shared, &only_a);
    let combined_b = extend_with(&shared, &only_b);

    let mut best = ratio(&combined_a, &combined_b);
    if !intersection.is_empty() {
        best = best
            .max(ratio(&intersection, &combined_a))
            .max(ratio(&intersection, &combined_b));
    }
    best
}

/// Character-sequence similarity in `[0, 100]`, rounded half up.
pub fn ratio(a: &str, b: &str) -> u8 {
    let left = a.chars().collect::<Vec<_>>();
    let right = b.chars().collect::<Vec<_>>();
    let total = left.len() + right.len();
    if total == 0 {
        return 100;
    }
    let matched: usize = capture_diff_slices(Algorithm::Myers, &left, &right)
        .iter()
        .map(|op| match op {
            DiffOp::Equal { len, .. } => *len,
            _ => 0,
        })
        .sum();
    // round(100 * 2m / total) without leaving integer arithmetic
    let scaled = (400 * matched + total) / (2 * total);
    scaled.min(100) as u8
}

/// Lower-cases `value`, treats every non-alphanumeric character as a
/// separator, and returns the distinct tokens in lexicographic order.
fn tokenize(value: &str) -> BTreeSet<String> {
    let normalized = value
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    normalized
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn extend_with(shared: &[&str], extra: &[&str]) -> String {
    shared
        .iter()
        .chain(extra.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}
