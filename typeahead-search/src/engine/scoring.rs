//! Field-weighted relevance scoring with optional fuzzy token matching.
//!
//! Each query token contributes at most once, checked in this order:
//!
//! 1. exact substring of the normalised title: `+W_TITLE`
//! 2. exact substring of the normalised snippet: `+W_SNIPPET`
//! 3. fuzzy (only when enabled and the token has 3+ chars): the best
//!    edit-distance similarity against title words, then snippet words,
//!    weighted by the field and accepted at [`FUZZY_THRESHOLD`] or above.
//!
//! A document scoring `0.0` did not match and is excluded from results.

use crate::text::{normalize, split_words};
use crate::types::Document;

/// Weight of a title hit.
pub const W_TITLE: f64 = 4.0;

/// Weight of a snippet hit.
pub const W_SNIPPET: f64 = 1.0;

/// Minimum similarity for a fuzzy hit to count.
pub const FUZZY_THRESHOLD: f64 = 0.72;

/// Shortest token (in chars) eligible for fuzzy matching.
pub const MIN_FUZZY_TOKEN_LEN: usize = 3;

/// Lower bound of the Levenshtein early-exit distance.
const MIN_DISTANCE_BOUND: usize = 5;

/// Score one document against already-normalised query tokens.
pub fn score(tokens: &[String], document: &Document, fuzzy: bool) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }

    let title = normalize(&document.title);
    let snippet = normalize(&document.snippet);
    // Word lists are only needed for fuzzy fallback; split lazily.
    let mut words: Option<(Vec<String>, Vec<String>)> = None;

    let mut total = 0.0;
    for token in tokens {
        if title.contains(token.as_str()) {
            total += W_TITLE;
            continue;
        }
        if snippet.contains(token.as_str()) {
            total += W_SNIPPET;
            continue;
        }
        if !fuzzy || token.chars().count() < MIN_FUZZY_TOKEN_LEN {
            continue;
        }

        let (title_words, snippet_words) = words.get_or_insert_with(|| {
            (split_words(&document.title), split_words(&document.snippet))
        });
        let best_title = best_similarity(token, title_words);
        let best_snippet = best_similarity(token, snippet_words);

        if best_title >= FUZZY_THRESHOLD {
            total += W_TITLE * best_title;
        } else if best_snippet >= FUZZY_THRESHOLD {
            total += W_SNIPPET * best_snippet;
        }
    }
    total
}

/// Highest similarity between `token` and any of `words`.
fn best_similarity(token: &str, words: &[String]) -> f64 {
    let mut best = 0.0_f64;
    for word in words {
        best = best.max(similarity(token, word));
        if best >= 1.0 {
            break;
        }
    }
    best
}

/// Normalised edit-distance similarity in `[0, 1]`.
///
/// `1 - distance / max(len a, len b)`, clamped at zero. Lengths are in chars.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    let bound = MIN_DISTANCE_BOUND.max(longest.div_ceil(2));
    let distance = bounded_levenshtein(&a, &b, bound);
    let denom = longest.max(1) as f64;
    (1.0 - distance as f64 / denom).max(0.0)
}

/// Levenshtein distance with an early exit.
///
/// Returns `max_distance + 1` as a "too far" sentinel (not an exact
/// distance) once the length gap or the minimum of a DP row exceeds
/// `max_distance`.
pub fn bounded_levenshtein(a: &[char], b: &[char], max_distance: usize) -> usize {
    if a == b {
        return 0;
    }
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    if a.len().abs_diff(b.len()) > max_distance {
        return max_distance + 1;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
            row_min = row_min.min(curr[j + 1]);
        }
        if row_min > max_distance {
            return max_distance + 1;
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
