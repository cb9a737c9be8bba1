//! Query-term highlighting for presentation.
//!
//! Marks every case-insensitive occurrence of each distinct query token.
//! Longer tokens claim text first; a shorter token never re-wraps a span
//! already claimed, and matching runs over the source text, never over
//! inserted markers. Has no bearing on ranking.

use std::collections::BTreeSet;

use crate::text::tokenize;

/// Default opening marker.
pub const MARK_OPEN: &str = "<mark>";

/// Default closing marker.
pub const MARK_CLOSE: &str = "</mark>";

/// Wrap query-token occurrences in `text` with `<mark>` tags.
pub fn highlight(text: &str, query: &str) -> String {
    highlight_with(text, query, MARK_OPEN, MARK_CLOSE)
}

/// Wrap query-token occurrences in `text` with custom markers.
pub fn highlight_with(text: &str, query: &str, open: &str, close: &str) -> String {
    let mut tokens: Vec<Vec<char>> = tokenize(query)
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|t| t.chars().collect())
        .collect();
    if tokens.is_empty() {
        return text.to_string();
    }
    // Stable sort keeps the BTreeSet order among equal lengths.
    tokens.sort_by(|a, b| b.len().cmp(&a.len()));

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut claimed = vec![false; chars.len()];
    let mut spans: Vec<(usize, usize)> = Vec::new();

    for token in &tokens {
        let len = token.len();
        if len == 0 || len > chars.len() {
            continue;
        }
        let mut i = 0;
        while i + len <= chars.len() {
            let window = &chars[i..i + len];
            let free = !claimed[i..i + len].iter().any(|&c| c);
            if free && window.iter().zip(token).all(|(&(_, s), &t)| chars_eq(s, t)) {
                claimed[i..i + len].iter_mut().for_each(|c| *c = true);
                spans.push((i, i + len));
                i += len;
            } else {
                i += 1;
            }
        }
    }

    if spans.is_empty() {
        return text.to_string();
    }
    spans.sort_unstable();

    let byte_at = |char_idx: usize| chars.get(char_idx).map_or(text.len(), |&(b, _)| b);
    let mut out = String::with_capacity(text.len() + spans.len() * (open.len() + close.len()));
    let mut cursor = 0;
    for (start, end) in spans {
        let (start, end) = (byte_at(start), byte_at(end));
        out.push_str(&text[cursor..start]);
        out.push_str(open);
        out.push_str(&text[start..end]);
        out.push_str(close);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

fn chars_eq(source: char, token: char) -> bool {
    source == token || source.to_lowercase().eq(token.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_case_insensitive_matches() {
        assert_eq!(
            highlight("Rust and rust", "RUST"),
            "<mark>Rust</mark> and <mark>rust</mark>"
        );
    }

    #[test]
    fn empty_query_returns_source() {
        assert_eq!(highlight("Rust", "   "), "Rust");
    }

    #[test]
    fn no_match_returns_source() {
        assert_eq!(highlight("Rust", "python"), "Rust");
    }

    #[test]
    fn longer_token_wins_overlap() {
        assert_eq!(
            highlight("programming", "gram programming"),
            "<mark>programming</mark>"
        );
    }

    #[test]
    fn short_token_does_not_match_markers() {
        // "mark" must not match inside the inserted <mark> tags.
        assert_eq!(
            highlight("marker rust", "rust mark"),
            "<mark>mark</mark>er <mark>rust</mark>"
        );
    }

    #[test]
    fn duplicate_tokens_wrap_once() {
        assert_eq!(highlight("rust", "rust rust"), "<mark>rust</mark>");
    }

    #[test]
    fn cyrillic_highlight() {
        assert_eq!(
            highlight("Фрески Рафаэля", "фрески"),
            "<mark>Фрески</mark> Рафаэля"
        );
    }

    #[test]
    fn custom_markers() {
        assert_eq!(highlight_with("a rust b", "rust", "[", "]"), "a [rust] b");
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert_eq!(highlight("use c++ daily", "c++"), "use <mark>c++</mark> daily");
    }
}
