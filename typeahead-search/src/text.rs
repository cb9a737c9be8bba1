//! Text normalisation and tokenisation shared by scoring and highlighting.
//!
//! Queries and documents go through the same [`normalize`] step (Unicode
//! NFKC followed by lower-casing) so that full-width forms, ligatures and
//! case differences compare equal.

use unicode_normalization::UnicodeNormalization;

/// Canonicalise text for comparison: NFKC, then lower-case.
pub fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

/// Split a query on whitespace into normalised tokens.
///
/// Empty pieces are dropped, so a blank query yields no tokens.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(normalize)
        .collect()
}

/// Split document text into normalised words.
///
/// Any run of characters other than ASCII letters, Russian letters and
/// ASCII digits acts as a separator.
pub fn split_words(text: &str) -> Vec<String> {
    normalize(text)
        .split(|c: char| !is_word_char(c))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases() {
        assert_eq!(normalize("Rust PROGRAMMING"), "rust programming");
        assert_eq!(normalize("Фрески Ёлки"), "фрески ёлки");
    }

    #[test]
    fn normalize_applies_compatibility_forms() {
        // Full-width Latin and the "fi" ligature fold to plain ASCII.
        assert_eq!(normalize("ＲＵＳＴ"), "rust");
        assert_eq!(normalize("\u{FB01}le"), "file");
    }

    #[test]
    fn tokenize_splits_on_whitespace() {
        assert_eq!(tokenize("  Hello \t  World\n"), vec!["hello", "world"]);
    }

    #[test]
    fn tokenize_blank_is_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t ").is_empty());
    }

    #[test]
    fn tokenize_keeps_punctuation_inside_tokens() {
        assert_eq!(tokenize("c++ e-mail"), vec!["c++", "e-mail"]);
    }

    #[test]
    fn split_words_breaks_on_punctuation() {
        assert_eq!(
            split_words("Fresco-painting, (1503): Леонардо!"),
            vec!["fresco", "painting", "1503", "леонардо"]
        );
    }

    #[test]
    fn split_words_keeps_yo() {
        assert_eq!(split_words("Ёжик в тумане"), vec!["ёжик", "в", "тумане"]);
    }

    #[test]
    fn split_words_drops_other_scripts_as_separators() {
        // Greek letters are outside the word alphabet.
        assert_eq!(split_words("alpha\u{03B1}beta"), vec!["alpha", "beta"]);
    }

    #[test]
    fn split_words_empty_input() {
        assert!(split_words("").is_empty());
        assert!(split_words("--- !!!").is_empty());
    }
}
