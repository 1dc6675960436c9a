//! Text normalization for request classification.
//!
//! - Lowercase conversion
//! - Typographic apostrophe folding
//! - Expansion of contractions
//! - Whitespace normalization
//! - Trailing punctuation removal

use lazy_static::lazy_static;
use lingo_core::CoordError;
use regex::{Captures, Regex};

lazy_static! {
    /// Contractions that hide cue words ("what's" -> "what is")
    static ref CONTRACTIONS: Vec<(&'static str, &'static str)> = vec![
        ("what's", "what is"),
        ("who's", "who is"),
        ("how's", "how is"),
        ("where's", "where is"),
        ("that's", "that is"),
        ("it's", "it is"),
        ("let's", "let us"),
        ("can't", "cannot"),
        ("won't", "will not"),
        ("don't", "do not"),
        ("doesn't", "does not"),
        ("isn't", "is not"),
        ("i'm", "i am"),
        ("i'd", "i would"),
        ("i'll", "i will"),
        ("you're", "you are"),
    ];

    /// Whole-word match of any contraction, so "bit's" stays intact
    static ref CONTRACTION: Regex = {
        let words: Vec<String> = CONTRACTIONS.iter().map(|(c, _)| regex::escape(c)).collect();
        Regex::new(&format!(r"\b(?:{})\b", words.join("|"))).unwrap()
    };

    static ref MULTI_SPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Normalize text for pattern matching
pub fn normalize(text: &str) -> String {
    let mut result = text
        .trim()
        .to_lowercase()
        .replace(['\u{2018}', '\u{2019}'], "'");

    result = CONTRACTION
        .replace_all(&result, |caps: &Captures| {
            let word = &caps[0];
            CONTRACTIONS
                .iter()
                .find(|(c, _)| *c == word)
                .map_or(word, |(_, expansion)| *expansion)
                .to_string()
        })
        .to_string();

    result = MULTI_SPACE.replace_all(&result, " ").to_string();

    while result.ends_with(['.', '?', '!']) {
        result.pop();
    }

    result.trim_end().to_string()
}

/// Reject requests that carry no text before any provider is involved.
pub fn validate_request(text: &str) -> Result<&str, CoordError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoordError::InvalidRequest("empty request".to_string()));
    }
    if !trimmed.chars().any(char::is_alphanumeric) {
        return Err(CoordError::InvalidRequest(
            "request contains no text".to_string(),
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_normalization() {
        assert_eq!(normalize("  Translate THIS  to   Spanish! "), "translate this to spanish");
        assert_eq!(normalize("What is Rust???"), "what is rust");
    }

    #[test]
    fn test_contraction_expansion() {
        assert_eq!(normalize("What's this page about?"), "what is this page about");
        assert_eq!(normalize("Let\u{2019}s write a poem"), "let us write a poem");
    }

    #[test]
    fn test_contractions_only_match_whole_words() {
        assert_eq!(normalize("That bit's odd"), "that bit's odd");
        assert_eq!(normalize("Summarize Kit's notes, it's long"), "summarize kit's notes, it is long");
        assert_eq!(normalize("The taxi'd left"), "the taxi'd left");
    }

    #[test]
    fn test_validate_request() {
        assert!(matches!(validate_request(""), Err(CoordError::InvalidRequest(_))));
        assert!(matches!(validate_request("   \n"), Err(CoordError::InvalidRequest(_))));
        assert!(matches!(validate_request("?!..."), Err(CoordError::InvalidRequest(_))));
        assert_eq!(validate_request("  hi ").unwrap(), "hi");
    }
}
