//! Language-name extraction for translation parameters.
//!
//! Maps English and native language names to ISO-639-1 codes and finds
//! the target ("to/into/in <language>") and source ("from <language>")
//! of a translation request.

use lazy_static::lazy_static;
use regex::Regex;

/// (name, code). Native spellings sit next to the English name.
const LANGUAGES: &[(&str, &str)] = &[
    ("english", "en"),
    ("spanish", "es"),
    ("español", "es"),
    ("espanol", "es"),
    ("castilian", "es"),
    ("french", "fr"),
    ("français", "fr"),
    ("francais", "fr"),
    ("german", "de"),
    ("deutsch", "de"),
    ("italian", "it"),
    ("italiano", "it"),
    ("portuguese", "pt"),
    ("português", "pt"),
    ("portugues", "pt"),
    ("dutch", "nl"),
    ("nederlands", "nl"),
    ("russian", "ru"),
    ("chinese", "zh"),
    ("mandarin", "zh"),
    ("japanese", "ja"),
    ("korean", "ko"),
    ("arabic", "ar"),
    ("hindi", "hi"),
    ("bengali", "bn"),
    ("turkish", "tr"),
    ("polish", "pl"),
    ("swedish", "sv"),
    ("norwegian", "no"),
    ("danish", "da"),
    ("finnish", "fi"),
    ("greek", "el"),
    ("hebrew", "he"),
    ("ukrainian", "uk"),
    ("czech", "cs"),
    ("vietnamese", "vi"),
    ("thai", "th"),
    ("indonesian", "id"),
];

lazy_static! {
    /// Non-capturing alternation of every language name, longest first
    pub static ref LANGUAGE_ALTERNATION: String = {
        let mut names: Vec<&str> = LANGUAGES.iter().map(|(name, _)| *name).collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let escaped: Vec<String> = names.iter().map(|n| regex::escape(n)).collect();
        format!("(?:{})", escaped.join("|"))
    };

    static ref TO_LANGUAGE: Regex = Regex::new(
        &format!(r"(?i)\b(?:to|into)\s+({})\b", LANGUAGE_ALTERNATION.as_str())
    ).unwrap();

    static ref IN_LANGUAGE: Regex = Regex::new(
        &format!(r"(?i)\bin\s+({})\b", LANGUAGE_ALTERNATION.as_str())
    ).unwrap();

    static ref FROM_LANGUAGE: Regex = Regex::new(
        &format!(r"(?i)\bfrom\s+({})\b", LANGUAGE_ALTERNATION.as_str())
    ).unwrap();

    static ref ANY_LANGUAGE: Regex = Regex::new(
        &format!(r"(?i)\b({})\b", LANGUAGE_ALTERNATION.as_str())
    ).unwrap();
}

/// ISO-639-1 code for a language name
pub fn code_for(name: &str) -> Option<&'static str> {
    let name = name.trim().to_lowercase();
    LANGUAGES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, code)| *code)
}

/// English display name for a code
pub fn name_for(code: &str) -> Option<&'static str> {
    let code = code.trim().to_lowercase();
    LANGUAGES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
}

/// Whether `code` is a known ISO-639-1 code
pub fn is_known_code(code: &str) -> bool {
    name_for(code).is_some()
}

/// Target language: "to/into <lang>" wins over "in <lang>"
pub fn find_target_language(text: &str) -> Option<&'static str> {
    TO_LANGUAGE
        .captures(text)
        .or_else(|| IN_LANGUAGE.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| code_for(m.as_str()))
}

/// Source language from "from <lang>"
pub fn find_source_language(text: &str) -> Option<&'static str> {
    FROM_LANGUAGE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| code_for(m.as_str()))
}

/// Every language mentioned anywhere in the text, in order of appearance
pub fn mentioned_languages(text: &str) -> Vec<&'static str> {
    let mut codes = Vec::new();
    for m in ANY_LANGUAGE.find_iter(text) {
        if let Some(code) = code_for(m.as_str()) {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_lookup() {
        assert_eq!(code_for("German"), Some("de"));
        assert_eq!(code_for("Deutsch"), Some("de"));
        assert_eq!(code_for("Klingon"), None);
        assert_eq!(name_for("ja"), Some("japanese"));
        assert!(is_known_code("pt"));
        assert!(!is_known_code("xx"));
    }

    #[test]
    fn test_target_language() {
        assert_eq!(find_target_language("give me a brief overview in german"), Some("de"));
        assert_eq!(find_target_language("translate this to Spanish"), Some("es"));
        assert_eq!(find_target_language("put it into français please"), Some("fr"));
        assert_eq!(
            find_target_language("the article in english, translate it to japanese"),
            Some("ja")
        );
        assert_eq!(find_target_language("summarize the german article"), None);
    }

    #[test]
    fn test_source_language() {
        assert_eq!(find_source_language("translate from italian to english"), Some("it"));
        assert_eq!(find_source_language("translate to english"), None);
    }

    #[test]
    fn test_mentions() {
        assert_eq!(mentioned_languages("german or french, not german"), vec!["de", "fr"]);
        assert!(mentioned_languages("a germane point").is_empty());
    }
}
