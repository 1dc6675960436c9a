//! Best-effort payload extraction from natural-language prompts.
//!
//! `summarize "some text"` or `translate to French: some text` carry the
//! text to process inside the instruction. None of these helpers is
//! required to succeed; `extract_payload` falls back to the whole prompt.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref QUOTED: Regex =
        Regex::new(r#""([^"]{2,})"|“([^”]{2,})”|«([^»]{2,})»"#).unwrap();

    static ref AFTER_VERB: Regex = Regex::new(
        r"(?is)\b(?:summari[sz]e|translate|rewrite|rephrase|proofread|condense)\b[^:\n]{0,60}:\s*(.+)$"
    ).unwrap();
}

/// Longest double-quoted segment
pub fn extract_quoted(prompt: &str) -> Option<&str> {
    QUOTED
        .captures_iter(prompt)
        .filter_map(|caps| caps.iter().skip(1).flatten().next())
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .max_by_key(|s| s.chars().count())
}

/// Text after "<verb> ...:" such as "Translate to German: Guten Morgen"
pub fn extract_after_verb(prompt: &str) -> Option<&str> {
    AFTER_VERB
        .captures(prompt)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// Embedded payload, if the prompt carries one explicitly
pub fn explicit_payload(prompt: &str) -> Option<&str> {
    extract_quoted(prompt).or_else(|| extract_after_verb(prompt))
}

/// Embedded payload or the whole (trimmed) prompt
pub fn extract_payload(prompt: &str) -> &str {
    explicit_payload(prompt).unwrap_or_else(|| prompt.trim())
}
