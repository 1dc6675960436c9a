//! JSON extraction from prose-wrapped model output.
//!
//! Text-generation providers answer with a JSON object embedded in
//! surrounding text, sometimes inside code fences. The first balanced
//! `{...}` span is located with brace-depth tracking that ignores braces
//! inside string literals.
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::CoordError;

/// Byte range of the first balanced `{...}` span.
pub fn find_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract and decode the first JSON object in `text`.
///
/// A decode failure gets exactly one lenient repair pass before the
/// response is reported as malformed.
pub fn extract_json_object(text: &str) -> Result<Map<String, Value>, CoordError> {
    match decode_first_object(text) {
        Ok(map) => Ok(map),
        Err(first) => {
            let repaired = repair(text);
            decode_first_object(&repaired).map_err(|_| first)
        }
    }
}

/// Extract the first JSON object and deserialize it into `T`.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T, CoordError> {
    let map = extract_json_object(text)?;
    serde_json::from_value(Value::Object(map))
        .map_err(|e| CoordError::MalformedResponse(format!("schema mismatch: {}", e)))
}

fn decode_first_object(text: &str) -> Result<Map<String, Value>, CoordError> {
    let span = find_json_span(text)
        .ok_or_else(|| CoordError::MalformedResponse("no JSON object in response".to_string()))?;
    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CoordError::MalformedResponse("response is not an object".to_string())),
        Err(e) => Err(CoordError::MalformedResponse(format!("invalid JSON: {}", e))),
    }
}

/// Code fences, typographic quotes and trailing commas are the usual damage.
fn repair(text: &str) -> String {
    let unfenced: String = text
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n");

    let requoted = unfenced
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    strip_trailing_commas(&requoted)
}

fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            out.push(c);
            continue;
        }
        if c == '"' {
            in_string = true;
        }
        if c == ',' {
            let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prose_wrapped_object() {
        let text = r#"Sure! Here is the classification:
{"primary": "translate", "confidence": 0.9}
Let me know if you need anything else."#;
        let map = extract_json_object(text).unwrap();
        assert_eq!(map["primary"], "translate");
    }

    #[test]
    fn test_nested_braces() {
        let text = r#"{"a": {"b": {"c": 1}}, "d": 2} trailing {"e": 3}"#;
        let map = extract_json_object(text).unwrap();
        assert_eq!(map["a"]["b"]["c"], 1);
        assert_eq!(map["d"], 2);
        assert!(!map.contains_key("e"));
    }

    #[test]
    fn test_braces_inside_strings() {
        let text = r#"{"reasoning": "user wrote } and { and \"quoted\"", "primary": "write"}"#;
        let map = extract_json_object(text).unwrap();
        assert_eq!(map["primary"], "write");
    }

    #[test]
    fn test_lenient_repair() {
        let text = "```json\n{\u{201C}primary\u{201D}: \"summarize\", \"secondary\": [\"translate\",],}\n```";
        let map = extract_json_object(text).unwrap();
        assert_eq!(map["primary"], "summarize");
        assert_eq!(map["secondary"][0], "translate");
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            extract_json_object("no json here"),
            Err(CoordError::MalformedResponse(_))
        ));
        assert!(extract_json_object("{\"unterminated\": ").is_err());
        assert!(extract_json_object("{not json at all}").is_err());
    }
}
