//! Classification prompt.

use lingo_core::Request;

/// Marks the prompt as a classification request.
pub const CLASSIFY_PROMPT_HEADER: &str = "You are the intent classifier of a language assistant.";

/// Longest slice of page text quoted in a prompt
const CONTEXT_PREVIEW_CHARS: usize = 500;

pub fn build_classification_prompt(request: &Request) -> String {
    let mut prompt = String::new();
    prompt.push_str(CLASSIFY_PROMPT_HEADER);
    prompt.push_str(
        r#"
Classify the user's request into exactly one PRIMARY category and zero or more SECONDARY categories.

Categories:
- summarize: condense a page or text. Cues: summarize, summary, overview, brief, tl;dr, key points, gist.
  Parameters: type in {key-points, tldr, teaser, headline}; length in {short, medium, long}.
- translate: render a page or text in another language. Cues: translate, "to/into/in <language>".
  Parameters: source_language and target_language as ISO-639-1 codes (source may be "auto").
- write: compose or rewrite text. Cues: write, draft, compose, rewrite, email, letter, essay, post.
  Parameters: tone, length in {short, medium, long}, format in {plain-text, markdown}.
- research: answer a question or investigate a topic. Cues: what, why, how, explain, compare, find out.

Respond with a single JSON object and nothing else:
{"primary": "<category>", "secondary": ["<category>", ...], "confidence": <0.0-1.0>, "reasoning": "<one sentence>", "craftedPrompt": "<the request rewritten as a clear instruction>"}
"#,
    );

    if let Some(ctx) = &request.context {
        prompt.push_str("\nPage context:\n");
        if let Some(title) = &ctx.title {
            prompt.push_str(&format!("- title: {}\n", title));
        }
        if let Some(url) = &ctx.url {
            prompt.push_str(&format!("- url: {}\n", url));
        }
        if let Some(text) = ctx.text() {
            prompt.push_str(&format!("- preview: {}\n", preview(text)));
        }
    }

    prompt.push_str(&format!("\nUser request: {}\n", request.text.trim()));
    prompt
}

/// First `CONTEXT_PREVIEW_CHARS` characters, on a char boundary
pub fn preview(text: &str) -> &str {
    match text.char_indices().nth(CONTEXT_PREVIEW_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
