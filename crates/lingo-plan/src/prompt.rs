//! Planning prompt.

use lingo_core::{Capability, Request};
use lingo_in::prompt::preview;

pub const PLAN_PROMPT_HEADER: &str = "You are the task planner of a language assistant.";

pub fn build_planning_prompt(request: &Request) -> String {
    let mut prompt = String::new();
    prompt.push_str(PLAN_PROMPT_HEADER);
    prompt.push_str(
        "\nDecide whether the request needs more than one capability, and if so, plan the steps.\n\nAvailable agents and actions:\n",
    );
    for capability in Capability::ALL {
        prompt.push_str(&format!(
            "- agent \"{}\", action \"{}\"\n",
            capability.agent(),
            capability.action()
        ));
    }

    prompt.push_str(
        r#"
Canonical multi-step patterns:
- "brief overview in <language>" => summarizer.summarize_page, then translator.translate_text into <language>
- "summarize this and translate it to <language>" => summarizer.summarize_page, then translator.translate_text
- "research X and write about it" => research-provider.research_query, then writer.write_content
- "summarize the page and also draft a reply" => summarizer.summarize_page and writer.write_content in parallel

Rules:
- executionType is "single", "sequential" or "parallel".
- Number steps from 1. A step's input is "current_page", "user_message", or the output name of an EARLIER step.
- Parallel steps may only read "current_page" or "user_message".
- Language parameters are ISO-639-1 codes (source_language may be "auto").
- If one capability is enough, set isMultiStep to false and leave executionPlan empty.

Respond with a single JSON object and nothing else:
{"primary": "<summarize|translate|write|research>", "secondary": ["<category>", ...], "isMultiStep": <true|false>,
 "executionType": "<single|sequential|parallel>",
 "executionPlan": [{"step": 1, "agent": "<agent>", "action": "<action>", "input": "<source>", "output": "<name>", "params": {}}],
 "finalOutputLanguage": "<code or null>", "reasoning": "<one sentence>", "confidence": <0.0-1.0>}
"#,
    );

    if let Some(ctx) = &request.context {
        prompt.push_str("\nPage context:\n");
        if let Some(title) = &ctx.title {
            prompt.push_str(&format!("- title: {}\n", title));
        }
        if let Some(text) = ctx.text() {
            prompt.push_str(&format!("- preview: {}\n", preview(text)));
        }
    }

    prompt.push_str(&format!("\nUser request: {}\n", request.text.trim()));
    prompt
}
