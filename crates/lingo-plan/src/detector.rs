//! Narrow multi-step detector.
//!
//! Recognizes only summarize-then-translate: a summarization cue together
//! with a target language. Everything else is left to the single-step path.

use lazy_static::lazy_static;
use lingo_core::{Capability, ExecutionPlan, ExecutionStep, ExecutionType, Intent, StepInput};
use lingo_in::{language, params};
use regex::Regex;

pub const SUMMARY_OUTPUT: &str = "summary_text";
pub const FINAL_OUTPUT: &str = "final_result";

lazy_static! {
    static ref SUMMARY_CUE: Regex = Regex::new(
        r"\b(summar(y|ies|i[sz]e|i[sz]ing)|overview|brief|tl;?dr|recap|gist|rundown|key points|main points|highlights|sum up|condense)\b"
    ).unwrap();

    static ref SEQUENCE_CUE: Regex = Regex::new(
        r"\b(then|after that|afterwards|followed by|and also|as well as)\b"
    ).unwrap();
}

/// Whether normalized text carries a summarization cue word
pub fn has_summary_cue(normalized: &str) -> bool {
    SUMMARY_CUE.is_match(normalized)
}

/// Whether planning is worth attempting for this request
pub fn needs_planning(intent: &Intent, normalized: &str) -> bool {
    !intent.secondary.is_empty()
        || SEQUENCE_CUE.is_match(normalized)
        || (has_summary_cue(normalized) && language::find_target_language(normalized).is_some())
}

/// Two-step summarize→translate plan, if the request asks for one
pub fn detect_summarize_translate(normalized: &str) -> Option<ExecutionPlan> {
    if !has_summary_cue(normalized) {
        return None;
    }
    let target = language::find_target_language(normalized)?;
    let summary = params::summarize_params(normalized);

    Some(ExecutionPlan {
        execution_type: ExecutionType::Sequential,
        steps: vec![
            ExecutionStep::new(1, Capability::SummarizePage, StepInput::CurrentPage)
                .output(SUMMARY_OUTPUT)
                .param("type", summary.kind.as_str())
                .param("length", summary.length.as_str()),
            ExecutionStep::new(
                2,
                Capability::TranslateText,
                StepInput::Output(SUMMARY_OUTPUT.to_string()),
            )
            .output(FINAL_OUTPUT)
            .param("source_language", "auto")
            .param("target_language", target),
        ],
        final_output_language: Some(target.to_string()),
        reasoning: format!(
            "Summarization cue with target language {}",
            language::name_for(target).unwrap_or(target)
        ),
    })
}
