//! Plan normalization and validation.
//!
//! Plans from the model are untrusted. They are normalized first (steps
//! ordered, language names mapped to codes) and then checked against the
//! topology rules; any violation rejects the whole plan.

use lingo_core::{CoordError, ExecutionPlan, ExecutionType, StepInput};
use lingo_in::language;
use serde_json::Value;
use std::collections::HashSet;

const LANGUAGE_PARAMS: [&str; 2] = ["source_language", "target_language"];

/// Order steps by number and canonicalize language parameters.
pub fn normalize_plan(mut plan: ExecutionPlan) -> ExecutionPlan {
    plan.steps.sort_by_key(|s| s.step);

    for step in &mut plan.steps {
        for key in LANGUAGE_PARAMS {
            if let Some(Value::String(value)) = step.params.get_mut(key) {
                if let Some(code) = canonical_language(value) {
                    *value = code;
                }
            }
        }
    }

    plan.final_output_language = plan
        .final_output_language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| canonical_language(l).unwrap_or_else(|| l.to_lowercase()));

    // a translate step without a target inherits the plan's output language
    if let Some(final_language) = plan.final_output_language.clone() {
        for step in &mut plan.steps {
            if step.capability.agent() == lingo_core::Agent::Translator
                && !step.params.contains_key("target_language")
            {
                step.params
                    .insert("target_language".to_string(), Value::String(final_language.clone()));
            }
        }
    }

    plan
}

fn canonical_language(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("auto") {
        return Some("auto".to_string());
    }
    let lower = trimmed.to_lowercase();
    if language::is_known_code(&lower) {
        return Some(lower);
    }
    language::code_for(trimmed).map(str::to_string)
}

/// Check topology rules on a normalized plan.
pub fn validate_plan(plan: &ExecutionPlan) -> Result<(), CoordError> {
    if plan.steps.is_empty() {
        return Err(CoordError::InvalidPlan("plan has no steps".to_string()));
    }

    if plan.execution_type == ExecutionType::Single && plan.steps.len() != 1 {
        return Err(CoordError::InvalidPlan(format!(
            "single plan must have exactly one step, found {}",
            plan.steps.len()
        )));
    }

    let mut produced: HashSet<&str> = HashSet::new();
    let mut previous: Option<u32> = None;

    for (index, step) in plan.steps.iter().enumerate() {
        let expected = index as u32 + 1;
        if plan.execution_type == ExecutionType::Sequential && step.step != expected {
            return Err(CoordError::InvalidPlan(format!(
                "sequential steps must be numbered 1..{}, found {} at position {}",
                plan.steps.len(),
                step.step,
                expected
            )));
        }
        if let Some(prev) = previous {
            if step.step <= prev {
                return Err(CoordError::InvalidPlan(format!(
                    "step numbers must be strictly increasing ({} after {})",
                    step.step, prev
                )));
            }
        }
        previous = Some(step.step);

        match (&step.input, plan.execution_type) {
            (StepInput::CurrentPage | StepInput::UserMessage, _) => {}
            (StepInput::Output(key), ExecutionType::Parallel) => {
                return Err(CoordError::InvalidPlan(format!(
                    "parallel step {} reads `{}`; parallel steps may only read current_page or user_message",
                    step.step, key
                )));
            }
            (StepInput::Output(key), _) => {
                if !produced.contains(key.as_str()) {
                    return Err(CoordError::InvalidPlan(format!(
                        "step {} reads `{}`, which no earlier step produces",
                        step.step, key
                    )));
                }
            }
        }

        if let Some(output) = step.output.as_deref() {
            if matches!(StepInput::from(output.to_string()), StepInput::CurrentPage | StepInput::UserMessage) {
                return Err(CoordError::InvalidPlan(format!(
                    "step {} writes to reserved name `{}`",
                    step.step, output
                )));
            }
            if !produced.insert(output) {
                return Err(CoordError::InvalidPlan(format!(
                    "output `{}` is produced twice",
                    output
                )));
            }
        }
    }

    Ok(())
}
