//! Result Formatter
//!
//! Reduces step results to one answer:
//! - single: the primary (or first successful) result
//! - sequential: the last successful result, plus the agent chain when
//!   more than one step contributed
//! - parallel: every successful result under its heading
//!
//! With no successful step the answer explains what went wrong instead
//! of being empty.

use lingo_core::{Agent, CoordError, CoordinationResult, ExecutionType, StepResult, StepRole};
use serde_json::json;
use tracing::warn;

use crate::renderer::TemplateRenderer;
use crate::templates::TemplatesFile;

pub struct ResultFormatter {
    renderer: TemplateRenderer,
}

/// Heading used for an agent's section in parallel answers
pub fn agent_heading(agent: Agent) -> &'static str {
    match agent {
        Agent::Summarizer => "Summary",
        Agent::Translator => "Translation",
        Agent::Writer => "Writing",
        Agent::ResearchProvider => "Research",
    }
}

impl ResultFormatter {
    pub fn new(renderer: TemplateRenderer) -> Self {
        Self { renderer }
    }

    /// Formatter over the embedded templates
    pub fn builtin() -> Result<Self, CoordError> {
        Ok(Self::new(TemplateRenderer::new(&TemplatesFile::builtin())?))
    }

    pub fn format(&self, result: &CoordinationResult) -> String {
        let successes: Vec<&StepResult> = result.results.iter().filter(|r| r.success).collect();
        if successes.is_empty() {
            return self.failure(&result.results);
        }

        match result.execution_type {
            ExecutionType::Single => single_answer(&successes).to_string(),
            ExecutionType::Sequential => self.sequential(&successes),
            ExecutionType::Parallel => self.parallel(&successes),
        }
    }

    fn sequential(&self, successes: &[&StepResult]) -> String {
        let answer = successes
            .last()
            .and_then(|r| r.text())
            .unwrap_or_default();
        let chain = if successes.len() > 1 {
            successes
                .iter()
                .map(|r| r.agent.as_str())
                .collect::<Vec<_>>()
                .join(" → ")
        } else {
            String::new()
        };

        self.renderer
            .render("sequential", &json!({ "answer": answer, "chain": chain }))
            .unwrap_or_else(|e| {
                warn!(error = %e, "sequential template failed");
                answer.to_string()
            })
    }

    fn parallel(&self, successes: &[&StepResult]) -> String {
        let sections: Vec<_> = successes
            .iter()
            .map(|r| {
                json!({
                    "heading": agent_heading(r.agent),
                    "agent": r.agent.as_str(),
                    "text": r.text().unwrap_or_default(),
                })
            })
            .collect();

        self.renderer
            .render(
                "parallel",
                &json!({ "sections": sections, "count": successes.len() }),
            )
            .unwrap_or_else(|e| {
                warn!(error = %e, "parallel template failed");
                successes
                    .iter()
                    .filter_map(|r| r.text())
                    .collect::<Vec<_>>()
                    .join("\n\n---\n\n")
            })
    }

    fn failure(&self, results: &[StepResult]) -> String {
        let mut hints: Vec<&str> = Vec::new();
        let errors: Vec<_> = results
            .iter()
            .filter_map(|r| {
                let error = r.error.as_deref()?;
                let (message, hint) = split_hint(error);
                if let Some(hint) = hint {
                    if !hints.contains(&hint) {
                        hints.push(hint);
                    }
                }
                Some(json!({ "heading": agent_heading(r.agent), "message": message }))
            })
            .collect();

        self.renderer
            .render("failure", &json!({ "errors": errors, "hints": hints }))
            .unwrap_or_else(|e| {
                warn!(error = %e, "failure template failed");
                "I couldn't complete this request. Please try again.".to_string()
            })
    }
}

fn single_answer<'a>(successes: &[&'a StepResult]) -> &'a str {
    successes
        .iter()
        .find(|r| r.role == StepRole::Primary)
        .or_else(|| successes.first())
        .and_then(|r| r.text())
        .unwrap_or_default()
}

/// Separate "(hint: ...)" from an unavailable-provider error message
fn split_hint(error: &str) -> (&str, Option<&str>) {
    match error.rsplit_once(" (hint: ") {
        Some((message, rest)) => (message, Some(rest.trim_end_matches(')'))),
        None => (error, None),
    }
}
