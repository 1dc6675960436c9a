//! Plan Executor
//!
//! Sequential plans run as a strict await chain with an intermediate
//! result store private to the call; the first failing step stops the
//! chain. Parallel plans run every step concurrently and wait for all of
//! them, so one failure never cancels its siblings.

use futures::future::join_all;
use lingo_core::{
    CallContext, Capability, Category, CoordinationResult, ExecutionPlan, ExecutionStep,
    ExecutionType, Intent, Phase, ProcessingStats, Request, StepInput, StepResult, StepRole,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::dispatcher::{CapabilityDispatcher, Payload};
use crate::extract::explicit_payload;

/// Outputs of completed steps, keyed by output name
pub type IntermediateResultStore = HashMap<String, String>;

pub struct PlanExecutor {
    dispatcher: Arc<CapabilityDispatcher>,
}

impl PlanExecutor {
    pub fn new(dispatcher: Arc<CapabilityDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn execute(
        &self,
        plan: &ExecutionPlan,
        request: &Request,
        intent: &Intent,
        ctx: &CallContext,
    ) -> CoordinationResult {
        let results = match plan.execution_type {
            ExecutionType::Parallel => self.run_parallel(plan, request, ctx).await,
            ExecutionType::Sequential | ExecutionType::Single => {
                self.run_sequential(plan, request, ctx).await
            }
        };

        let stats = ProcessingStats::from_results(&results);
        info!(
            execution_type = plan.execution_type.as_str(),
            total = stats.total,
            succeeded = stats.succeeded,
            "plan executed"
        );

        CoordinationResult {
            trace_id: ctx.trace_id.clone(),
            intent: intent.clone(),
            plan: Some(plan.clone()),
            success: stats.succeeded > 0,
            degraded: false,
            execution_type: plan.execution_type,
            processing_stats: stats,
            results,
            started_at: ctx.started_at,
            elapsed_ms: ctx.elapsed_ms(),
        }
    }

    async fn run_sequential(
        &self,
        plan: &ExecutionPlan,
        request: &Request,
        ctx: &CallContext,
    ) -> Vec<StepResult> {
        let mut store = IntermediateResultStore::new();
        let mut results = Vec::with_capacity(plan.steps.len());
        let last = plan.steps.len().saturating_sub(1);

        for (index, step) in plan.steps.iter().enumerate() {
            let input = resolve_input(&step.input, request, Some(&store));
            let mut result = execute_step(&self.dispatcher, step, input, request, ctx).await;

            if !result.success {
                warn!(step = step.step, error = ?result.error, "step failed, aborting chain");
                results.push(result);
                break;
            }

            if let (Some(key), Some(text)) = (&step.output, &result.result) {
                store.insert(key.clone(), text.clone());
            }
            result.role = if index == last {
                StepRole::Primary
            } else {
                StepRole::Intermediate
            };
            results.push(result);
        }

        results
    }

    async fn run_parallel(
        &self,
        plan: &ExecutionPlan,
        request: &Request,
        ctx: &CallContext,
    ) -> Vec<StepResult> {
        let branches = plan.steps.iter().map(|step| {
            let input = resolve_input(&step.input, request, None);
            execute_step(&self.dispatcher, step, input, request, ctx)
        });

        let mut results = join_all(branches).await;
        for (index, result) in results.iter_mut().enumerate() {
            result.role = match (result.success, index) {
                (false, _) => StepRole::Failed,
                (true, 0) => StepRole::Primary,
                (true, _) => StepRole::Secondary,
            };
        }
        results
    }
}

/// Run one step against already-resolved input.
pub async fn execute_step(
    dispatcher: &CapabilityDispatcher,
    step: &ExecutionStep,
    input: Payload<'_>,
    request: &Request,
    ctx: &CallContext,
) -> StepResult {
    let agent = step.agent();
    ctx.emit(Phase::Executing {
        step: step.step,
        agent,
    });

    let started = Instant::now();
    let outcome = dispatcher
        .dispatch(step.capability, input, &step.params, request)
        .await;
    let latency_ms = started.elapsed().as_millis() as u64;

    let result = match outcome {
        Ok(text) => StepResult::succeeded(step.step, step.capability, text, latency_ms),
        Err(e) => {
            debug!(step = step.step, agent = %agent, error = %e, "step error");
            StepResult::failed(step.step, step.capability, e.to_string(), latency_ms)
        }
    };

    ctx.emit(Phase::StepFinished {
        step: step.step,
        success: result.success,
    });
    result
}

/// Resolve a step input. Unknown output keys fall back to the request text.
pub fn resolve_input<'a>(
    input: &StepInput,
    request: &'a Request,
    store: Option<&'a IntermediateResultStore>,
) -> Payload<'a> {
    match input {
        StepInput::CurrentPage => match request.context.as_ref().and_then(|c| c.text()) {
            Some(page) => Payload::Content(page),
            None => Payload::Prompt(&request.text),
        },
        StepInput::UserMessage => Payload::Prompt(&request.text),
        StepInput::Output(key) => match store.and_then(|s| s.get(key)) {
            Some(value) => Payload::Content(value),
            None => {
                warn!(key = %key, "missing intermediate result, using request text");
                Payload::Prompt(&request.text)
            }
        },
    }
}

/// The one step that serves a single-step intent.
pub fn single_step(intent: &Intent, request: &Request) -> ExecutionStep {
    let has_page = request
        .context
        .as_ref()
        .and_then(|c| c.text())
        .is_some();
    // text embedded in the prompt wins over the page
    let reads_page = has_page && explicit_payload(&request.text).is_none();

    let capability = Capability::for_category(intent.primary, reads_page);
    let input = match intent.primary {
        Category::Summarize | Category::Translate if reads_page => StepInput::CurrentPage,
        _ => StepInput::UserMessage,
    };

    let mut step = ExecutionStep::new(1, capability, input);
    match intent.primary {
        Category::Summarize => {
            if let Some(p) = &intent.params.summarize {
                step = step
                    .param("type", p.kind.as_str())
                    .param("length", p.length.as_str());
            }
        }
        Category::Translate => {
            if let Some(p) = &intent.params.translate {
                step = step
                    .param("source_language", p.source_language.as_str())
                    .param("target_language", p.target_language.as_str());
            }
        }
        Category::Write => {
            if let Some(p) = &intent.params.write {
                step = step
                    .param("tone", p.tone.as_str())
                    .param("length", p.length.as_str())
                    .param("format", p.format.as_str());
            }
        }
        Category::Research => {
            step = step.param("query", Value::String(intent.crafted_prompt.clone()));
        }
    }
    step
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_core::{param_str, PageContext, TranslateParams};

    #[test]
    fn test_resolve_input() {
        let request = Request::new("summarize this").with_context(PageContext {
            title: None,
            url: None,
            content: Some("page body".to_string()),
        });
        let mut store = IntermediateResultStore::new();
        store.insert("summary_text".to_string(), "short".to_string());

        assert_eq!(
            resolve_input(&StepInput::CurrentPage, &request, None),
            Payload::Content("page body")
        );
        assert_eq!(
            resolve_input(&StepInput::UserMessage, &request, None),
            Payload::Prompt("summarize this")
        );
        assert_eq!(
            resolve_input(&StepInput::Output("summary_text".into()), &request, Some(&store)),
            Payload::Content("short")
        );
        assert_eq!(
            resolve_input(&StepInput::Output("missing".into()), &request, Some(&store)),
            Payload::Prompt("summarize this")
        );
    }

    #[test]
    fn test_single_step_for_translation() {
        let mut intent = Intent::default_research("Translate this to Spanish", "");
        intent.primary = Category::Translate;
        intent.params.translate = Some(TranslateParams {
            source_language: "auto".to_string(),
            target_language: "es".to_string(),
        });

        let step = single_step(&intent, &Request::new("Translate this to Spanish"));
        assert_eq!(step.capability, Capability::TranslateText);
        assert_eq!(step.input, StepInput::UserMessage);
        assert_eq!(param_str(&step.params, "target_language"), Some("es"));

        let with_page = Request::new("Translate this to Spanish").with_context(PageContext {
            title: None,
            url: None,
            content: Some("Hello".to_string()),
        });
        let step = single_step(&intent, &with_page);
        assert_eq!(step.capability, Capability::TranslatePage);
        assert_eq!(step.input, StepInput::CurrentPage);
    }
}
