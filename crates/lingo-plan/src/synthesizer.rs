//! Plan synthesizer: model plan first, narrow detector second.

use lingo_core::{
    extract_json, Category, CoordError, EngineConfig, ExecutionPlan, ExecutionStep, ExecutionType,
    Request, Slot, TextGenerator,
};
use lingo_in::normalize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::detector::detect_summarize_translate;
use crate::prompt::build_planning_prompt;
use crate::validate::{normalize_plan, validate_plan};

const TEXT_PROVIDER: &str = "text-generation";

/// Which tier produced the decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    Model,
    Pattern,
    /// Neither tier found a multi-step shape
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDecision {
    pub is_multi_step: bool,
    /// Present only when `is_multi_step` is true
    pub plan: Option<ExecutionPlan>,
    pub source: PlanSource,
    pub reasoning: String,
    pub confidence: f64,
}

impl PlanDecision {
    fn single(source: PlanSource, reasoning: impl Into<String>, confidence: f64) -> Self {
        Self {
            is_multi_step: false,
            plan: None,
            source,
            reasoning: reasoning.into(),
            confidence,
        }
    }

    fn multi(plan: ExecutionPlan, source: PlanSource, confidence: f64) -> Self {
        Self {
            is_multi_step: true,
            reasoning: plan.reasoning.clone(),
            plan: Some(plan),
            source,
            confidence,
        }
    }
}

/// Wire shape of the model's plan. `primary` and `isMultiStep` are required.
#[derive(Debug, Deserialize)]
struct AiPlan {
    primary: String,
    #[serde(alias = "isMultiStep")]
    is_multi_step: bool,
    #[serde(default, alias = "executionType")]
    execution_type: Option<String>,
    #[serde(default, alias = "executionPlan", alias = "steps")]
    execution_plan: Vec<Value>,
    #[serde(default, alias = "finalOutputLanguage")]
    final_output_language: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

pub struct PlanSynthesizer {
    generator: Option<Slot<dyn TextGenerator>>,
    timeout: Duration,
    use_ai: bool,
}

impl PlanSynthesizer {
    pub fn new(generator: Option<Slot<dyn TextGenerator>>, config: &EngineConfig) -> Self {
        Self {
            generator,
            timeout: config.plan_timeout(),
            use_ai: config.ai_planning,
        }
    }

    /// Plan a request. Never fails; the worst case is a single-step decision.
    pub async fn synthesize(&self, request: &Request) -> PlanDecision {
        if request.text.trim().is_empty() {
            return PlanDecision::single(PlanSource::None, "Empty request", 0.5);
        }

        if let Some(slot) = self.generator.as_ref().filter(|_| self.use_ai) {
            match self.plan_with_ai(slot, request).await {
                Ok(decision) => {
                    debug!(multi = decision.is_multi_step, "model plan accepted");
                    return decision;
                }
                Err(e) => warn!(error = %e, "model planning failed, using pattern detector"),
            }
        }

        self.plan_with_patterns(request)
    }

    /// Narrow detector only
    pub fn plan_with_patterns(&self, request: &Request) -> PlanDecision {
        match detect_summarize_translate(&normalize(&request.text)) {
            Some(plan) => {
                debug!(chain = %plan.agent_chain(), "pattern plan");
                PlanDecision::multi(plan, PlanSource::Pattern, 0.8)
            }
            None => PlanDecision::single(PlanSource::None, "No multi-step pattern detected", 0.5),
        }
    }

    /// The plan alone, when the request is multi-step
    pub async fn synthesize_plan(&self, request: &Request) -> Option<ExecutionPlan> {
        self.synthesize(request).await.plan
    }

    async fn plan_with_ai(
        &self,
        slot: &Slot<dyn TextGenerator>,
        request: &Request,
    ) -> Result<PlanDecision, CoordError> {
        if let Some(reason) = slot.peek().availability().await.blocker() {
            return Err(CoordError::unavailable(TEXT_PROVIDER, reason));
        }

        let prompt = build_planning_prompt(request);
        let call = async {
            let (_session, provider) = slot.acquire().await;
            provider.generate(&prompt).await
        };
        let response = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| CoordError::deadline("plan", self.timeout))?
            .map_err(|e| e.into_coord(TEXT_PROVIDER))?;

        let answer: AiPlan = extract_json(&response)?;
        answer.primary.parse::<Category>()?;

        let confidence = answer
            .confidence
            .filter(|c| c.is_finite())
            .unwrap_or(0.75)
            .clamp(0.0, 1.0);
        let reasoning = answer
            .reasoning
            .clone()
            .unwrap_or_else(|| "Model plan".to_string());

        if !answer.is_multi_step {
            return Ok(PlanDecision::single(PlanSource::Model, reasoning, confidence));
        }

        let plan = normalize_plan(into_plan(answer, reasoning.clone())?);
        validate_plan(&plan)?;

        if plan.execution_type == ExecutionType::Single || plan.steps.len() == 1 {
            return Ok(PlanDecision::single(PlanSource::Model, reasoning, confidence));
        }

        Ok(PlanDecision::multi(plan, PlanSource::Model, confidence))
    }
}

fn into_plan(answer: AiPlan, reasoning: String) -> Result<ExecutionPlan, CoordError> {
    let execution_type = match answer.execution_type.as_deref() {
        Some(t) => t.parse::<ExecutionType>()?,
        None => ExecutionType::Sequential,
    };

    let steps = answer
        .execution_plan
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            serde_json::from_value::<ExecutionStep>(raw)
                .map_err(|e| CoordError::InvalidPlan(format!("step entry {}: {}", i + 1, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExecutionPlan {
        execution_type,
        steps,
        final_output_language: answer.final_output_language,
        reasoning,
    })
}
