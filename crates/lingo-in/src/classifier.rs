//! Intent classifier: model first, grammar fallback.
//!
//! `classify` never fails. Any provider error, timeout, undecodable answer
//! or out-of-set category sends the request down the deterministic path.

use lingo_core::{
    extract_json, Category, CoordError, EngineConfig, Intent, Request, Slot, TextGenerator,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::grammar::CompiledGrammar;
use crate::matcher;
use crate::normalizer::normalize;
use crate::params::extract_params;
use crate::prompt::build_classification_prompt;

/// Confidence assumed when the model omits one
const DEFAULT_AI_CONFIDENCE: f64 = 0.75;

const TEXT_PROVIDER: &str = "text-generation";

/// Wire shape of the model's answer
#[derive(Debug, Deserialize)]
struct AiClassification {
    primary: String,
    #[serde(default)]
    secondary: Vec<Value>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default, alias = "craftedPrompt")]
    crafted_prompt: Option<String>,
}

pub struct IntentClassifier {
    generator: Option<Slot<dyn TextGenerator>>,
    grammar: Arc<CompiledGrammar>,
    default_language: String,
    timeout: Duration,
    use_ai: bool,
}

impl IntentClassifier {
    pub fn new(
        generator: Option<Slot<dyn TextGenerator>>,
        grammar: Arc<CompiledGrammar>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            generator,
            grammar,
            default_language: config.default_language.clone(),
            timeout: config.classify_timeout(),
            use_ai: config.ai_classification,
        }
    }

    /// Grammar-only classifier
    pub fn deterministic(grammar: Arc<CompiledGrammar>, config: &EngineConfig) -> Self {
        Self::new(None, grammar, config)
    }

    /// Classify a request. Always returns a valid intent.
    pub async fn classify(&self, request: &Request) -> Intent {
        let text = request.text.trim();
        if text.is_empty() {
            return Intent::default_research(text, "Empty request");
        }

        if let Some(slot) = self.generator.as_ref().filter(|_| self.use_ai) {
            match self.classify_with_ai(slot, request).await {
                Ok(intent) => {
                    debug!(primary = %intent.primary, confidence = intent.confidence, "model classification");
                    return intent;
                }
                Err(e) => warn!(error = %e, "model classification failed, using pattern fallback"),
            }
        }

        self.classify_with_patterns(request)
    }

    /// Deterministic keyword/regex classification
    pub fn classify_with_patterns(&self, request: &Request) -> Intent {
        let normalized = normalize(&request.text);
        let found = matcher::match_text(&normalized, &self.grammar);
        debug!(primary = %found.primary, secondary = ?found.secondary, "pattern classification");

        self.finish(
            found.primary,
            found.secondary,
            found.confidence,
            found.reasoning,
            request.text.trim().to_string(),
            false,
            &normalized,
        )
    }

    async fn classify_with_ai(
        &self,
        slot: &Slot<dyn TextGenerator>,
        request: &Request,
    ) -> Result<Intent, CoordError> {
        if let Some(reason) = slot.peek().availability().await.blocker() {
            return Err(CoordError::unavailable(TEXT_PROVIDER, reason));
        }

        let prompt = build_classification_prompt(request);
        let call = async {
            let (_session, provider) = slot.acquire().await;
            provider.generate(&prompt).await
        };
        let response = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| CoordError::deadline("classify", self.timeout))?
            .map_err(|e| e.into_coord(TEXT_PROVIDER))?;

        let answer: AiClassification = extract_json(&response)?;
        let primary: Category = answer.primary.parse()?;

        let mut secondary: Vec<Category> = Vec::new();
        for value in &answer.secondary {
            let parsed = value.as_str().and_then(|s| s.parse::<Category>().ok());
            match parsed {
                Some(c) if c != primary && !secondary.contains(&c) => secondary.push(c),
                Some(_) => {}
                None => debug!(?value, "dropping unknown secondary category"),
            }
        }

        let confidence = answer
            .confidence
            .filter(|c| c.is_finite())
            .unwrap_or(DEFAULT_AI_CONFIDENCE)
            .clamp(0.0, 1.0);
        let crafted = answer
            .crafted_prompt
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| request.text.trim().to_string());

        Ok(self.finish(
            primary,
            secondary,
            confidence,
            answer.reasoning.unwrap_or_else(|| "Model classification".to_string()),
            crafted,
            true,
            &normalize(&request.text),
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        primary: Category,
        secondary: Vec<Category>,
        confidence: f64,
        reasoning: String,
        crafted_prompt: String,
        ai_powered: bool,
        normalized: &str,
    ) -> Intent {
        let params = extract_params(
            std::iter::once(primary).chain(secondary.iter().copied()),
            normalized,
            &self.default_language,
        );
        Intent {
            primary,
            secondary,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning,
            crafted_prompt,
            params,
            ai_powered,
            is_multi_step: false,
        }
    }
}
