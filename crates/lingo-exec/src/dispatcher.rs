//! Capability Dispatcher
//!
//! Routes a `Capability` to its provider. Every call goes through the same
//! sequence: readiness pre-check, session acquisition, provider call, and
//! response normalization. A missing or unready provider is reported as
//! `ProviderUnavailable` before any call is attempted.

use lingo_core::{
    param_str, Agent, Capability, CoordError, Length, ProviderError, ProviderRegistry, Request,
    StepParams, SummarizeOptions, SummaryType, WriteOptions,
};
use lingo_in::prompt::preview;
use tracing::{debug, instrument};

use crate::extract::extract_payload;

/// Text handed to a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    /// Page text or an earlier step's output, used verbatim
    Content(&'a str),
    /// A natural-language instruction that may embed the text to process
    Prompt(&'a str),
}

impl<'a> Payload<'a> {
    pub fn as_str(&self) -> &'a str {
        match *self {
            Payload::Content(text) | Payload::Prompt(text) => text,
        }
    }

    /// The text to transform, pulled out of a prompt when needed
    fn material(&self) -> &'a str {
        match *self {
            Payload::Content(text) => text,
            Payload::Prompt(text) => extract_payload(text),
        }
    }
}

pub struct CapabilityDispatcher {
    registry: ProviderRegistry,
    default_language: String,
}

impl CapabilityDispatcher {
    pub fn new(registry: ProviderRegistry, default_language: impl Into<String>) -> Self {
        Self {
            registry,
            default_language: default_language.into(),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Dispatch a free-text (agent, action) pair
    pub async fn dispatch_named(
        &self,
        agent: &str,
        action: &str,
        input: Payload<'_>,
        params: &StepParams,
        request: &Request,
    ) -> Result<String, CoordError> {
        let capability = Capability::resolve(agent, action)?;
        self.dispatch(capability, input, params, request).await
    }

    #[instrument(level = "debug", skip_all, fields(capability = %capability))]
    pub async fn dispatch(
        &self,
        capability: Capability,
        input: Payload<'_>,
        params: &StepParams,
        request: &Request,
    ) -> Result<String, CoordError> {
        let agent = capability.agent();
        let output = match capability {
            Capability::SummarizePage | Capability::SummarizeText => {
                self.summarize(input.material(), params, request).await
            }
            Capability::TranslatePage | Capability::TranslateText => {
                self.translate(input.material(), params).await
            }
            Capability::WriteContent => self.write(input, params, request).await,
            Capability::ResearchQuery => self.research(input, params, request).await,
        }?;

        if output.trim().is_empty() {
            return Err(CoordError::ProviderFailed(format!(
                "{}: empty response",
                agent
            )));
        }
        Ok(output)
    }

    async fn summarize(
        &self,
        text: &str,
        params: &StepParams,
        request: &Request,
    ) -> Result<String, CoordError> {
        let slot = self
            .registry
            .summarizer()
            .ok_or_else(|| not_registered(Agent::Summarizer))?;
        if let Some(reason) = slot.peek().availability().await.blocker() {
            return Err(CoordError::unavailable(Agent::Summarizer.as_str(), reason));
        }

        let options = SummarizeOptions {
            kind: param_str(params, "type")
                .and_then(SummaryType::parse)
                .unwrap_or(SummaryType::KeyPoints),
            length: param_str(params, "length")
                .and_then(Length::parse)
                .unwrap_or(Length::Medium),
            format: param_str(params, "format").unwrap_or("plain-text").to_string(),
            language: param_str(params, "language").map(str::to_string),
            shared_context: request
                .context
                .as_ref()
                .and_then(|c| c.title.clone()),
        };

        let (_session, provider) = slot.acquire().await;
        provider
            .summarize(text, &options)
            .await
            .map_err(|e| provider_error(Agent::Summarizer, e))
    }

    async fn translate(&self, text: &str, params: &StepParams) -> Result<String, CoordError> {
        let slot = self
            .registry
            .translator()
            .ok_or_else(|| not_registered(Agent::Translator))?;

        let source = param_str(params, "source_language").unwrap_or("auto");
        let target = param_str(params, "target_language").unwrap_or(self.default_language.as_str());

        if let Some(reason) = slot.peek().availability(source, target).await.blocker() {
            return Err(CoordError::unavailable(
                Agent::Translator.as_str(),
                format!("{} -> {}: {}", source, target, reason),
            ));
        }

        let (_session, provider) = slot.acquire().await;

        if source == "auto" {
            match provider.detect_language(text).await {
                Ok(detected) if detected.language.eq_ignore_ascii_case(target) => {
                    debug!(language = %detected.language, "input already in target language");
                    return Ok(text.to_string());
                }
                Ok(detected) => debug!(language = %detected.language, confidence = detected.confidence, "detected source"),
                Err(e) => debug!(error = %e, "language detection failed"),
            }
        } else if source.eq_ignore_ascii_case(target) {
            return Ok(text.to_string());
        }

        provider
            .translate(text, source, target)
            .await
            .map_err(|e| provider_error(Agent::Translator, e))
    }

    async fn write(
        &self,
        input: Payload<'_>,
        params: &StepParams,
        request: &Request,
    ) -> Result<String, CoordError> {
        let slot = self
            .registry
            .writer()
            .ok_or_else(|| not_registered(Agent::Writer))?;
        if let Some(reason) = slot.peek().availability().await.blocker() {
            return Err(CoordError::unavailable(Agent::Writer.as_str(), reason));
        }

        let options = WriteOptions {
            tone: param_str(params, "tone").unwrap_or("neutral").to_string(),
            length: param_str(params, "length")
                .and_then(Length::parse)
                .unwrap_or(Length::Medium),
            format: param_str(params, "format").unwrap_or("plain-text").to_string(),
        };

        let prompt = match input {
            Payload::Prompt(prompt) => prompt.trim().to_string(),
            Payload::Content(material) => format!(
                "{}\n\nSource material:\n{}",
                request.text.trim(),
                material
            ),
        };

        // placeholder answers ("not yet available") pass through as results
        let (_session, provider) = slot.acquire().await;
        provider
            .write(&prompt, &options)
            .await
            .map_err(|e| provider_error(Agent::Writer, e))
    }

    async fn research(
        &self,
        input: Payload<'_>,
        params: &StepParams,
        request: &Request,
    ) -> Result<String, CoordError> {
        let slot = self
            .registry
            .text_generator()
            .ok_or_else(|| not_registered(Agent::ResearchProvider))?;
        if let Some(reason) = slot.peek().availability().await.blocker() {
            return Err(CoordError::unavailable(Agent::ResearchProvider.as_str(), reason));
        }

        let question = param_str(params, "query").unwrap_or_else(|| request.text.trim());
        let prompt = research_prompt(input, question, request);
        let (_session, provider) = slot.acquire().await;
        provider
            .generate(&prompt)
            .await
            .map_err(|e| provider_error(Agent::ResearchProvider, e))
    }
}

fn research_prompt(input: Payload<'_>, question: &str, request: &Request) -> String {
    let mut prompt = String::from(
        "Answer the question clearly and accurately. Say so when you are unsure.\n",
    );

    match input {
        Payload::Content(material) => {
            prompt.push_str(&format!("\nMaterial:\n{}\n", preview(material)));
        }
        Payload::Prompt(_) => {
            if let Some(ctx) = &request.context {
                if let Some(title) = &ctx.title {
                    prompt.push_str(&format!("\nCurrent page: {}\n", title));
                }
                if let Some(text) = ctx.text() {
                    prompt.push_str(&format!("Page excerpt:\n{}\n", preview(text)));
                }
            }
        }
    }

    prompt.push_str(&format!("\nQuestion: {}\n", question));
    prompt
}

fn not_registered(agent: Agent) -> CoordError {
    CoordError::unavailable(agent.as_str(), "no provider registered")
}

fn provider_error(agent: Agent, error: ProviderError) -> CoordError {
    error.into_coord(agent.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_material() {
        assert_eq!(Payload::Content("  keep  ").material(), "  keep  ");
        assert_eq!(
            Payload::Prompt(r#"translate "hola" to English"#).material(),
            "hola"
        );
        assert_eq!(Payload::Prompt("Translate this page").material(), "Translate this page");
    }

    #[test]
    fn test_research_prompt_uses_material() {
        let request = Request::new("Who wrote it?");
        let prompt = research_prompt(Payload::Content("An essay by Ada."), "Who wrote it?", &request);
        assert!(prompt.contains("Material:\nAn essay by Ada."));
        assert!(prompt.ends_with("Question: Who wrote it?\n"));
    }

    #[tokio::test]
    async fn test_missing_provider_is_unavailable() {
        let dispatcher = CapabilityDispatcher::new(ProviderRegistry::new(), "en");
        let err = dispatcher
            .dispatch(
                Capability::SummarizeText,
                Payload::Prompt("summarize: text"),
                &StepParams::new(),
                &Request::new("summarize: text"),
            )
            .await
            .unwrap_err();

        match err {
            CoordError::ProviderUnavailable { provider, hint, .. } => {
                assert_eq!(provider, "summarizer");
                assert!(!hint.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_pair_rejected() {
        let dispatcher = CapabilityDispatcher::new(ProviderRegistry::new(), "en");
        let err = dispatcher
            .dispatch_named(
                "writer",
                "translate_text",
                Payload::Prompt("x"),
                &StepParams::new(),
                &Request::new("x"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoordError::InvalidPlan(_)));
    }
}
