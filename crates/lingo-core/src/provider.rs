//! Provider contracts: one trait per external capability engine
//!
//! Providers are idempotent text transformers. Each is reached through a
//! single logical session; the registry serializes concurrent calls into
//! the same provider behind an async mutex.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::data_model::{Agent, Length, SummaryType};
use crate::error::ProviderError;

/// Whether a provider can serve a call right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Available,
    /// Supported, but a model must be fetched first
    NeedsDownload,
    Unavailable(String),
}

impl Availability {
    /// Why the provider cannot serve the call, or `None` when it can.
    pub fn blocker(&self) -> Option<String> {
        match self {
            Availability::Available => None,
            Availability::NeedsDownload => Some("model download required".to_string()),
            Availability::Unavailable(reason) => Some(reason.clone()),
        }
    }
}

/// Remediation shown to the user when a provider is not ready.
pub fn remediation_hint(provider: &str) -> &'static str {
    match provider {
        "summarizer" => "enable the summarization model and wait for its download to finish",
        "translator" => "enable the translation model for this language pair and retry",
        "writer" => "enable the writing model and retry",
        "research-provider" | "text-generation" => {
            "configure a text-generation endpoint (LINGO_LLM_URL) and retry"
        }
        _ => "check the provider configuration and retry",
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    async fn availability(&self) -> Availability {
        Availability::Available
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizeOptions {
    #[serde(rename = "type")]
    pub kind: SummaryType,
    pub length: Length,
    pub format: String,
    pub language: Option<String>,
    /// Page title or other framing for the summarizer
    pub shared_context: Option<String>,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            kind: SummaryType::KeyPoints,
            length: Length::Medium,
            format: "plain-text".to_string(),
            language: None,
            shared_context: None,
        }
    }
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, options: &SummarizeOptions) -> Result<String, ProviderError>;

    async fn availability(&self) -> Availability {
        Availability::Available
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLanguage {
    pub language: String,
    pub confidence: f64,
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, ProviderError>;

    async fn detect_language(&self, text: &str) -> Result<DetectedLanguage, ProviderError>;

    /// `source` may be "auto".
    async fn availability(&self, _source: &str, _target: &str) -> Availability {
        Availability::Available
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteOptions {
    pub tone: String,
    pub length: Length,
    pub format: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            tone: "neutral".to_string(),
            length: Length::Medium,
            format: "plain-text".to_string(),
        }
    }
}

#[async_trait]
pub trait Writer: Send + Sync {
    /// May return a "not yet available" placeholder text; that is a success.
    async fn write(&self, prompt: &str, options: &WriteOptions) -> Result<String, ProviderError>;

    async fn availability(&self) -> Availability {
        Availability::Available
    }
}

/// A provider handle plus the gate that serializes its session.
pub struct Slot<P: ?Sized> {
    provider: Arc<P>,
    session: Arc<Mutex<()>>,
}

impl<P: ?Sized> Clone for Slot<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            session: Arc::clone(&self.session),
        }
    }
}

impl<P: ?Sized> Slot<P> {
    fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            session: Arc::new(Mutex::new(())),
        }
    }

    /// Hold the returned guard for the whole provider call.
    pub async fn acquire(&self) -> (MutexGuard<'_, ()>, &P) {
        let guard = self.session.lock().await;
        (guard, self.provider.as_ref())
    }

    /// Access without taking the session, for readiness checks.
    pub fn peek(&self) -> &P {
        self.provider.as_ref()
    }
}

/// Providers resolved before the engine is built. Missing slots are
/// reported as unavailable at dispatch time.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    text: Option<Slot<dyn TextGenerator>>,
    summarizer: Option<Slot<dyn Summarizer>>,
    translator: Option<Slot<dyn Translator>>,
    writer: Option<Slot<dyn Writer>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_generator(mut self, provider: Arc<dyn TextGenerator>) -> Self {
        self.text = Some(Slot::new(provider));
        self
    }

    pub fn with_summarizer(mut self, provider: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(Slot::new(provider));
        self
    }

    pub fn with_translator(mut self, provider: Arc<dyn Translator>) -> Self {
        self.translator = Some(Slot::new(provider));
        self
    }

    pub fn with_writer(mut self, provider: Arc<dyn Writer>) -> Self {
        self.writer = Some(Slot::new(provider));
        self
    }

    pub fn text_generator(&self) -> Option<&Slot<dyn TextGenerator>> {
        self.text.as_ref()
    }

    pub fn summarizer(&self) -> Option<&Slot<dyn Summarizer>> {
        self.summarizer.as_ref()
    }

    pub fn translator(&self) -> Option<&Slot<dyn Translator>> {
        self.translator.as_ref()
    }

    pub fn writer(&self) -> Option<&Slot<dyn Writer>> {
        self.writer.as_ref()
    }

    pub fn has(&self, agent: Agent) -> bool {
        match agent {
            Agent::Summarizer => self.summarizer.is_some(),
            Agent::Translator => self.translator.is_some(),
            Agent::Writer => self.writer.is_some(),
            Agent::ResearchProvider => self.text.is_some(),
        }
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("text", &self.text.is_some())
            .field("summarizer", &self.summarizer.is_some())
            .field("translator", &self.translator.is_some())
            .field("writer", &self.writer.is_some())
            .finish()
    }
}
