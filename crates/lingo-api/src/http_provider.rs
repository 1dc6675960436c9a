//! OpenAI-compatible chat-completions backend.
//!
//! One client serves all four capabilities by prompting the same model.
//! Without a configured endpoint every capability reports itself
//! unavailable, so the engine answers with a remediation hint instead of
//! failing on connect.

use async_trait::async_trait;
use lingo_core::{
    extract_json, Availability, DetectedLanguage, ProviderError, SummarizeOptions, Summarizer,
    TextGenerator, Translator, WriteOptions, Writer,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    /// Full chat-completions URL
    pub endpoint: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for HttpProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

impl HttpProviderConfig {
    /// Read `LINGO_LLM_URL`, `LINGO_LLM_MODEL` and `LINGO_LLM_API_KEY`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: std::env::var("LINGO_LLM_URL").ok().filter(|s| !s.trim().is_empty()),
            model: std::env::var("LINGO_LLM_MODEL").unwrap_or(defaults.model),
            api_key: std::env::var("LINGO_LLM_API_KEY").ok().filter(|s| !s.is_empty()),
            timeout_secs: defaults.timeout_secs,
        }
    }
}

pub struct HttpProvider {
    client: reqwest::Client,
    config: HttpProviderConfig,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: String,
}

impl HttpProvider {
    pub fn new(config: HttpProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Failed(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn readiness(&self) -> Availability {
        match &self.config.endpoint {
            Some(_) => Availability::Available,
            None => Availability::Unavailable("no LLM endpoint configured".to_string()),
        }
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .ok_or_else(|| ProviderError::Unavailable("no LLM endpoint configured".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.config.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", key))
                    .map_err(|e| ProviderError::Failed(e.to_string()))?,
            );
        }

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.2,
        };

        debug!(model = %self.config.model, chars = user.len(), "chat completion");
        let response = self
            .client
            .post(endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Failed(format!("HTTP {}: {}", status, text)));
        }

        let parsed: ChatResponse = response.json().await.map_err(http_error)?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::Failed("response has no choices".to_string()))
    }
}

fn http_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Failed(e.to_string())
    }
}

const ASSISTANT: &str = "You are a helpful assistant.";

#[async_trait]
impl TextGenerator for HttpProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.chat(ASSISTANT, prompt).await
    }

    async fn availability(&self) -> Availability {
        self.readiness()
    }
}

pub fn summarize_instructions(options: &SummarizeOptions) -> String {
    let mut system = format!(
        "Summarize the text you are given as {} with {} length, formatted as {}. Reply with the summary only.",
        options.kind.as_str(),
        options.length.as_str(),
        options.format
    );
    if let Some(language) = &options.language {
        system.push_str(&format!(" Write the summary in language `{}`.", language));
    }
    if let Some(context) = &options.shared_context {
        system.push_str(&format!(" Context: {}", context));
    }
    system
}

#[async_trait]
impl Summarizer for HttpProvider {
    async fn summarize(&self, text: &str, options: &SummarizeOptions) -> Result<String, ProviderError> {
        self.chat(&summarize_instructions(options), text).await
    }

    async fn availability(&self) -> Availability {
        self.readiness()
    }
}

#[async_trait]
impl Translator for HttpProvider {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, ProviderError> {
        let from = if source == "auto" {
            "the detected source language".to_string()
        } else {
            format!("language `{}`", source)
        };
        let system = format!(
            "Translate the text you are given from {} into language `{}`. Reply with the translation only.",
            from, target
        );
        self.chat(&system, text).await
    }

    async fn detect_language(&self, text: &str) -> Result<DetectedLanguage, ProviderError> {
        let reply = self
            .chat(
                "Identify the language of the text you are given. Reply with JSON only: \
                 {\"language\": \"<ISO-639-1 code>\", \"confidence\": <0..1>}",
                text,
            )
            .await?;
        let mut detected: DetectedLanguage =
            extract_json(&reply).map_err(|e| ProviderError::Failed(e.to_string()))?;
        detected.language = detected.language.trim().to_ascii_lowercase();
        Ok(detected)
    }

    async fn availability(&self, _source: &str, _target: &str) -> Availability {
        self.readiness()
    }
}

#[async_trait]
impl Writer for HttpProvider {
    async fn write(&self, prompt: &str, options: &WriteOptions) -> Result<String, ProviderError> {
        let system = format!(
            "You are a writing assistant. Use a {} tone, {} length, formatted as {}. Reply with the text only.",
            options.tone,
            options.length.as_str(),
            options.format
        );
        self.chat(&system, prompt).await
    }

    async fn availability(&self) -> Availability {
        self.readiness()
    }
}
