//! Data Model: Request, Intent, ExecutionPlan, StepResult, CoordinationResult
//!
//! Every value here is created fresh for one coordination call and dropped
//! when the call returns.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::CoordError;

/// Page the user is looking at when the request was made.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContext {
    pub title: Option<String>,
    pub url: Option<String>,
    /// Preview of the extracted page text
    #[serde(alias = "contentPreview", alias = "content_preview")]
    pub content: Option<String>,
}

impl PageContext {
    /// Page text, if any non-blank content was extracted.
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// A raw user request plus optional page context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub text: String,
    #[serde(default)]
    pub context: Option<PageContext>,
}

impl Request {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: PageContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Page text when present, otherwise the raw request text.
    pub fn page_or_message(&self) -> &str {
        self.context
            .as_ref()
            .and_then(PageContext::text)
            .unwrap_or(&self.text)
    }
}

// ============================================================================
// INTENT
// ============================================================================

/// The closed set of task categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Summarize,
    Translate,
    Write,
    Research,
}

impl Category {
    /// Declaration order doubles as the tie-break order for scoring.
    pub const ALL: [Category; 4] = [
        Category::Summarize,
        Category::Translate,
        Category::Write,
        Category::Research,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Summarize => "summarize",
            Category::Translate => "translate",
            Category::Write => "write",
            Category::Research => "research",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summarize" => Ok(Category::Summarize),
            "translate" => Ok(Category::Translate),
            "write" => Ok(Category::Write),
            "research" => Ok(Category::Research),
            other => Err(CoordError::MalformedResponse(format!(
                "unknown category `{}`",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryType {
    KeyPoints,
    Tldr,
    Teaser,
    Headline,
}

impl SummaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryType::KeyPoints => "key-points",
            SummaryType::Tldr => "tldr",
            SummaryType::Teaser => "teaser",
            SummaryType::Headline => "headline",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "key-points" | "key_points" | "keypoints" => Some(SummaryType::KeyPoints),
            "tldr" | "tl;dr" => Some(SummaryType::Tldr),
            "teaser" => Some(SummaryType::Teaser),
            "headline" => Some(SummaryType::Headline),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Short,
    Medium,
    Long,
}

impl Length {
    pub fn as_str(&self) -> &'static str {
        match self {
            Length::Short => "short",
            Length::Medium => "medium",
            Length::Long => "long",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Some(Length::Short),
            "medium" => Some(Length::Medium),
            "long" => Some(Length::Long),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizeParams {
    #[serde(rename = "type")]
    pub kind: SummaryType,
    pub length: Length,
}

impl Default for SummarizeParams {
    fn default() -> Self {
        Self {
            kind: SummaryType::KeyPoints,
            length: Length::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslateParams {
    /// ISO-639-1 code, or "auto"
    pub source_language: String,
    /// ISO-639-1 code
    pub target_language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteParams {
    pub tone: String,
    pub length: Length,
    pub format: String,
}

impl Default for WriteParams {
    fn default() -> Self {
        Self {
            tone: "neutral".to_string(),
            length: Length::Medium,
            format: "plain-text".to_string(),
        }
    }
}

/// Category-specific parameters, filled for the primary and every secondary category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarize: Option<SummarizeParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<TranslateParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write: Option<WriteParams>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub primary: Category,
    /// Ordered, never contains `primary`
    pub secondary: Vec<Category>,
    /// Always within [0, 1]
    pub confidence: f64,
    pub reasoning: String,
    pub crafted_prompt: String,
    pub params: IntentParams,
    pub ai_powered: bool,
    pub is_multi_step: bool,
}

impl Intent {
    /// Low-confidence research intent used when nothing matched.
    pub fn default_research(request_text: &str, reasoning: impl Into<String>) -> Self {
        Self {
            primary: Category::Research,
            secondary: Vec::new(),
            confidence: 0.5,
            reasoning: reasoning.into(),
            crafted_prompt: request_text.to_string(),
            params: IntentParams::default(),
            ai_powered: false,
            is_multi_step: false,
        }
    }

    /// All categories in priority order: primary first, then secondary.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        std::iter::once(self.primary).chain(self.secondary.iter().copied())
    }
}

// ============================================================================
// CAPABILITIES
// ============================================================================

/// External capability providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Agent {
    Summarizer,
    Translator,
    Writer,
    ResearchProvider,
}

impl Agent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Agent::Summarizer => "summarizer",
            Agent::Translator => "translator",
            Agent::Writer => "writer",
            Agent::ResearchProvider => "research-provider",
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Agent {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "summarizer" => Ok(Agent::Summarizer),
            "translator" => Ok(Agent::Translator),
            "writer" => Ok(Agent::Writer),
            "research-provider" | "research" | "researcher" => Ok(Agent::ResearchProvider),
            other => Err(CoordError::InvalidPlan(format!("unknown agent `{}`", other))),
        }
    }
}

/// Every valid (agent, action) pair. Invalid combinations cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    SummarizePage,
    SummarizeText,
    TranslatePage,
    TranslateText,
    WriteContent,
    ResearchQuery,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::SummarizePage,
        Capability::SummarizeText,
        Capability::TranslatePage,
        Capability::TranslateText,
        Capability::WriteContent,
        Capability::ResearchQuery,
    ];

    pub fn agent(&self) -> Agent {
        match self {
            Capability::SummarizePage | Capability::SummarizeText => Agent::Summarizer,
            Capability::TranslatePage | Capability::TranslateText => Agent::Translator,
            Capability::WriteContent => Agent::Writer,
            Capability::ResearchQuery => Agent::ResearchProvider,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Capability::SummarizePage => "summarize_page",
            Capability::SummarizeText => "summarize_text",
            Capability::TranslatePage => "translate_page",
            Capability::TranslateText => "translate_text",
            Capability::WriteContent => "write_content",
            Capability::ResearchQuery => "research_query",
        }
    }

    /// Resolve a free-text (agent, action) pair; rejects combinations the agent does not offer.
    pub fn resolve(agent: &str, action: &str) -> Result<Self, CoordError> {
        let agent: Agent = agent.parse()?;
        let action = action.trim().to_ascii_lowercase().replace('-', "_");
        Capability::ALL
            .into_iter()
            .find(|c| c.agent() == agent && c.action() == action)
            .ok_or_else(|| {
                CoordError::InvalidPlan(format!(
                    "agent `{}` has no action `{}`",
                    agent, action
                ))
            })
    }

    /// Capability that serves a category on the single-step path.
    pub fn for_category(category: Category, has_page: bool) -> Self {
        match (category, has_page) {
            (Category::Summarize, true) => Capability::SummarizePage,
            (Category::Summarize, false) => Capability::SummarizeText,
            (Category::Translate, true) => Capability::TranslatePage,
            (Category::Translate, false) => Capability::TranslateText,
            (Category::Write, _) => Capability::WriteContent,
            (Category::Research, _) => Capability::ResearchQuery,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.agent(), self.action())
    }
}

// ============================================================================
// EXECUTION PLAN
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionType {
    Single,
    Sequential,
    Parallel,
}

impl ExecutionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionType::Single => "single",
            ExecutionType::Sequential => "sequential",
            ExecutionType::Parallel => "parallel",
        }
    }
}

impl FromStr for ExecutionType {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(ExecutionType::Single),
            "sequential" => Ok(ExecutionType::Sequential),
            "parallel" => Ok(ExecutionType::Parallel),
            other => Err(CoordError::InvalidPlan(format!(
                "unknown execution type `{}`",
                other
            ))),
        }
    }
}

/// Where a step reads its input from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepInput {
    CurrentPage,
    UserMessage,
    /// Output key of an earlier step
    Output(String),
}

impl From<String> for StepInput {
    fn from(value: String) -> Self {
        match value.trim() {
            "current_page" => StepInput::CurrentPage,
            "user_message" => StepInput::UserMessage,
            other => StepInput::Output(other.to_string()),
        }
    }
}

impl From<StepInput> for String {
    fn from(value: StepInput) -> Self {
        match value {
            StepInput::CurrentPage => "current_page".to_string(),
            StepInput::UserMessage => "user_message".to_string(),
            StepInput::Output(key) => key,
        }
    }
}

pub type StepParams = Map<String, Value>;

/// Read a string parameter.
pub fn param_str<'a>(params: &'a StepParams, key: &str) -> Option<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStep", into = "RawStep")]
pub struct ExecutionStep {
    pub step: u32,
    pub capability: Capability,
    pub input: StepInput,
    pub output: Option<String>,
    pub params: StepParams,
}

impl ExecutionStep {
    pub fn new(step: u32, capability: Capability, input: StepInput) -> Self {
        Self {
            step,
            capability,
            input,
            output: None,
            params: StepParams::new(),
        }
    }

    pub fn output(mut self, key: impl Into<String>) -> Self {
        self.output = Some(key.into());
        self
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn agent(&self) -> Agent {
        self.capability.agent()
    }
}

/// Wire shape of a step: agent and action as free strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStep {
    pub step: u32,
    pub agent: String,
    pub action: String,
    #[serde(default = "default_raw_input")]
    pub input: String,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub params: StepParams,
}

fn default_raw_input() -> String {
    "current_page".to_string()
}

impl TryFrom<RawStep> for ExecutionStep {
    type Error = CoordError;

    fn try_from(raw: RawStep) -> Result<Self, Self::Error> {
        Ok(ExecutionStep {
            step: raw.step,
            capability: Capability::resolve(&raw.agent, &raw.action)?,
            input: StepInput::from(raw.input),
            output: raw.output.filter(|o| !o.trim().is_empty()),
            params: raw.params,
        })
    }
}

impl From<ExecutionStep> for RawStep {
    fn from(step: ExecutionStep) -> Self {
        RawStep {
            step: step.step,
            agent: step.capability.agent().as_str().to_string(),
            action: step.capability.action().to_string(),
            input: step.input.into(),
            output: step.output,
            params: step.params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub execution_type: ExecutionType,
    pub steps: Vec<ExecutionStep>,
    #[serde(default)]
    pub final_output_language: Option<String>,
    #[serde(default)]
    pub reasoning: String,
}

impl ExecutionPlan {
    /// Ordered agent chain, e.g. "summarizer → translator".
    pub fn agent_chain(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.agent().as_str())
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepRole {
    Primary,
    Secondary,
    Intermediate,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step: u32,
    pub agent: Agent,
    pub action: String,
    pub result: Option<String>,
    pub success: bool,
    pub error: Option<String>,
    pub role: StepRole,
    pub latency_ms: u64,
}

impl StepResult {
    pub fn succeeded(step: u32, capability: Capability, text: String, latency_ms: u64) -> Self {
        Self {
            step,
            agent: capability.agent(),
            action: capability.action().to_string(),
            result: Some(text),
            success: true,
            error: None,
            role: StepRole::Primary,
            latency_ms,
        }
    }

    pub fn failed(step: u32, capability: Capability, error: String, latency_ms: u64) -> Self {
        Self {
            step,
            agent: capability.agent(),
            action: capability.action().to_string(),
            result: None,
            success: false,
            error: Some(error),
            role: StepRole::Failed,
            latency_ms,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.result.as_deref().filter(|_| self.success)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl ProcessingStats {
    pub fn from_results(results: &[StepResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationResult {
    pub trace_id: String,
    pub intent: Intent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<ExecutionPlan>,
    pub results: Vec<StepResult>,
    pub success: bool,
    /// Set when the answer is a fallback explanation rather than a capability result
    pub degraded: bool,
    pub execution_type: ExecutionType,
    pub processing_stats: ProcessingStats,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// Structured result plus the ready-to-display answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationOutcome {
    pub result: CoordinationResult,
    pub answer: String,
}
