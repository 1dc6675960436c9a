//! Lingo Core: data model, provider contracts and shared utilities
//!
//! Every coordination call builds its own `Request`, `Intent`,
//! `ExecutionPlan` and `CoordinationResult`; nothing here outlives a call
//! except the `ProviderRegistry` handed to the engine at construction.

pub mod config;
pub mod context;
pub mod data_model;
pub mod error;
pub mod json;
pub mod provider;

pub use config::EngineConfig;
pub use context::{CallContext, Phase, ProgressEvent, ProgressSink};
pub use data_model::{
    param_str, Agent, Capability, Category, CoordinationOutcome, CoordinationResult,
    ExecutionPlan, ExecutionStep, ExecutionType, Intent, IntentParams, Length, PageContext,
    ProcessingStats, Request, StepInput, StepParams, StepResult, StepRole, SummarizeParams,
    SummaryType, TranslateParams, WriteParams,
};
pub use error::{CoordError, ProviderError};
pub use json::{extract_json, extract_json_object};
pub use provider::{
    Availability, DetectedLanguage, ProviderRegistry, Slot, SummarizeOptions, Summarizer,
    TextGenerator, Translator, WriteOptions, Writer,
};

/// Engine version reported by the API
pub const LINGO_VERSION: &str = env!("CARGO_PKG_VERSION");
