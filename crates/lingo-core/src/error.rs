//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordError {
    #[error("REQUEST/{0}")]
    InvalidRequest(String),

    #[error("PROVIDER/UNAVAILABLE/{provider}: {reason} (hint: {hint})")]
    ProviderUnavailable {
        provider: String,
        reason: String,
        hint: String,
    },

    /// `detail` is either the engine's own deadline or the provider's message
    #[error("PROVIDER/TIMEOUT/{operation}: {detail}")]
    ProviderTimeout { operation: String, detail: String },

    #[error("PROVIDER/FAILED/{0}")]
    ProviderFailed(String),

    #[error("PARSE/{0}")]
    MalformedResponse(String),

    #[error("PLAN/{0}")]
    InvalidPlan(String),

    #[error("STEP/{step}: {reason}")]
    StepExecution { step: u32, reason: String },

    #[error("CONFIG/{0}")]
    Config(String),
}

impl CoordError {
    /// Unavailable provider with its remediation hint attached.
    pub fn unavailable(provider: &str, reason: impl Into<String>) -> Self {
        CoordError::ProviderUnavailable {
            provider: provider.to_string(),
            reason: reason.into(),
            hint: crate::provider::remediation_hint(provider).to_string(),
        }
    }

    /// An engine-imposed deadline that expired.
    pub fn deadline(operation: &str, after: std::time::Duration) -> Self {
        CoordError::ProviderTimeout {
            operation: operation.to_string(),
            detail: format!("no answer after {}ms", after.as_millis()),
        }
    }

    /// Stable code prefix, as used in `Display`
    pub fn code(&self) -> &'static str {
        match self {
            CoordError::InvalidRequest(_) => "REQUEST",
            CoordError::ProviderUnavailable { .. } => "PROVIDER/UNAVAILABLE",
            CoordError::ProviderTimeout { .. } => "PROVIDER/TIMEOUT",
            CoordError::ProviderFailed(_) => "PROVIDER/FAILED",
            CoordError::MalformedResponse(_) => "PARSE",
            CoordError::InvalidPlan(_) => "PLAN",
            CoordError::StepExecution { .. } => "STEP",
            CoordError::Config(_) => "CONFIG",
        }
    }

    /// Failures that move the caller on to the next fallback tier.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CoordError::InvalidRequest(_) | CoordError::Config(_))
    }
}

/// Errors returned by capability provider implementations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("{0}")]
    Failed(String),
}

impl ProviderError {
    pub fn into_coord(self, provider: &str) -> CoordError {
        match self {
            ProviderError::Unavailable(reason) => CoordError::unavailable(provider, reason),
            ProviderError::Timeout(what) => CoordError::ProviderTimeout {
                operation: provider.to_string(),
                detail: what,
            },
            ProviderError::Failed(msg) => CoordError::ProviderFailed(format!("{}: {}", provider, msg)),
        }
    }
}
