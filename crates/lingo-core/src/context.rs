//! Call Context: per-coordination identity and progress reporting
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::data_model::Agent;

/// Identity of one coordination call. Never shared across calls.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub trace_id: String,
    pub started_at: DateTime<Utc>,
    progress: Option<ProgressSink>,
}

impl CallContext {
    pub fn new() -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            progress: None,
        }
    }

    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn emit(&self, phase: Phase) {
        tracing::trace!(trace_id = %self.trace_id, ?phase, "phase");
        if let Some(sink) = &self.progress {
            sink.send(ProgressEvent {
                trace_id: self.trace_id.clone(),
                phase,
            });
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        (Utc::now() - self.started_at).num_milliseconds().max(0) as u64
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new()
    }
}

/// States of one coordination call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Received,
    Classifying,
    Planning,
    Dispatching { agent: Agent },
    Executing { step: u32, agent: Agent },
    StepFinished { step: u32, success: bool },
    Done { degraded: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub trace_id: String,
    #[serde(flatten)]
    pub phase: Phase,
}

/// Sending half of a per-call progress channel.
#[derive(Debug, Clone)]
pub struct ProgressSink(mpsc::UnboundedSender<ProgressEvent>);

impl ProgressSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }

    /// A dropped receiver just means nobody is watching.
    fn send(&self, event: ProgressEvent) {
        let _ = self.0.send(event);
    }
}
