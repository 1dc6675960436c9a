//! Lingo-PLAN: multi-step execution plans
//!
//! A request that needs more than one capability (summarize, then
//! translate; research and write in parallel) becomes an `ExecutionPlan`.
//! The model proposes a plan; it is normalized and validated before use.
//! When the model is unavailable or its plan is rejected, a narrow
//! detector covers summarize-then-translate. Anything else is reported
//! as single-step.

pub mod detector;
pub mod prompt;
pub mod synthesizer;
pub mod validate;

pub use detector::{detect_summarize_translate, needs_planning};
pub use synthesizer::{PlanDecision, PlanSource, PlanSynthesizer};
pub use validate::{normalize_plan, validate_plan};
