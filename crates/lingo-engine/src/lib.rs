//! Lingo Engine: one call from request to answer
//!
//! # Flow
//!
//! ```text
//! Request → Classify → (Plan) → Execute → Format → Answer
//!              ↓          ↓         ↓         ↓
//!           Intent   ExecutionPlan Results  String
//! ```
//!
//! Single-step requests skip planning and go straight to one dispatch.
//! Only an empty request is an error; every other failure degrades into
//! an explanatory answer.

mod engine;

pub use engine::CoordinationEngine;
pub use lingo_plan::{PlanDecision, PlanSource};
