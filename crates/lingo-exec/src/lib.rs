//! Lingo-EXEC: capability dispatch and plan execution

pub mod dispatcher;
pub mod executor;
pub mod extract;

pub use dispatcher::{CapabilityDispatcher, Payload};
pub use executor::{execute_step, resolve_input, single_step, IntermediateResultStore, PlanExecutor};
pub use extract::{extract_after_verb, extract_payload, extract_quoted};
