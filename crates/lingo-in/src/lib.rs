//! Lingo-IN: natural-language request to structured intent
//!
//! Classification runs in two tiers. A text-generation model is asked for
//! a JSON classification first; when it is missing, slow, or answers with
//! something unusable, the request is scored against a keyword/regex
//! grammar instead. Category parameters always come from the grammar side.
//!
//! # Example
//!
//! ```ignore
//! use lingo_in::{CompiledGrammar, IntentClassifier};
//!
//! let classifier = IntentClassifier::deterministic(
//!     Arc::new(CompiledGrammar::builtin()),
//!     &EngineConfig::default(),
//! );
//! let intent = classifier.classify(&Request::new("Translate this to Spanish")).await;
//! assert_eq!(intent.primary, Category::Translate);
//! ```

pub mod classifier;
pub mod grammar;
pub mod language;
pub mod matcher;
pub mod normalizer;
pub mod params;
pub mod prompt;

pub use classifier::IntentClassifier;
pub use grammar::CompiledGrammar;
pub use matcher::{match_text, CategoryScore, PatternMatch};
pub use normalizer::{normalize, validate_request};
pub use params::extract_params;
