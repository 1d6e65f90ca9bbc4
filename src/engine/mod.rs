//! Quiz aggregation engine.

/// Loose request parsing and the typed quiz configuration.
pub mod config;
/// Ranking and truncation over an [`crate::core::contract::EntityQuery`].
pub mod quiz;

pub use config::{DEFAULT_LIMIT, QuizConfig, QuizRequest};
pub use quiz::{MANAGERS_OVERALL_ERROR, QuizAnswer, QuizResult, generate_quiz};
