//! Single-owner async service around an entity store.

/// Handle and command loop implementation.
pub mod handle;

pub use handle::{QuizServiceHandle, ServiceConfig, ServiceError, spawn_quiz_service};
