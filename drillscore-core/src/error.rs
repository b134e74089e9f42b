//! Error types for drillscore-core

use thiserror::Error;

use crate::history::HistoryError;

/// Errors surfaced by the session engine
///
/// Evaluator operations themselves are total; every variant here is raised at
/// the boundary (request validation, registry lookup, persistence hand-off).
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed request; rejected before touching any session state
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// A `start` collided with a live session under the reject policy
    #[error("Session already active: {0}")]
    SessionAlreadyActive(String),

    /// The summary was computed but could not be stored; the session stays live
    #[error("Failed to persist session summary: {0}")]
    Persistence(#[from] HistoryError),
}

impl EngineError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation(message.into())
    }
}
