//! Server error types

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use drillscore_core::{AuthError, EngineError, HistoryError};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur in the drillscore server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Request body was not usable JSON
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    History(#[from] HistoryError),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Body of every failed request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidMessage(_) => StatusCode::BAD_REQUEST,
            ServerError::Engine(EngineError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServerError::Engine(EngineError::SessionNotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Engine(EngineError::SessionAlreadyActive(_)) => StatusCode::CONFLICT,
            ServerError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServerError::Engine(EngineError::Persistence(_))
            | ServerError::History(_)
            | ServerError::Bind { .. }
            | ServerError::Config(_)
            | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }

        let body = ErrorResponse {
            ok: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_client_statuses() {
        let err: ServerError = EngineError::Validation("bad".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ServerError = EngineError::SessionNotFound("a:b".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: ServerError = EngineError::SessionAlreadyActive("a:b".into()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn persistence_failure_is_server_error() {
        let err: ServerError =
            EngineError::Persistence(HistoryError::Unavailable("down".into())).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_failure_is_unauthorized() {
        let err: ServerError = AuthError::MissingToken.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "no authentication token provided");
    }
}
