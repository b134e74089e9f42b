//! Principal resolution middleware for axum

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use drillscore_core::{AuthConfig, AuthError, PrincipalId, TokenValidator};

use crate::ServerError;

/// Principal resolution state
#[derive(Clone)]
pub struct AuthLayer {
    validator: Option<Arc<TokenValidator>>,
    principal_header: String,
}

impl AuthLayer {
    /// Create a new AuthLayer with the given configuration
    pub fn new(config: &AuthConfig) -> Result<Self, ServerError> {
        if !config.is_valid() {
            return Err(ServerError::Config(
                "auth is enabled but no jwt_secret is set".to_string(),
            ));
        }

        let validator = config
            .enabled
            .then(|| Arc::new(TokenValidator::new(config)));

        Ok(Self {
            validator,
            principal_header: config.principal_header.to_ascii_lowercase(),
        })
    }

    /// Create a layer that trusts the principal header (for testing or local use)
    pub fn disabled() -> Self {
        Self {
            validator: None,
            principal_header: AuthConfig::default().principal_header,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.validator.is_some()
    }

    /// Resolve the caller's principal from request headers
    pub fn resolve(&self, headers: &HeaderMap) -> Result<PrincipalId, AuthError> {
        match &self.validator {
            Some(validator) => {
                let header = headers
                    .get(AUTHORIZATION)
                    .ok_or(AuthError::MissingToken)?
                    .to_str()
                    .map_err(|e| AuthError::InvalidFormat(e.to_string()))?;
                validator.validate_header(header)
            }
            None => Ok(headers
                .get(self.principal_header.as_str())
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(PrincipalId::new)
                .unwrap_or_else(PrincipalId::local)),
        }
    }
}

/// Authentication middleware function
///
/// Attaches the resolved [`PrincipalId`] to request extensions.
pub async fn auth_middleware(
    State(auth): State<AuthLayer>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let principal = auth.resolve(request.headers()).map_err(|e| {
        tracing::debug!("Principal resolution failed: {}", e);
        ServerError::Auth(e)
    })?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
