//! Configuration for principal resolution

use serde::{Deserialize, Serialize};

/// Default header carrying the principal when token auth is disabled
pub const DEFAULT_PRINCIPAL_HEADER: &str = "x-principal-id";

/// Configuration for bearer-token authentication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Whether bearer tokens are required
    #[serde(default)]
    pub enabled: bool,

    /// HS256 shared secret used to verify tokens
    #[serde(default)]
    pub jwt_secret: String,

    /// Header trusted for the principal when auth is disabled
    #[serde(default = "default_principal_header")]
    pub principal_header: String,

    /// Clock skew leeway in seconds for token expiry validation
    #[serde(default = "default_clock_skew")]
    pub clock_skew_seconds: u64,
}

fn default_principal_header() -> String {
    DEFAULT_PRINCIPAL_HEADER.to_string()
}

fn default_clock_skew() -> u64 {
    60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            jwt_secret: String::new(),
            principal_header: default_principal_header(),
            clock_skew_seconds: default_clock_skew(),
        }
    }
}

impl AuthConfig {
    /// Create an enabled config verifying tokens with `secret`
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            enabled: true,
            jwt_secret: secret.into(),
            ..Self::default()
        }
    }

    /// Check if the config is usable (a secret is required when enabled)
    pub fn is_valid(&self) -> bool {
        !self.enabled || !self.jwt_secret.is_empty()
    }
}
