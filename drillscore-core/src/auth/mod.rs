//! Principal resolution for session requests
//!
//! The engine only ever sees an opaque [`PrincipalId`]. This module provides
//! the bearer-token validation used by the server to produce one.

mod config;
mod error;
mod principal;
mod validator;

pub use config::AuthConfig;
pub use error::AuthError;
pub use principal::PrincipalId;
pub use validator::{TokenClaims, TokenValidator};
