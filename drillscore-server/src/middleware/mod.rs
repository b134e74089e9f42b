//! HTTP middleware

mod auth;

pub use auth::{AuthLayer, auth_middleware};
