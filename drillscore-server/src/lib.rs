//! drillscore-server - HTTP boundary for the session evaluation engine
//!
//! This crate owns the axum router, principal resolution, and the shared
//! [`AppState`] holding the session registry, event router and finalizer.

mod error;
pub mod http;
pub mod middleware;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use drillscore_core::{AuthConfig, SessionSweeper};
use tokio::net::TcpListener;

pub use error::{ErrorResponse, ServerError};
pub use http::create_router;
pub use middleware::{AuthLayer, auth_middleware};
pub use state::AppState;

/// Default port for the drillscore server
pub const DEFAULT_PORT: u16 = 7460;
/// Default host for the drillscore server
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// The main drillscore server
pub struct DrillScoreServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl DrillScoreServer {
    /// Create a server around prepared state
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        self.run_with_listener(listener).await
    }

    /// Run the server on an already-bound listener
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        let auth = AuthLayer::new(&self.config.auth)?;
        if auth.is_enabled() {
            tracing::info!("Bearer token authentication enabled");
        } else {
            tracing::warn!(
                header = %self.config.auth.principal_header,
                "Authentication disabled; trusting principal header"
            );
        }

        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        tracing::info!("drillscore server listening on {}", local_addr);

        let sweeper = SessionSweeper::spawn(Arc::clone(&self.state.registry));

        let router = create_router(self.state, auth);
        let result = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| ServerError::Internal(e.to_string()));

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }
        result
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Principal resolution settings
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            auth: AuthConfig::default(),
        }
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Returns the socket address string (e.g., "127.0.0.1:7460")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
