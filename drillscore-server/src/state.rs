//! Shared application state for the drillscore server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use drillscore_core::{
    EventRouter, Finalizer, MemorySummaryStore, RegistryConfig, SessionRegistry, SummaryStore,
};

/// Shared application state accessible by all handlers
pub struct AppState {
    /// Live sessions
    pub registry: Arc<SessionRegistry>,
    /// Dispatches telemetry events to live sessions
    pub router: EventRouter,
    /// Ends sessions and persists their summaries
    pub finalizer: Finalizer,
    /// Finalized session history
    pub store: Arc<dyn SummaryStore>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state around a registry configuration and a summary store
    pub fn new(config: RegistryConfig, store: Arc<dyn SummaryStore>) -> Self {
        let registry = Arc::new(SessionRegistry::new(config));
        Self {
            router: EventRouter::new(Arc::clone(&registry)),
            finalizer: Finalizer::new(Arc::clone(&registry), Arc::clone(&store)),
            registry,
            store,
            started_at: Utc::now(),
        }
    }

    /// In-memory store and default registry settings
    pub fn new_for_testing() -> Self {
        Self::new(RegistryConfig::default(), Arc::new(MemorySummaryStore::new()))
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
