//! drillscore-core: Procedure session evaluation engine
//!
//! This crate turns a stream of drilling telemetry into a deterministic
//! mistake log, running metrics and a final score:
//!
//! - **Evaluation** - [`Evaluator`] applies the drilling rules for one session
//! - **Registry** - [`SessionRegistry`] owns live sessions keyed by principal and session id
//! - **Routing** - [`EventRouter`] validates events and dispatches them to evaluators
//! - **Finalization** - [`Finalizer`] persists a [`Summary`] via a [`SummaryStore`]
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use drillscore_core::{
//!     EventRouter, Finalizer, MemorySummaryStore, PrincipalId, RegistryConfig, SessionRegistry,
//! };
//!
//! async fn example() -> Result<(), drillscore_core::EngineError> {
//!     let registry = Arc::new(SessionRegistry::new(RegistryConfig::default()));
//!     let router = EventRouter::new(Arc::clone(&registry));
//!     let finalizer = Finalizer::new(Arc::clone(&registry), Arc::new(MemorySummaryStore::new()));
//!     let principal = PrincipalId::new("student-1");
//!
//!     let start = serde_json::json!({
//!         "sessionId": "sess_0001",
//!         "procedureType": "ClassIComposite",
//!         "startedAt": "2025-03-01T09:00:00Z"
//!     });
//!     registry.start(&principal, drillscore_core::session::from_json(start)?).await?;
//!
//!     let feedback = router
//!         .handle(&principal, serde_json::json!({
//!             "sessionId": "sess_0001",
//!             "type": "STEP",
//!             "payload": { "step": "DRILLING" }
//!         }))
//!         .await?;
//!     println!("warn: {}", feedback.warn);
//!
//!     let end = serde_json::json!({
//!         "sessionId": "sess_0001",
//!         "procedureType": "ClassIComposite",
//!         "endedAt": "2025-03-01T09:00:42Z"
//!     });
//!     let done = finalizer.end(&principal, drillscore_core::session::from_json(end)?).await?;
//!     println!("final score: {}", done.summary.final_score);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod error;
pub mod evaluation;
pub mod events;
pub mod history;
pub mod session;

// Re-export key types for convenience
pub use auth::{AuthConfig, AuthError, PrincipalId, TokenValidator};
pub use error::EngineError;
pub use evaluation::{ErrorType, Evaluator, Evidence, Metrics, Mistake, Step, Summary};
pub use events::{EventEnvelope, EventFeedback, EventRouter, SessionEvent};
pub use history::{
    HistoryError, MemorySummaryStore, SessionRecord, SqliteSummaryStore, SummaryStore,
};
pub use session::{
    DuplicateStartPolicy, EndRequest, FinalizedSession, Finalizer, RegistryConfig, SessionKey,
    SessionRegistry, SessionSweeper, StartRequest,
};
