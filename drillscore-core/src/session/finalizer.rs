//! Session finalization
//!
//! Ending a session is two phases: `finalize` turns the evaluator into an
//! immutable [`Summary`]; `commit` hands the summary to the store and only then
//! removes the session. A failed commit leaves the session live so `end` can
//! be retried and yields the same summary for the same end time.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use super::registry::{LiveSession, SessionHandle, SessionKey, SessionRegistry};
use super::requests::EndRequest;
use crate::auth::PrincipalId;
use crate::error::EngineError;
use crate::evaluation::Summary;
use crate::history::{SessionRecord, SummaryStore};

/// Outcome of a successful `end`
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedSession {
    /// Durable identifier assigned by the store
    pub session_db_id: String,
    pub summary: Summary,
}

/// Drives live sessions to a persisted summary
pub struct Finalizer {
    registry: Arc<SessionRegistry>,
    store: Arc<dyn SummaryStore>,
}

impl Finalizer {
    pub fn new(registry: Arc<SessionRegistry>, store: Arc<dyn SummaryStore>) -> Self {
        Self { registry, store }
    }

    /// End a session: finalize, persist, then remove
    #[instrument(name = "session::end", skip(self, request), fields(session_id = %request.session_id))]
    pub async fn end(
        &self,
        principal: &PrincipalId,
        request: EndRequest,
    ) -> Result<FinalizedSession, EngineError> {
        let ended_at = request.validate()?;
        let key = SessionKey::new(principal.clone(), request.session_id);
        let handle = self.registry.require(&key).await?;

        // Held across the store write so concurrent calls on this session wait
        let mut session = handle.lock().await?;
        let summary = Self::finalize(&mut session, ended_at);
        let record = SessionRecord::from_summary(principal, request.procedure_type, &summary);
        let session_db_id = self.commit(&handle, record).await?;

        tracing::info!(
            %session_db_id,
            final_score = summary.final_score,
            duration_sec = summary.duration_sec,
            "Session ended"
        );

        Ok(FinalizedSession {
            session_db_id,
            summary,
        })
    }

    /// Stamp the end time and snapshot the evaluator
    pub fn finalize(session: &mut LiveSession, ended_at: DateTime<Utc>) -> Summary {
        let evaluator = session.evaluator_mut();
        evaluator.end(ended_at);
        evaluator.finalize()
    }

    /// Persist the record, then close and unregister the session
    async fn commit(
        &self,
        handle: &SessionHandle,
        record: SessionRecord,
    ) -> Result<String, EngineError> {
        if let Err(e) = self.store.save(&record).await {
            tracing::warn!(session = %handle.key(), error = %e, "Summary not persisted; session kept live");
            return Err(e.into());
        }

        handle.close();
        self.registry.remove_if_current(handle).await;
        Ok(record.id)
    }
}
