//! Summary storage trait and in-memory implementation

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::HistoryError;
use super::types::SessionRecord;
use crate::auth::PrincipalId;

/// Number of records returned by a history query when the caller has no preference
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Durable sink for finalized sessions
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Persist a finalized session
    async fn save(&self, record: &SessionRecord) -> Result<(), HistoryError>;

    /// Records of one principal, newest first
    async fn list_for_principal(
        &self,
        principal: &PrincipalId,
        limit: usize,
    ) -> Result<Vec<SessionRecord>, HistoryError>;
}

/// Process-local store; contents are lost on restart
#[derive(Default)]
pub struct MemorySummaryStore {
    records: RwLock<Vec<SessionRecord>>,
}

impl MemorySummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SummaryStore for MemorySummaryStore {
    async fn save(&self, record: &SessionRecord) -> Result<(), HistoryError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn list_for_principal(
        &self,
        principal: &PrincipalId,
        limit: usize,
    ) -> Result<Vec<SessionRecord>, HistoryError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .filter(|r| &r.principal_id == principal)
            .take(limit)
            .cloned()
            .collect())
    }
}
