//! Persisted session records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::PrincipalId;
use crate::evaluation::{Metrics, MistakesSummary, Summary};

/// Version of the scoring rules a record was produced with
pub const RUBRIC_VERSION: &str = "v1";

/// A finalized session as stored by a [`super::SummaryStore`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Durable identifier, returned to clients as `sessionDbId`
    pub id: String,
    pub principal_id: PrincipalId,
    pub procedure_type: String,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_sec: u64,
    pub final_score: u32,
    pub rubric_version: String,
    pub mistakes_summary: MistakesSummary,
    pub metrics_summary: Metrics,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Build a new record for `summary` with a fresh identifier
    pub fn from_summary(
        principal: &PrincipalId,
        procedure_type: impl Into<String>,
        summary: &Summary,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            principal_id: principal.clone(),
            procedure_type: procedure_type.into(),
            started_at: summary.started_at,
            ended_at: summary.ended_at,
            duration_sec: summary.duration_sec,
            final_score: summary.final_score,
            rubric_version: RUBRIC_VERSION.to_string(),
            mistakes_summary: summary.mistakes_summary.clone(),
            metrics_summary: summary.metrics_summary,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::ErrorType;

    #[test]
    fn from_summary_copies_outcome() {
        let mut mistakes = MistakesSummary::new();
        mistakes.insert(ErrorType::WrongTool, 2);
        let summary = Summary {
            started_at: None,
            ended_at: None,
            duration_sec: 12,
            final_score: 84,
            mistakes_summary: mistakes,
            metrics_summary: Metrics {
                max_depth_mm: 1.2,
                avg_angle_deg: 7.5,
            },
        };

        let record = SessionRecord::from_summary(&"u-1".into(), "ClassIComposite", &summary);
        assert_eq!(record.principal_id.as_str(), "u-1");
        assert_eq!(record.procedure_type, "ClassIComposite");
        assert_eq!(record.final_score, 84);
        assert_eq!(record.rubric_version, "v1");
        assert_eq!(record.mistakes_summary[&ErrorType::WrongTool], 2);
        assert!(Uuid::parse_str(&record.id).is_ok());
    }

    #[test]
    fn records_get_distinct_ids() {
        let summary = Summary {
            started_at: None,
            ended_at: None,
            duration_sec: 0,
            final_score: 100,
            mistakes_summary: MistakesSummary::new(),
            metrics_summary: Metrics::default(),
        };
        let a = SessionRecord::from_summary(&"u".into(), "p", &summary);
        let b = SessionRecord::from_summary(&"u".into(), "p", &summary);
        assert_ne!(a.id, b.id);
    }
}
