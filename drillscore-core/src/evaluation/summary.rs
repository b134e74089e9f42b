//! Immutable outcome of a finished session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{Metrics, MistakesSummary};

/// Snapshot produced by [`super::Evaluator::finalize`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Whole seconds between start and end, floored
    pub duration_sec: u64,
    pub final_score: u32,
    pub mistakes_summary: MistakesSummary,
    pub metrics_summary: Metrics,
}
