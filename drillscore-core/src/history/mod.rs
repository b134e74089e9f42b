//! Finalized session history
//!
//! The engine hands every finalized [`SessionRecord`] to a [`SummaryStore`].
//! Two stores are provided: [`MemorySummaryStore`] and [`SqliteSummaryStore`].

mod error;
mod migrations;
mod sqlite;
mod store;
mod types;

pub use error::HistoryError;
pub use sqlite::SqliteSummaryStore;
pub use store::{DEFAULT_HISTORY_LIMIT, MemorySummaryStore, SummaryStore};
pub use types::{RUBRIC_VERSION, SessionRecord};
