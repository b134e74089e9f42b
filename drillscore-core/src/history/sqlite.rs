//! SQLite-backed summary store

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::error::HistoryError;
use super::migrations;
use super::store::SummaryStore;
use super::types::SessionRecord;
use crate::auth::PrincipalId;

/// SQLite-backed summary store
pub struct SqliteSummaryStore {
    conn: Mutex<Connection>,
}

impl SqliteSummaryStore {
    /// Open or create database at path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HistoryError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, HistoryError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(mut conn: Connection) -> Result<Self, HistoryError> {
        migrations::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, HistoryError> {
        self.conn
            .lock()
            .map_err(|_| HistoryError::Unavailable("connection lock poisoned".into()))
    }

    /// Look up a single record by its durable id
    pub fn get(&self, id: &str) -> Result<Option<SessionRecord>, HistoryError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM session_records WHERE id = ?1", COLUMNS),
                [id],
                RawRecord::from_row,
            )
            .optional()?;
        row.map(RawRecord::into_record).transpose()
    }
}

const COLUMNS: &str = "id, principal_id, procedure_type, started_at, ended_at, duration_sec, \
     final_score, rubric_version, mistakes_summary, metrics_summary, created_at";

fn ts(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_ts(column: usize, value: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

/// Row as stored; JSON columns are decoded after the statement completes
struct RawRecord {
    id: String,
    principal_id: String,
    procedure_type: String,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    duration_sec: i64,
    final_score: i64,
    rubric_version: String,
    mistakes_summary: String,
    metrics_summary: String,
    created_at: DateTime<Utc>,
}

impl RawRecord {
    fn from_row(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        let started_at: Option<String> = row.get(3)?;
        let ended_at: Option<String> = row.get(4)?;
        let created_at: String = row.get(10)?;
        Ok(Self {
            id: row.get(0)?,
            principal_id: row.get(1)?,
            procedure_type: row.get(2)?,
            started_at: started_at.map(|s| parse_ts(3, &s)).transpose()?,
            ended_at: ended_at.map(|s| parse_ts(4, &s)).transpose()?,
            duration_sec: row.get(5)?,
            final_score: row.get(6)?,
            rubric_version: row.get(7)?,
            mistakes_summary: row.get(8)?,
            metrics_summary: row.get(9)?,
            created_at: parse_ts(10, &created_at)?,
        })
    }

    fn into_record(self) -> Result<SessionRecord, HistoryError> {
        Ok(SessionRecord {
            id: self.id,
            principal_id: PrincipalId::new(self.principal_id),
            procedure_type: self.procedure_type,
            started_at: self.started_at,
            ended_at: self.ended_at,
            duration_sec: self.duration_sec.max(0) as u64,
            final_score: self.final_score.clamp(0, u32::MAX as i64) as u32,
            rubric_version: self.rubric_version,
            mistakes_summary: serde_json::from_str(&self.mistakes_summary)?,
            metrics_summary: serde_json::from_str(&self.metrics_summary)?,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl SummaryStore for SqliteSummaryStore {
    async fn save(&self, record: &SessionRecord) -> Result<(), HistoryError> {
        let mistakes = serde_json::to_string(&record.mistakes_summary)?;
        let metrics = serde_json::to_string(&record.metrics_summary)?;

        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO session_records ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                COLUMNS
            ),
            params![
                record.id,
                record.principal_id.as_str(),
                record.procedure_type,
                record.started_at.as_ref().map(ts),
                record.ended_at.as_ref().map(ts),
                record.duration_sec as i64,
                record.final_score as i64,
                record.rubric_version,
                mistakes,
                metrics,
                ts(&record.created_at),
            ],
        )?;
        Ok(())
    }

    async fn list_for_principal(
        &self,
        principal: &PrincipalId,
        limit: usize,
    ) -> Result<Vec<SessionRecord>, HistoryError> {
        let raw = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM session_records WHERE principal_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT ?2",
                COLUMNS
            ))?;
            let rows = stmt.query_map(
                params![principal.as_str(), limit as i64],
                RawRecord::from_row,
            )?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        raw.into_iter().map(RawRecord::into_record).collect()
    }
}
