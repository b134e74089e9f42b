//! Schema migrations for finalized session records
//!
//! The schema version lives in `PRAGMA user_version`. Each migration and its
//! version bump commit together, so a failed step leaves the previous version
//! and schema in place.

use rusqlite::Connection;

use crate::history::HistoryError;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial",
    sql: include_str!("v001_initial.sql"),
}];

/// Schema version recorded in the database
pub fn schema_version(conn: &Connection) -> Result<u32, HistoryError> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Bring the database up to the newest known schema, returning its version
pub fn migrate(conn: &mut Connection) -> Result<u32, HistoryError> {
    apply(conn, MIGRATIONS)
}

fn latest(migrations: &[Migration]) -> u32 {
    migrations.last().map_or(0, |m| m.version)
}

fn apply(conn: &mut Connection, migrations: &[Migration]) -> Result<u32, HistoryError> {
    let current = schema_version(conn)?;
    let target = latest(migrations);
    if current > target {
        return Err(HistoryError::Migration(format!(
            "database schema v{current} is newer than supported v{target}"
        )));
    }

    for migration in migrations.iter().filter(|m| m.version > current) {
        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql).map_err(|e| {
            HistoryError::Migration(format!(
                "v{:03}_{}: {}",
                migration.version, migration.name, e
            ))
        })?;
        tx.pragma_update(None, "user_version", migration.version)?;
        tx.commit()?;
        tracing::info!(version = migration.version, name = migration.name, "Applied migration");
    }

    schema_version(conn)
}
