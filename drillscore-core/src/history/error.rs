//! History error types

use thiserror::Error;

/// Errors for finalized-session storage
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HistoryError::Unavailable("connection lock poisoned".into());
        assert_eq!(
            err.to_string(),
            "Store unavailable: connection lock poisoned"
        );
    }

    #[test]
    fn test_migration_error_display() {
        let err = HistoryError::Migration("v001_initial: syntax error".into());
        assert!(err.to_string().contains("v001_initial"));
    }
}
