//! Start/end request bodies and timestamp parsing

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::EngineError;

/// Shortest accepted client-supplied session id
pub const MIN_SESSION_ID_LEN: usize = 4;

/// Decode a JSON body, reporting failures as validation errors
pub fn from_json<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, EngineError> {
    serde_json::from_value(value).map_err(|e| EngineError::validation(e.to_string()))
}

/// Parse an ISO-8601 timestamp.
///
/// RFC 3339 with an offset is preferred; a timestamp without an offset is
/// read as UTC.
pub fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, EngineError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| EngineError::validation(format!("{} is not an ISO-8601 timestamp", field)))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub session_id: String,
    pub procedure_type: String,
    pub started_at: String,
}

impl StartRequest {
    /// Check the request and return the parsed start time
    pub fn validate(&self) -> Result<DateTime<Utc>, EngineError> {
        if self.session_id.chars().count() < MIN_SESSION_ID_LEN {
            return Err(EngineError::validation(format!(
                "sessionId must be at least {} characters",
                MIN_SESSION_ID_LEN
            )));
        }
        parse_timestamp("startedAt", &self.started_at)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndRequest {
    pub session_id: String,
    pub procedure_type: String,
    pub ended_at: String,
}

impl EndRequest {
    /// Check the request and return the parsed end time
    pub fn validate(&self) -> Result<DateTime<Utc>, EngineError> {
        parse_timestamp("endedAt", &self.ended_at)
    }
}
