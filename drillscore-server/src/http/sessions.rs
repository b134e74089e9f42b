//! Session REST API endpoints

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use drillscore_core::evaluation::MistakesSummary;
use drillscore_core::history::DEFAULT_HISTORY_LIMIT;
use drillscore_core::session::from_json;
use drillscore_core::{EventFeedback, Metrics, PrincipalId, SessionRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AppState, ServerError};

#[derive(Debug, Serialize, Deserialize)]
pub struct StartResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub feedback: EventFeedback,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndResponse {
    pub ok: bool,
    pub session_db_id: String,
    pub duration_sec: u64,
    pub final_score: u32,
    pub mistakes_summary: MistakesSummary,
    pub metrics_summary: Metrics,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub ok: bool,
    pub sessions: Vec<SessionRecord>,
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ServerError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ServerError::InvalidMessage(rejection.body_text()))
}

/// POST /sessions/start
pub async fn start(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<PrincipalId>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StartResponse>, ServerError> {
    let request = from_json(json_body(body)?)?;
    state.registry.start(&principal, request).await?;
    Ok(Json(StartResponse { ok: true }))
}

/// POST /sessions/event
pub async fn event(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<PrincipalId>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EventResponse>, ServerError> {
    let feedback = state.router.handle(&principal, json_body(body)?).await?;
    Ok(Json(EventResponse { ok: true, feedback }))
}

/// POST /sessions/end
pub async fn end(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<PrincipalId>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EndResponse>, ServerError> {
    let request = from_json(json_body(body)?)?;
    let done = state.finalizer.end(&principal, request).await?;

    Ok(Json(EndResponse {
        ok: true,
        session_db_id: done.session_db_id,
        duration_sec: done.summary.duration_sec,
        final_score: done.summary.final_score,
        mistakes_summary: done.summary.mistakes_summary,
        metrics_summary: done.summary.metrics_summary,
    }))
}

/// GET /sessions/me
pub async fn history(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<PrincipalId>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let sessions = state
        .store
        .list_for_principal(&principal, DEFAULT_HISTORY_LIMIT)
        .await?;
    Ok(Json(HistoryResponse { ok: true, sessions }))
}
