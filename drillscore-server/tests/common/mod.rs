//! Shared test utilities for drillscore-server integration tests

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestResponse, TestServer};
use drillscore_core::{AuthConfig, MemorySummaryStore, RegistryConfig, SummaryStore};
use drillscore_server::{AppState, AuthLayer, create_router};
use serde_json::{Value, json};

pub const STARTED_AT: &str = "2025-03-01T09:00:00Z";

/// A router under test plus the state behind it
pub struct TestApp {
    pub server: TestServer,
    #[allow(dead_code)]
    pub state: Arc<AppState>,
}

/// Creates a test app with default settings and an in-memory store
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with(
        RegistryConfig::default(),
        Arc::new(MemorySummaryStore::new()),
        AuthLayer::disabled(),
    )
}

/// Creates a test app with token auth enabled
#[allow(dead_code)]
pub fn create_test_app_with_auth(secret: &str) -> TestApp {
    let auth = AuthLayer::new(&AuthConfig::with_secret(secret)).unwrap();
    create_test_app_with(
        RegistryConfig::default(),
        Arc::new(MemorySummaryStore::new()),
        auth,
    )
}

/// Creates a test app from explicit parts
pub fn create_test_app_with(
    config: RegistryConfig,
    store: Arc<dyn SummaryStore>,
    auth: AuthLayer,
) -> TestApp {
    let state = Arc::new(AppState::new(config, store));
    let server = TestServer::new(create_router(Arc::clone(&state), auth)).unwrap();
    TestApp { server, state }
}

fn principal_header(principal: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-principal-id"),
        HeaderValue::from_str(principal).unwrap(),
    )
}

impl TestApp {
    /// POST a JSON body as `principal`
    pub async fn post_as(&self, principal: &str, path: &str, body: Value) -> TestResponse {
        let (name, value) = principal_header(principal);
        self.server
            .post(path)
            .add_header(name, value)
            .json(&body)
            .await
    }

    #[allow(dead_code)]
    pub async fn start(&self, principal: &str, session_id: &str) -> TestResponse {
        self.post_as(
            principal,
            "/sessions/start",
            json!({
                "sessionId": session_id,
                "procedureType": "ClassIComposite",
                "startedAt": STARTED_AT
            }),
        )
        .await
    }

    #[allow(dead_code)]
    pub async fn event(
        &self,
        principal: &str,
        session_id: &str,
        kind: &str,
        payload: Value,
    ) -> TestResponse {
        self.post_as(
            principal,
            "/sessions/event",
            json!({ "sessionId": session_id, "type": kind, "payload": payload }),
        )
        .await
    }

    #[allow(dead_code)]
    pub async fn end(&self, principal: &str, session_id: &str, ended_at: &str) -> TestResponse {
        self.post_as(
            principal,
            "/sessions/end",
            json!({
                "sessionId": session_id,
                "procedureType": "ClassIComposite",
                "endedAt": ended_at
            }),
        )
        .await
    }

    #[allow(dead_code)]
    pub async fn history(&self, principal: &str) -> TestResponse {
        let (name, value) = principal_header(principal);
        self.server.get("/sessions/me").add_header(name, value).await
    }
}
