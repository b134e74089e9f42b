//! HTTP server module

mod api;
mod sessions;

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{AuthLayer, auth_middleware};
use crate::AppState;

pub use api::HealthResponse;
pub use sessions::{EndResponse, EventResponse, HistoryResponse, StartResponse};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>, auth: AuthLayer) -> Router {
    let session_routes = Router::new()
        .route("/sessions/start", post(sessions::start))
        .route("/sessions/event", post(sessions::event))
        .route("/sessions/end", post(sessions::end))
        .route("/sessions/me", get(sessions::history))
        .route_layer(from_fn_with_state(auth, auth_middleware));

    Router::new()
        .route("/health", get(api::health))
        .merge(session_routes)
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}
