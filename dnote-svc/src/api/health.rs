//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Liveness plus a glance at the current session
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    /// Items in the live set
    pub items: usize,
    /// Connected SSE clients
    pub subscribers: usize,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let items = state.controller.lock().await.len();
    Json(HealthResponse {
        status: "ok",
        module: "dnote-svc",
        version: env!("CARGO_PKG_VERSION"),
        items,
        subscribers: state.events.subscriber_count(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
