//! Live set and summary endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use dnote_common::intake::{AggregateSummary, Snapshot};
use dnote_common::ScanRecord;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    /// Acceptance order
    pub items: Vec<ScanRecord>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub removed: bool,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

/// GET /api/items
pub async fn list_items(State(state): State<AppState>) -> Json<ItemsResponse> {
    let controller = state.controller.lock().await;
    Json(ItemsResponse {
        items: controller.records().to_vec(),
        count: controller.len(),
    })
}

/// DELETE /api/items/:identity
///
/// Unknown identities are not an error.
pub async fn remove_item(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Json<RemoveResponse> {
    let mut controller = state.controller.lock().await;
    let removed = controller.remove(&identity).is_some();
    Json(RemoveResponse {
        removed,
        count: controller.len(),
    })
}

/// DELETE /api/items
pub async fn clear_items(State(state): State<AppState>) -> Json<ClearResponse> {
    let removed = state.controller.lock().await.clear();
    Json(ClearResponse { removed })
}

/// GET /api/summary
pub async fn get_summary(State(state): State<AppState>) -> Json<AggregateSummary> {
    Json(state.controller.lock().await.summary())
}

/// GET /api/snapshot
pub async fn get_snapshot(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.controller.lock().await.snapshot())
}
