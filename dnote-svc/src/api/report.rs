//! Delivery note endpoints
//!
//! The snapshot is taken under the controller lock; the note is built after
//! the lock is released.

use axum::{extract::State, http::header, response::IntoResponse, Json};
use dnote_common::delivery_note::{DeliveryNote, DeliveryNoteRequest, EmailDraft, EmailSummary};
use dnote_common::time::Clock;
use serde::Deserialize;
use tracing::info;

use crate::{ApiResult, AppState};

/// Note header plus email draft
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub note: DeliveryNoteRequest,
    pub email: EmailDraft,
}

async fn build_note(state: &AppState, request: DeliveryNoteRequest) -> ApiResult<DeliveryNote> {
    let snapshot = state.controller.lock().await.snapshot();
    let note = DeliveryNote::build(&snapshot, request, state.clock.now())?;
    info!(
        "Built delivery note {} with {} item(s)",
        note.filename,
        note.lines.len()
    );
    Ok(note)
}

/// POST /api/delivery-note
pub async fn create_delivery_note(
    State(state): State<AppState>,
    Json(request): Json<DeliveryNoteRequest>,
) -> ApiResult<Json<DeliveryNote>> {
    Ok(Json(build_note(&state, request).await?))
}

/// POST /api/delivery-note/text
pub async fn render_delivery_note(
    State(state): State<AppState>,
    Json(request): Json<DeliveryNoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let note = build_note(&state, request).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        note.render_text(),
    ))
}

/// POST /api/delivery-note/email
///
/// Validates and summarizes; nothing is sent.
pub async fn compose_email(
    State(state): State<AppState>,
    Json(request): Json<EmailRequest>,
) -> ApiResult<Json<EmailSummary>> {
    request.email.validate()?;
    let note = build_note(&state, request.note).await?;
    Ok(Json(request.email.compose(&note)?))
}
