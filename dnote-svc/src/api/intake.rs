//! Intake endpoints
//!
//! Each handler holds the controller lock for the whole attempt, so the
//! duplicate check and the append cannot interleave with another request.

use axum::{extract::State, http::StatusCode, Json};
use dnote_common::intake::{IntakeOutcome, ManualEntry};
use dnote_common::ScanRecord;
use serde::Deserialize;
use tracing::debug;

use crate::{ApiError, ApiResult, AppState};

/// Raw decoded QR text
#[derive(Debug, Deserialize)]
pub struct PayloadRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct DecodeErrorRequest {
    #[serde(default)]
    pub cause: String,
}

fn into_response(outcome: IntakeOutcome) -> ApiResult<(StatusCode, Json<ScanRecord>)> {
    match outcome {
        IntakeOutcome::Accepted(record) => Ok((StatusCode::CREATED, Json(record))),
        IntakeOutcome::Rejected(reason) => Err(ApiError::Intake(reason)),
    }
}

/// POST /api/scan
pub async fn submit_scan(
    State(state): State<AppState>,
    Json(request): Json<PayloadRequest>,
) -> ApiResult<(StatusCode, Json<ScanRecord>)> {
    let outcome = state.controller.lock().await.submit_scan(&request.text);
    into_response(outcome)
}

/// POST /api/manual/payload
pub async fn submit_manual_payload(
    State(state): State<AppState>,
    Json(request): Json<PayloadRequest>,
) -> ApiResult<(StatusCode, Json<ScanRecord>)> {
    let outcome = state
        .controller
        .lock()
        .await
        .submit_manual_payload(&request.text);
    into_response(outcome)
}

/// POST /api/manual
pub async fn submit_manual(
    State(state): State<AppState>,
    Json(entry): Json<ManualEntry>,
) -> ApiResult<(StatusCode, Json<ScanRecord>)> {
    let outcome = state.controller.lock().await.submit_manual(entry);
    into_response(outcome)
}

/// POST /api/decode-error
pub async fn decode_error(
    State(state): State<AppState>,
    Json(request): Json<DecodeErrorRequest>,
) -> StatusCode {
    debug!("Decoder reported failure");
    state.controller.lock().await.on_decode_error(&request.cause);
    StatusCode::NO_CONTENT
}
