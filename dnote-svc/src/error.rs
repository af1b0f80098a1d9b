//! Error types for dnote-svc
//!
//! Every failure leaves the service as `{"error": {"code", "message"}}`,
//! with `fields` for missing-field rejections and `retry_after_ms` for
//! throttled scans.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use dnote_common::delivery_note::ReportError;
use dnote_common::intake::IntakeError;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Intake attempt rejected by the pipeline
    #[error(transparent)]
    Intake(#[from] IntakeError),

    /// Delivery note or email draft could not be produced
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// dnote-common error
    #[error("Common error: {0}")]
    Common(#[from] dnote_common::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Intake(IntakeError::MalformedPayload { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Intake(IntakeError::MissingRequiredField { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Intake(IntakeError::DuplicateScan { .. }) => StatusCode::CONFLICT,
            ApiError::Intake(IntakeError::Throttled { .. }) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Report(ReportError::EmptyDeliveryNote) => StatusCode::CONFLICT,
            ApiError::Report(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Intake(err) => err.code(),
            ApiError::Report(err) => err.code(),
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Common(_) => "COMMON_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let mut error = Map::new();
        error.insert("code".into(), json!(self.code()));
        error.insert("message".into(), json!(self.to_string()));

        let mut retry_after = None;
        match &self {
            ApiError::Intake(IntakeError::MissingRequiredField { fields }) => {
                let keys: Vec<&str> = fields.iter().map(|f| f.key()).collect();
                error.insert("fields".into(), json!(keys));
            }
            ApiError::Intake(IntakeError::Throttled { retry_after_ms }) => {
                error.insert("retry_after_ms".into(), json!(retry_after_ms));
                retry_after = Some(retry_after_ms.div_ceil(1000).max(1));
            }
            ApiError::Common(err) => tracing::error!("Request failed: {}", err),
            _ => {}
        }

        let body = Json(json!({ "error": Value::Object(error) }));
        let mut response = (status, body).into_response();
        if let Some(seconds) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
