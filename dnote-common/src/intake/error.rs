//! Intake rejection kinds
//!
//! Every kind is recoverable: the live set is left exactly as it was and the
//! caller may resubmit.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Field the validator requires on every record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RequiredField {
    Supplier,
    StockCode,
    Mass,
}

impl RequiredField {
    /// Payload key of this field
    pub fn key(&self) -> &'static str {
        match self {
            RequiredField::Supplier => "supplier",
            RequiredField::StockCode => "stockCode",
            RequiredField::Mass => "mass",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields.iter().map(RequiredField::key).collect::<Vec<_>>().join(", ")
}

/// Why an intake attempt was rejected
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntakeError {
    /// Decoded text is not a structured object
    #[error("malformed payload: {detail}")]
    MalformedPayload { raw: String, detail: String },

    /// One or more required fields absent or empty
    #[error("missing required field(s): {}", join_fields(.fields))]
    MissingRequiredField { fields: Vec<RequiredField> },

    /// Identity already in the live set
    #[error("item {identity} has already been scanned")]
    DuplicateScan { identity: String },

    /// Camera attempt inside the cooldown window
    #[error("please wait {retry_after_ms} ms between scans")]
    Throttled { retry_after_ms: u64 },
}

impl IntakeError {
    /// Stable machine-readable code, matching the serialized `code` tag
    pub fn code(&self) -> &'static str {
        match self {
            IntakeError::MalformedPayload { .. } => "MALFORMED_PAYLOAD",
            IntakeError::MissingRequiredField { .. } => "MISSING_REQUIRED_FIELD",
            IntakeError::DuplicateScan { .. } => "DUPLICATE_SCAN",
            IntakeError::Throttled { .. } => "THROTTLED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message_lists_keys() {
        let err = IntakeError::MissingRequiredField {
            fields: vec![RequiredField::Supplier, RequiredField::StockCode],
        };
        assert_eq!(err.to_string(), "missing required field(s): supplier, stockCode");
    }

    #[test]
    fn test_code_matches_serialized_tag() {
        let errors = vec![
            IntakeError::MalformedPayload {
                raw: "x".to_string(),
                detail: "bad".to_string(),
            },
            IntakeError::MissingRequiredField {
                fields: vec![RequiredField::Mass],
            },
            IntakeError::DuplicateScan {
                identity: "U1".to_string(),
            },
            IntakeError::Throttled { retry_after_ms: 1200 },
        ];

        for err in errors {
            let json = serde_json::to_value(&err).unwrap();
            assert_eq!(json["code"], err.code());
        }
    }

    #[test]
    fn test_missing_field_serializes_camel_case_keys() {
        let err = IntakeError::MissingRequiredField {
            fields: vec![RequiredField::StockCode],
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["fields"][0], "stockCode");
    }
}
