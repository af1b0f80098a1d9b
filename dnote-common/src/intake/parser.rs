//! Payload parser
//!
//! Turns raw decoded QR text into a [`CandidateRecord`], filling defaults for
//! identity, date and category. The candidate is not yet validated.

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use super::IntakeError;
use crate::record::Mass;
use crate::time::{today_display, Clock};
use crate::tokens::TokenSource;

/// Category assigned when a payload carries none
pub const DEFAULT_CATEGORY: &str = "Raw";

/// Payload keys, primary first
const IDENTITY_KEYS: &[&str] = &["uuid", "identity"];
const SUPPLIER_KEYS: &[&str] = &["supplier"];
const STOCK_CODE_KEYS: &[&str] = &["stockCode"];
const MASS_KEYS: &[&str] = &["mass"];
const DATE_KEYS: &[&str] = &["date"];
const CATEGORY_KEYS: &[&str] = &["type", "category"];

/// Parsed-but-not-yet-validated record
///
/// Identity, date and category are always filled (defaults applied);
/// supplier, stock code and mass stay optional until the validator runs.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub identity: String,
    pub supplier: Option<String>,
    pub stock_code: Option<String>,
    pub mass: Option<Mass>,
    pub date: String,
    pub category: String,
}

/// Fields as extracted from a payload or a manual form, before defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PartialRecord {
    pub identity: Option<String>,
    pub supplier: Option<String>,
    pub stock_code: Option<String>,
    pub mass: Option<Mass>,
    pub date: Option<String>,
    pub category: Option<String>,
}

/// Decodes candidate text and applies defaults
pub struct PayloadParser {
    clock: Arc<dyn Clock>,
    tokens: Arc<dyn TokenSource>,
    default_category: String,
}

impl PayloadParser {
    pub fn new(clock: Arc<dyn Clock>, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            clock,
            tokens,
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }

    /// Use `category` instead of `"Raw"` for payloads without one
    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = category.into();
        self
    }

    /// Decode `raw` as a JSON object and fill defaults
    ///
    /// Fails with [`IntakeError::MalformedPayload`] when the text is not JSON
    /// or is JSON but not an object.
    pub fn parse(&self, raw: &str) -> Result<CandidateRecord, IntakeError> {
        let value: Value = serde_json::from_str(raw).map_err(|e| IntakeError::MalformedPayload {
            raw: raw.to_string(),
            detail: e.to_string(),
        })?;

        match value {
            Value::Object(object) => Ok(self.fill_defaults(extract_fields(&object))),
            other => Err(IntakeError::MalformedPayload {
                raw: raw.to_string(),
                detail: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    /// Apply identity, date and category defaults
    pub(crate) fn fill_defaults(&self, fields: PartialRecord) -> CandidateRecord {
        let identity = non_blank(fields.identity).unwrap_or_else(|| {
            let token = self.tokens.next_token();
            debug!("Generated identity {} for payload without one", token);
            token
        });

        let date = non_blank(fields.date).unwrap_or_else(|| {
            let today = today_display(self.clock.as_ref());
            debug!("Defaulted date to {}", today);
            today
        });

        let category = non_blank(fields.category).unwrap_or_else(|| self.default_category.clone());

        CandidateRecord {
            identity,
            supplier: fields.supplier,
            stock_code: fields.stock_code,
            mass: fields.mass,
            date,
            category,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

/// Strings are kept, numbers become their decimal text, other shapes are absent
fn text_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match lookup(object, keys)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        other => {
            debug!("Ignoring {} in text field {:?}", json_kind(other), keys[0]);
            None
        }
    }
}

fn mass_field(object: &Map<String, Value>) -> Option<Mass> {
    match lookup(object, MASS_KEYS)? {
        Value::Number(n) => n.as_f64().map(Mass::Number),
        Value::String(s) => Some(Mass::Text(s.clone())),
        other => {
            debug!("Ignoring {} in mass field", json_kind(other));
            None
        }
    }
}

fn extract_fields(object: &Map<String, Value>) -> PartialRecord {
    PartialRecord {
        identity: text_field(object, IDENTITY_KEYS),
        supplier: text_field(object, SUPPLIER_KEYS),
        stock_code: text_field(object, STOCK_CODE_KEYS),
        mass: mass_field(object),
        date: text_field(object, DATE_KEYS),
        category: text_field(object, CATEGORY_KEYS),
    }
}
