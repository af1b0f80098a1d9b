//! Accepted scan records
//!
//! A [`ScanRecord`] only comes into existence through the intake pipeline
//! (validator + dedup ledger). It has no setters: the live set is append/remove
//! only, so a record's fields never change after acceptance.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::display::normalize_display_date;

/// Mass in kilograms, kept exactly as it arrived
///
/// QR payloads carry mass either as a JSON number or as text. The original
/// value is preserved for display; arithmetic goes through
/// [`Mass::coerced_kg`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Mass {
    Number(f64),
    Text(String),
}

impl Mass {
    /// Numeric value for aggregation
    ///
    /// Non-finite numbers and text without a numeric prefix count as zero.
    /// Text is read leniently: leading whitespace is skipped and the longest
    /// numeric prefix is used, so `"12.5kg"` yields `12.5`.
    pub fn coerced_kg(&self) -> f64 {
        match self {
            Mass::Number(n) if n.is_finite() => *n,
            Mass::Number(_) => 0.0,
            Mass::Text(text) => parse_leading_float(text)
                .filter(|n| n.is_finite())
                .unwrap_or(0.0),
        }
    }

    /// Numeric value only if the whole value is a finite, non-negative number
    pub fn strict_kg(&self) -> Option<f64> {
        let value = match self {
            Mass::Number(n) => *n,
            Mass::Text(text) => {
                let trimmed = text.trim();
                // Rust's float parser accepts "inf"/"nan"; neither is a mass.
                if !trimmed.starts_with(|c: char| c.is_ascii_digit() || c == '.' || c == '+') {
                    return None;
                }
                trimmed.parse::<f64>().ok()?
            }
        };
        (value.is_finite() && value >= 0.0).then_some(value)
    }
}

impl fmt::Display for Mass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mass::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Mass::Number(n) => write!(f, "{}", n),
            Mass::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for Mass {
    fn from(value: f64) -> Self {
        Mass::Number(value)
    }
}

impl From<&str> for Mass {
    fn from(value: &str) -> Self {
        Mass::Text(value.to_string())
    }
}

/// Parse the longest float-looking prefix of `text`
fn parse_leading_float(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    let candidate = &s[..end];
    // "5." and ".5" are fine for Rust's parser; a bare sign was excluded above
    candidate.trim_end_matches('.').parse::<f64>().ok().or_else(|| candidate.parse().ok())
}

/// One accepted stock item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    #[serde(rename = "uuid")]
    identity: String,
    supplier: String,
    stock_code: String,
    mass: Mass,
    date: String,
    #[serde(rename = "type")]
    category: String,
}

impl ScanRecord {
    pub(crate) fn new(
        identity: String,
        supplier: String,
        stock_code: String,
        mass: Mass,
        date: String,
        category: String,
    ) -> Self {
        Self {
            identity,
            supplier,
            stock_code,
            mass,
            date,
            category,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn stock_code(&self) -> &str {
        &self.stock_code
    }

    pub fn mass(&self) -> &Mass {
        &self.mass
    }

    /// Date text exactly as received (or as defaulted)
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Date normalized to `dd/mm/yyyy` where recognizable
    pub fn display_date(&self) -> String {
        normalize_display_date(&self.date)
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}
