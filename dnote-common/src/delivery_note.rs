//! Delivery note built from a session snapshot
//!
//! The note is a plain data document plus a text rendering; page layout and
//! PDF output belong to whatever exporter consumes it. Email is composed and
//! validated here but never sent.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

use crate::intake::{AggregateSummary, Snapshot};

/// Reasons a delivery note or email draft cannot be produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("No items scanned yet")]
    EmptyDeliveryNote,

    #[error("Missing {0} name")]
    MissingParty(&'static str),

    #[error("Recipient email address is required")]
    MissingRecipient,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
}

impl ReportError {
    pub fn code(&self) -> &'static str {
        match self {
            ReportError::EmptyDeliveryNote => "EMPTY_DELIVERY_NOTE",
            ReportError::MissingParty(_) => "MISSING_PARTY",
            ReportError::MissingRecipient => "MISSING_RECIPIENT",
            ReportError::InvalidEmail(_) => "INVALID_EMAIL",
        }
    }
}

/// Header fields entered by the operator
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryNoteRequest {
    #[serde(default)]
    pub from_location: String,
    #[serde(default)]
    pub to_location: String,
    #[serde(default)]
    pub dispatcher: String,
    #[serde(default)]
    pub receiver: String,
}

/// One item row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryNoteLine {
    pub identity: String,
    pub supplier: String,
    pub stock_code: String,
    /// Mass as received, with unit
    pub mass: String,
    pub date: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryNote {
    pub issued_at: DateTime<Local>,
    pub from_location: String,
    pub to_location: String,
    pub dispatcher: String,
    pub receiver: String,
    pub lines: Vec<DeliveryNoteLine>,
    pub summary: AggregateSummary,
    pub filename: String,
}

impl DeliveryNote {
    /// Build a note from `snapshot`, stamped `issued_at`
    pub fn build(
        snapshot: &Snapshot,
        request: DeliveryNoteRequest,
        issued_at: DateTime<Local>,
    ) -> Result<Self, ReportError> {
        if snapshot.records.is_empty() {
            return Err(ReportError::EmptyDeliveryNote);
        }
        if request.dispatcher.trim().is_empty() {
            return Err(ReportError::MissingParty("dispatcher"));
        }
        if request.receiver.trim().is_empty() {
            return Err(ReportError::MissingParty("receiver"));
        }

        let lines = snapshot
            .records
            .iter()
            .map(|record| DeliveryNoteLine {
                identity: record.identity().to_string(),
                supplier: record.supplier().to_string(),
                stock_code: record.stock_code().to_string(),
                mass: format!("{} kg", record.mass()),
                date: record.display_date(),
                category: record.category().to_string(),
            })
            .collect();

        let filename = note_filename(&request.from_location, &request.to_location, issued_at);

        Ok(Self {
            issued_at,
            from_location: request.from_location.trim().to_string(),
            to_location: request.to_location.trim().to_string(),
            dispatcher: request.dispatcher.trim().to_string(),
            receiver: request.receiver.trim().to_string(),
            lines,
            summary: snapshot.summary.clone(),
            filename,
        })
    }

    /// Plain-text rendering of the whole note
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "DELIVERY NOTE")?;
        writeln!(out, "Issued: {}", self.issued_at.format("%d/%m/%Y %H:%M"))?;
        writeln!(out, "From:   {}", self.from_location)?;
        writeln!(out, "To:     {}", self.to_location)?;
        writeln!(out)?;

        writeln!(
            out,
            "{:<20} {:<12} {:>12} {:<10} {}",
            "Supplier", "Stock Code", "Mass", "Date", "Type"
        )?;
        for line in &self.lines {
            writeln!(
                out,
                "{:<20} {:<12} {:>12} {:<10} {}",
                line.supplier, line.stock_code, line.mass, line.date, line.category
            )?;
        }
        writeln!(out)?;

        writeln!(out, "Summary by stock code")?;
        for group in &self.summary.groups {
            writeln!(out, "{:<20} {:>12} kg", group.stock_code, group.total_display)?;
        }
        writeln!(out, "{:<20} {:>12} kg", "TOTAL", self.summary.grand_total_display)?;
        writeln!(out)?;

        writeln!(out, "Dispatcher: {}", self.dispatcher)?;
        writeln!(out, "Receiver:   {}", self.receiver)
    }
}

/// `Delivery_Note_{from}_to_{to}_{yyyy-mm-dd}.pdf`
pub fn note_filename(from_location: &str, to_location: &str, issued_at: DateTime<Local>) -> String {
    format!(
        "Delivery_Note_{}_to_{}_{}.pdf",
        filename_safe(from_location.trim()),
        filename_safe(to_location.trim()),
        issued_at.format("%Y-%m-%d")
    )
}

fn filename_safe(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Email draft for sending a note
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmailDraft {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

/// What would be sent
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    pub to: String,
    pub subject: String,
    pub message: String,
    pub from_location: String,
    pub to_location: String,
    pub item_count: usize,
    pub attachment: String,
}

impl EmailDraft {
    pub fn validate(&self) -> Result<(), ReportError> {
        let to = self.to.trim();
        if to.is_empty() {
            return Err(ReportError::MissingRecipient);
        }
        if !is_valid_email(to) {
            return Err(ReportError::InvalidEmail(to.to_string()));
        }
        Ok(())
    }

    /// Validate and summarize the message carrying `note`
    pub fn compose(&self, note: &DeliveryNote) -> Result<EmailSummary, ReportError> {
        self.validate()?;
        Ok(EmailSummary {
            to: self.to.trim().to_string(),
            subject: self.subject.clone(),
            message: self.message.clone(),
            from_location: note.from_location.clone(),
            to_location: note.to_location.clone(),
            item_count: note.lines.len(),
            attachment: note.filename.clone(),
        })
    }
}

/// `local@domain.tld`: no whitespace, one `@`, a dot inside the domain
pub fn is_valid_email(address: &str) -> bool {
    if address.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = address.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
