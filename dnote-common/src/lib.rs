//! # DNOTE Common Library
//!
//! Shared code for the delivery-note scan intake:
//! - Intake pipeline (parser, validator, dedup ledger, aggregator, controller)
//! - Scan records and display formatting
//! - Event types (IntakeEvent) and the event bus
//! - Delivery note assembly
//! - Configuration loading

pub mod config;
pub mod delivery_note;
pub mod display;
pub mod error;
pub mod events;
pub mod intake;
pub mod record;
pub mod time;
pub mod tokens;

pub use error::{Error, Result};
pub use record::{Mass, ScanRecord};
