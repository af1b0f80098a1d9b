//! Scan-intake and reconciliation pipeline
//!
//! Parser → Validator → Dedup Ledger, orchestrated by [`IntakeController`].
//! The [`aggregator`] folds the live set into per-stock-code totals on demand.

pub mod aggregator;
pub mod controller;
mod error;
pub mod ledger;
pub mod parser;
pub mod validator;

pub use aggregator::{aggregate, AggregateSummary, StockCodeTotal};
pub use controller::{IntakeController, IntakeOutcome, IntakeSource, ManualEntry, Snapshot};
pub use error::{IntakeError, RequiredField};
pub use ledger::DedupLedger;
pub use parser::{CandidateRecord, PayloadParser};
pub use validator::{MassPolicy, Validator};
