//! Required-field validation
//!
//! Supplier and stock code must be non-empty; mass must be present and not
//! blank text (zero is fine). What "present" means beyond that depends on the
//! [`MassPolicy`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{CandidateRecord, IntakeError, RequiredField};
use crate::record::{Mass, ScanRecord};

/// How strictly a mass value is checked at intake
///
/// `Lenient` accepts any present mass and leaves numeric coercion to the
/// aggregator, so a non-numeric mass is accepted but adds zero to every
/// total. `Strict` rejects such records up front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MassPolicy {
    #[default]
    Lenient,
    Strict,
}

/// Confirms a candidate carries every required field
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    mass_policy: MassPolicy,
}

impl Validator {
    pub fn new(mass_policy: MassPolicy) -> Self {
        Self { mass_policy }
    }

    pub fn mass_policy(&self) -> MassPolicy {
        self.mass_policy
    }

    /// Turn a candidate into a record, or list every failing field
    pub fn check(&self, candidate: CandidateRecord) -> Result<ScanRecord, IntakeError> {
        let mut missing = Vec::new();

        let supplier = candidate.supplier.filter(|s| !s.trim().is_empty());
        if supplier.is_none() {
            missing.push(RequiredField::Supplier);
        }

        let stock_code = candidate.stock_code.filter(|s| !s.trim().is_empty());
        if stock_code.is_none() {
            missing.push(RequiredField::StockCode);
        }

        let mass = candidate
            .mass
            .filter(|m| !matches!(m, Mass::Text(text) if text.trim().is_empty()));
        let mass = match (mass, self.mass_policy) {
            (Some(mass), MassPolicy::Strict) if mass.strict_kg().is_none() => {
                debug!("Strict mass policy rejects mass {:?}", mass);
                None
            }
            (mass, _) => mass,
        };
        if mass.is_none() {
            missing.push(RequiredField::Mass);
        }

        match (supplier, stock_code, mass) {
            (Some(supplier), Some(stock_code), Some(mass)) => Ok(ScanRecord::new(
                candidate.identity,
                supplier,
                stock_code,
                mass,
                candidate.date,
                candidate.category,
            )),
            _ => Err(IntakeError::MissingRequiredField { fields: missing }),
        }
    }
}
