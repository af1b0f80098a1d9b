//! Dedup ledger: the live set
//!
//! Records in acceptance order plus an identity → position index. The index is
//! rebuilt for the shifted tail on removal, so lookups stay O(1) while
//! insertion order (display order) is preserved.

use std::collections::HashMap;
use tracing::debug;

use super::IntakeError;
use crate::record::ScanRecord;

/// Ordered live set with identity index
#[derive(Debug, Default, Clone)]
pub struct DedupLedger {
    records: Vec<ScanRecord>,
    index: HashMap<String, usize>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` unless its identity is already present
    pub fn try_insert(&mut self, record: ScanRecord) -> Result<&ScanRecord, IntakeError> {
        if self.index.contains_key(record.identity()) {
            debug!("Duplicate identity {}", record.identity());
            return Err(IntakeError::DuplicateScan {
                identity: record.identity().to_string(),
            });
        }

        let position = self.records.len();
        self.index.insert(record.identity().to_string(), position);
        self.records.push(record);
        Ok(&self.records[position])
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.index.contains_key(identity)
    }

    pub fn get(&self, identity: &str) -> Option<&ScanRecord> {
        self.index.get(identity).map(|&position| &self.records[position])
    }

    /// Remove by identity; `None` when absent
    pub fn remove(&mut self, identity: &str) -> Option<ScanRecord> {
        let position = self.index.remove(identity)?;
        let removed = self.records.remove(position);

        for record in &self.records[position..] {
            if let Some(slot) = self.index.get_mut(record.identity()) {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    /// Drop every record, returning how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        self.index.clear();
        count
    }

    /// Records in acceptance order
    pub fn records(&self) -> &[ScanRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
