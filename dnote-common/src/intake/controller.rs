//! Intake controller
//!
//! Owns the live set and runs every intake attempt through
//! throttle → parser → validator → ledger, producing one [`IntakeOutcome`].
//! A rejected attempt leaves the live set exactly as it was.
//!
//! The controller is single-owner (`&mut self`); hosts that dispatch from
//! several threads must wrap it in one mutex so the ledger's index check and
//! append happen under the same lock.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::parser::PartialRecord;
use super::{aggregate, AggregateSummary, DedupLedger, IntakeError, PayloadParser, Validator};
use crate::config::IntakeConfig;
use crate::events::{EventBus, IntakeEvent};
use crate::record::{Mass, ScanRecord};
use crate::time::{Clock, SystemClock};
use crate::tokens::{TokenSource, UuidTokenSource};

/// Where an intake attempt came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeSource {
    /// Decoded camera frame; subject to the cooldown window
    Camera,
    /// QR text typed or pasted by the operator
    ManualPayload,
    /// Structured manual entry form
    ManualForm,
}

/// Result of one intake attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum IntakeOutcome {
    Accepted(ScanRecord),
    Rejected(IntakeError),
}

impl IntakeOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, IntakeOutcome::Accepted(_))
    }

    pub fn record(&self) -> Option<&ScanRecord> {
        match self {
            IntakeOutcome::Accepted(record) => Some(record),
            IntakeOutcome::Rejected(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&IntakeError> {
        match self {
            IntakeOutcome::Accepted(_) => None,
            IntakeOutcome::Rejected(reason) => Some(reason),
        }
    }
}

/// Manual form submission
///
/// No identity field: manual entries always get a fresh one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntry {
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub stock_code: Option<String>,
    #[serde(default)]
    pub mass: Option<Mass>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "type", alias = "category")]
    pub category: Option<String>,
}

/// Consistent read-only view for report exporters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Acceptance order
    pub records: Vec<ScanRecord>,
    pub summary: AggregateSummary,
}

/// Orchestrates parser, validator and ledger for one session
pub struct IntakeController {
    parser: PayloadParser,
    validator: Validator,
    ledger: DedupLedger,
    clock: Arc<dyn Clock>,
    cooldown: chrono::Duration,
    last_camera_attempt: Option<DateTime<Local>>,
    events: Option<EventBus>,
}

impl IntakeController {
    pub fn new(config: &IntakeConfig, clock: Arc<dyn Clock>, tokens: Arc<dyn TokenSource>) -> Self {
        let parser = PayloadParser::new(clock.clone(), tokens)
            .with_default_category(config.default_category.clone());

        Self {
            parser,
            validator: Validator::new(config.mass_policy),
            ledger: DedupLedger::new(),
            clock,
            cooldown: cooldown_window(config),
            last_camera_attempt: None,
            events: None,
        }
    }

    /// Controller on the system clock with UUID identities
    pub fn with_system_defaults(config: &IntakeConfig) -> Self {
        Self::new(config, Arc::new(SystemClock), Arc::new(UuidTokenSource))
    }

    /// Publish outcome and summary events on `bus`
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn event_bus(&self) -> Option<&EventBus> {
        self.events.as_ref()
    }

    /// Camera-driven scan: throttled, then parsed
    pub fn submit_scan(&mut self, raw: &str) -> IntakeOutcome {
        let result = self
            .check_throttle()
            .and_then(|()| self.parser.parse(raw))
            .and_then(|candidate| self.validator.check(candidate));
        self.finish(IntakeSource::Camera, result)
    }

    /// QR text entered by hand: parsed like a scan, never throttled
    pub fn submit_manual_payload(&mut self, raw: &str) -> IntakeOutcome {
        let result = self
            .parser
            .parse(raw)
            .and_then(|candidate| self.validator.check(candidate));
        self.finish(IntakeSource::ManualPayload, result)
    }

    /// Manual form entry: no decode step, controller-generated identity
    pub fn submit_manual(&mut self, entry: ManualEntry) -> IntakeOutcome {
        let candidate = self.parser.fill_defaults(PartialRecord {
            identity: None,
            supplier: entry.supplier,
            stock_code: entry.stock_code,
            mass: entry.mass,
            date: entry.date,
            category: entry.category,
        });
        let result = self.validator.check(candidate);
        self.finish(IntakeSource::ManualForm, result)
    }

    /// Decoder reported a failed frame; nothing for the core to do
    pub fn on_decode_error(&self, cause: &str) {
        debug!("Decode error ignored: {}", cause);
    }

    /// Remove a record by identity; absent identities are a no-op
    pub fn remove(&mut self, identity: &str) -> Option<ScanRecord> {
        let removed = self.ledger.remove(identity);
        match &removed {
            Some(record) => {
                info!("Removed {} ({}) from live set", record.identity(), record.stock_code());
                self.publish(IntakeEvent::ItemRemoved {
                    identity: identity.to_string(),
                    timestamp: self.timestamp(),
                });
                self.publish_summary();
            }
            None => debug!("Remove of unknown identity {} ignored", identity),
        }
        removed
    }

    /// Empty the live set (start a new delivery note)
    pub fn clear(&mut self) -> usize {
        let removed = self.ledger.clear();
        info!("Cleared {} record(s) from live set", removed);
        self.publish(IntakeEvent::SessionCleared {
            removed,
            timestamp: self.timestamp(),
        });
        self.publish_summary();
        removed
    }

    /// Live records in acceptance order
    pub fn records(&self) -> &[ScanRecord] {
        self.ledger.records()
    }

    pub fn get(&self, identity: &str) -> Option<&ScanRecord> {
        self.ledger.get(identity)
    }

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Freshly computed summary of the live set
    pub fn summary(&self) -> AggregateSummary {
        aggregate(self.ledger.records())
    }

    /// Records and their summary, taken together
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            records: self.ledger.records().to_vec(),
            summary: self.summary(),
        }
    }

    /// Fail with `Throttled` inside the cooldown; otherwise open a new window
    fn check_throttle(&mut self) -> Result<(), IntakeError> {
        let now = self.clock.now();
        if let Some(last) = self.last_camera_attempt {
            let elapsed = now.signed_duration_since(last);
            if elapsed < self.cooldown {
                let cooldown_ms = self.cooldown.num_milliseconds().max(0);
                let remaining = self
                    .cooldown
                    .checked_sub(&elapsed)
                    .map_or(cooldown_ms, |left| left.num_milliseconds())
                    .clamp(0, cooldown_ms);
                return Err(IntakeError::Throttled {
                    retry_after_ms: remaining as u64,
                });
            }
        }
        self.last_camera_attempt = Some(now);
        Ok(())
    }

    fn finish(&mut self, source: IntakeSource, result: Result<ScanRecord, IntakeError>) -> IntakeOutcome {
        let outcome = match result.and_then(|record| self.ledger.try_insert(record).cloned()) {
            Ok(record) => {
                info!(
                    "Accepted {} ({}, {} kg) via {:?}; {} item(s) in set",
                    record.identity(),
                    record.stock_code(),
                    record.mass(),
                    source,
                    self.ledger.len()
                );
                IntakeOutcome::Accepted(record)
            }
            Err(reason) => {
                warn!("Rejected {:?} intake: {}", source, reason);
                IntakeOutcome::Rejected(reason)
            }
        };

        match &outcome {
            IntakeOutcome::Accepted(record) => {
                self.publish(IntakeEvent::ScanAccepted {
                    record: record.clone(),
                    source,
                    timestamp: self.timestamp(),
                });
                self.publish_summary();
            }
            IntakeOutcome::Rejected(reason) => self.publish(IntakeEvent::ScanRejected {
                source,
                code: reason.code().to_string(),
                message: reason.to_string(),
                timestamp: self.timestamp(),
            }),
        }
        outcome
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }

    fn publish(&self, event: IntakeEvent) {
        if let Some(bus) = &self.events {
            bus.emit_lossy(event);
        }
    }

    fn publish_summary(&self) {
        if self.events.is_some() {
            self.publish(IntakeEvent::SummaryUpdated {
                summary: self.summary(),
                timestamp: self.timestamp(),
            });
        }
    }
}

/// Cooldown as a signed duration; values past its range saturate
fn cooldown_window(config: &IntakeConfig) -> chrono::Duration {
    chrono::Duration::from_std(config.cooldown()).unwrap_or_else(|_| {
        warn!(
            "Cooldown of {} ms out of range, using the maximum window",
            config.cooldown_ms
        );
        chrono::Duration::milliseconds(i64::MAX)
    })
}
