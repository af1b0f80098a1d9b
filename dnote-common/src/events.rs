//! Intake event types and event bus
//!
//! Every intake attempt produces exactly one `ScanAccepted` or `ScanRejected`
//! event; every change to the live set is followed by a `SummaryUpdated`.
//! Events are broadcast via [`EventBus`] and serialize for SSE transmission.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use crate::intake::{AggregateSummary, IntakeSource, Snapshot};
use crate::record::ScanRecord;

/// Intake event types
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum IntakeEvent {
    /// Record entered the live set
    ScanAccepted {
        record: ScanRecord,
        source: IntakeSource,
        timestamp: DateTime<Utc>,
    },

    /// Intake attempt rejected; live set unchanged
    ScanRejected {
        source: IntakeSource,
        /// Machine-readable rejection code (e.g. `DUPLICATE_SCAN`)
        code: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Record removed by identity
    ItemRemoved {
        identity: String,
        timestamp: DateTime<Utc>,
    },

    /// Live set emptied
    SessionCleared {
        removed: usize,
        timestamp: DateTime<Utc>,
    },

    /// Recomputed summary after any live-set change
    SummaryUpdated {
        summary: AggregateSummary,
        timestamp: DateTime<Utc>,
    },

    /// Full state, sent to each new subscriber on connection
    SessionSnapshot {
        snapshot: Snapshot,
        timestamp: DateTime<Utc>,
    },
}

impl IntakeEvent {
    /// Get event type as string for SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            IntakeEvent::ScanAccepted { .. } => "ScanAccepted",
            IntakeEvent::ScanRejected { .. } => "ScanRejected",
            IntakeEvent::ItemRemoved { .. } => "ItemRemoved",
            IntakeEvent::SessionCleared { .. } => "SessionCleared",
            IntakeEvent::SummaryUpdated { .. } => "SummaryUpdated",
            IntakeEvent::SessionSnapshot { .. } => "SessionSnapshot",
        }
    }
}

/// Central event distribution bus
///
/// Wraps a `tokio::sync::broadcast` channel:
/// - publishing never blocks; slow subscribers lag and lose old events
/// - any number of subscribers
/// - subscribers are cleaned up when dropped
///
/// Cloning shares the same channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<IntakeEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<IntakeEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: IntakeEvent) -> Result<usize, broadcast::error::SendError<IntakeEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: IntakeEvent) {
        if let Err(broadcast::error::SendError(event)) = self.tx.send(event) {
            trace!("No subscribers for {} event, dropped", event.event_type());
        }
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
