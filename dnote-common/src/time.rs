//! Clock abstraction
//!
//! The intake core never reads the system time directly. Default dates and the
//! camera throttle window both go through a [`Clock`], so tests can pin and
//! advance time deterministically.

use chrono::{DateTime, Local};
use std::sync::Mutex;

/// Date format used for defaulted and displayed record dates
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Source of the current local date and time
pub trait Clock: Send + Sync {
    /// Current local timestamp
    fn now(&self) -> DateTime<Local>;
}

/// Wall-clock time from the operating system
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that only moves when told to
///
/// Used by tests and by hosts that replay recorded scan sessions.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Move the clock forward by `by`
    pub fn advance(&self, by: chrono::Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }

    /// Jump to an absolute timestamp
    pub fn set(&self, to: DateTime<Local>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Today's date from `clock`, formatted as `dd/mm/yyyy`
pub fn today_display(clock: &dyn Clock) -> String {
    clock.now().format(DISPLAY_DATE_FORMAT).to_string()
}
