//! Unique-token sources
//!
//! Identities for records that arrive without one (and for every manual form
//! entry) come from a [`TokenSource`].

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Supplier of opaque, session-unique identity tokens
pub trait TokenSource: Send + Sync {
    /// Return a token never handed out before by this source
    fn next_token(&self) -> String;
}

/// Random UUIDv4 tokens (hyphenated, lowercase)
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidTokenSource;

impl TokenSource for UuidTokenSource {
    fn next_token(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix>-<n>` tokens, counting up from 1
#[derive(Debug)]
pub struct SequentialTokenSource {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialTokenSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl TokenSource for SequentialTokenSource {
    fn next_token(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}
