//! The alarm entry held by a lane store

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::{AlarmId, AlarmMessage, ValidationError};

/// Largest delay Intake accepts (365 days)
pub const MAX_DELAY_SECS: u64 = 365 * 24 * 60 * 60;

/// Check a requested delay and convert it to whole seconds
pub fn validate_delay(delay_secs: i64) -> Result<u64, ValidationError> {
    if delay_secs < 0 {
        return Err(ValidationError::NegativeDelay { delay_secs });
    }
    let delay = delay_secs as u64;
    if delay > MAX_DELAY_SECS {
        return Err(ValidationError::DelayTooLong {
            delay_secs,
            max: MAX_DELAY_SECS,
        });
    }
    Ok(delay)
}

/// Lifecycle of an alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmState {
    /// Linked into a lane store, waiting for its deadline
    Pending,
    /// Removed by the dispatcher after its deadline elapsed
    Dispatched,
    /// Removed by a cancel request before its deadline
    Cancelled,
}

/// A validated alarm. Owned by exactly one lane store while pending.
#[derive(Debug, Clone)]
pub struct AlarmRequest {
    pub id: AlarmId,
    /// Lane tag, derived from `id`
    pub lane: usize,
    /// Changes every time the entry's content is superseded
    pub seq: u64,
    pub delay_secs: u64,
    pub message: AlarmMessage,
    pub submitted_at: Instant,
    pub expires_at: Instant,
    pub state: AlarmState,
}

impl AlarmRequest {
    /// Create a pending alarm due `delay_secs` after `now`
    pub fn new(id: AlarmId, lane: usize, seq: u64, delay_secs: u64, message: AlarmMessage, now: Instant) -> Self {
        Self {
            id,
            lane,
            seq,
            delay_secs,
            message,
            submitted_at: now,
            expires_at: now + Duration::from_secs(delay_secs),
            state: AlarmState::Pending,
        }
    }

    /// Replace content and deadline in place; the caller re-inserts the entry
    pub fn supersede(&mut self, seq: u64, delay_secs: u64, message: AlarmMessage, now: Instant) {
        self.seq = seq;
        self.delay_secs = delay_secs;
        self.message = message;
        self.submitted_at = now;
        self.expires_at = now + Duration::from_secs(delay_secs);
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.expires_at <= now
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }

    /// Whole seconds left, rounded up so a pending alarm never reports zero
    pub fn seconds_remaining(&self, now: Instant) -> u64 {
        let remaining = self.remaining(now);
        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
    }
}
