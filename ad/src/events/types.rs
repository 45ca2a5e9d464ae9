//! Event types for alarm activity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::AlarmId;

/// Everything observable about an alarm's life
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AlarmEvent {
    /// Intake accepted a request (possibly replacing a pending one)
    Submitted {
        id: AlarmId,
        lane: usize,
        delay_secs: u64,
        message: String,
        replaced: bool,
    },
    /// Periodic report for the lane's earliest pending alarm
    Progress {
        id: AlarmId,
        lane: usize,
        seconds_remaining: u64,
        message: String,
    },
    /// The alarm's deadline elapsed and it was dispatched
    Expired {
        id: AlarmId,
        lane: usize,
        delay_secs: u64,
        message: String,
        expired_at: DateTime<Utc>,
    },
    /// A pending alarm was cancelled before its deadline
    Cancelled { id: AlarmId, lane: usize, message: String },
}

impl AlarmEvent {
    /// Alarm this event is about
    pub fn alarm_id(&self) -> AlarmId {
        match self {
            AlarmEvent::Submitted { id, .. }
            | AlarmEvent::Progress { id, .. }
            | AlarmEvent::Expired { id, .. }
            | AlarmEvent::Cancelled { id, .. } => *id,
        }
    }

    /// Lane the alarm belongs to
    pub fn lane(&self) -> usize {
        match self {
            AlarmEvent::Submitted { lane, .. }
            | AlarmEvent::Progress { lane, .. }
            | AlarmEvent::Expired { lane, .. }
            | AlarmEvent::Cancelled { lane, .. } => *lane,
        }
    }

    /// Event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            AlarmEvent::Submitted { .. } => "Submitted",
            AlarmEvent::Progress { .. } => "Progress",
            AlarmEvent::Expired { .. } => "Expired",
            AlarmEvent::Cancelled { .. } => "Cancelled",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AlarmEvent::Submitted { message, .. }
            | AlarmEvent::Progress { message, .. }
            | AlarmEvent::Expired { message, .. }
            | AlarmEvent::Cancelled { message, .. } => message,
        }
    }
}
