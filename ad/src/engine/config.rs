//! Engine configuration

use std::time::Duration;

use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};

use crate::domain::MessagePolicy;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of lanes; ids route by `id % lanes`
    #[serde(default = "default_lanes")]
    pub lanes: usize,

    /// Seconds between progress reports for the same head alarm
    #[serde(rename = "report-interval-secs", default = "default_report_interval_secs")]
    pub report_interval_secs: u64,

    /// How often a reporter looks at its lane, in milliseconds
    #[serde(rename = "reporter-poll-ms", default = "default_reporter_poll_ms")]
    pub reporter_poll_ms: u64,

    /// What to do with over-long messages
    #[serde(rename = "message-policy", default)]
    pub message_policy: MessagePolicy,

    /// Pending alarms a lane may hold before new ids are refused
    #[serde(rename = "max-pending-per-lane", default = "default_max_pending_per_lane")]
    pub max_pending_per_lane: usize,

    /// Event bus capacity
    #[serde(rename = "event-capacity", default = "default_event_capacity")]
    pub event_capacity: usize,

    /// How long shutdown waits for lane workers
    #[serde(rename = "shutdown-timeout-secs", default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_lanes() -> usize {
    2
}

fn default_report_interval_secs() -> u64 {
    2
}

fn default_reporter_poll_ms() -> u64 {
    250
}

fn default_max_pending_per_lane() -> usize {
    10_000
}

fn default_event_capacity() -> usize {
    crate::events::DEFAULT_CHANNEL_CAPACITY
}

fn default_shutdown_timeout_secs() -> u64 {
    5
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lanes: default_lanes(),
            report_interval_secs: default_report_interval_secs(),
            reporter_poll_ms: default_reporter_poll_ms(),
            message_policy: MessagePolicy::default(),
            max_pending_per_lane: default_max_pending_per_lane(),
            event_capacity: default_event_capacity(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl EngineConfig {
    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.lanes == 0 {
            return Err(eyre!("lanes must be at least 1"));
        }
        if self.report_interval_secs == 0 {
            return Err(eyre!("report-interval-secs must be at least 1"));
        }
        if self.reporter_poll_ms == 0 {
            return Err(eyre!("reporter-poll-ms must be at least 1"));
        }
        if self.max_pending_per_lane == 0 {
            return Err(eyre!("max-pending-per-lane must be at least 1"));
        }
        if self.event_capacity == 0 {
            return Err(eyre!("event-capacity must be at least 1"));
        }
        Ok(())
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }

    pub fn reporter_poll(&self) -> Duration {
        Duration::from_millis(self.reporter_poll_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
