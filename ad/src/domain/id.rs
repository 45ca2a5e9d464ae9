//! Alarm identifiers and lane routing

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Largest identifier Intake accepts
pub const MAX_ALARM_ID: u64 = i32::MAX as u64;

/// Identifier of an alarm, unique among the pending alarms of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlarmId(u64);

impl AlarmId {
    /// Validate a raw identifier against `MAX_ALARM_ID`
    pub fn new(raw: u64) -> Result<Self, ValidationError> {
        if raw > MAX_ALARM_ID {
            return Err(ValidationError::IdOutOfRange {
                id: raw,
                max: MAX_ALARM_ID,
            });
        }
        Ok(Self(raw))
    }

    /// Raw numeric value
    pub fn get(self) -> u64 {
        self.0
    }

    /// Lane this id routes to. Pure function of the id, so an id never
    /// lives in two lanes.
    pub fn lane(self, lane_count: usize) -> usize {
        let lanes = lane_count.max(1) as u64;
        (self.0 % lanes) as usize
    }
}

impl std::fmt::Display for AlarmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AlarmId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u64 = s.trim().parse().map_err(|_| format!("Invalid alarm id: {}", s))?;
        Self::new(raw).map_err(|e| e.to_string())
    }
}
