//! Validation errors raised at the Intake boundary

use thiserror::Error;

/// A request that fails validation is rejected before any store is touched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Delay must be non-negative, got {delay_secs}")]
    NegativeDelay { delay_secs: i64 },

    #[error("Delay of {delay_secs}s exceeds the maximum of {max}s")]
    DelayTooLong { delay_secs: i64, max: u64 },

    #[error("Message is {len} bytes, maximum is {max}")]
    MessageTooLong { len: usize, max: usize },

    #[error("Alarm id {id} exceeds the maximum of {max}")]
    IdOutOfRange { id: u64, max: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_too_long_display() {
        let err = ValidationError::MessageTooLong { len: 200, max: 128 };
        let msg = err.to_string();
        assert!(msg.contains("200"));
        assert!(msg.contains("128"));
    }

    #[test]
    fn test_negative_delay_display() {
        let err = ValidationError::NegativeDelay { delay_secs: -4 };
        assert_eq!(err.to_string(), "Delay must be non-negative, got -4");
    }
}
