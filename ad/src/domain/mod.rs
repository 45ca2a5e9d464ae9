//! Domain types for alarm scheduling
//!
//! Everything Intake validates lives here: identifiers, bounded messages,
//! delays, and the alarm entry itself.

mod alarm;
mod error;
mod id;
mod message;

pub use alarm::{AlarmRequest, AlarmState, MAX_DELAY_SECS, validate_delay};
pub use error::ValidationError;
pub use id::{AlarmId, MAX_ALARM_ID};
pub use message::{AlarmMessage, MAX_MESSAGE_LEN, MessagePolicy};
