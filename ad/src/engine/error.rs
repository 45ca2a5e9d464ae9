//! Intake error types

use thiserror::Error;

use crate::domain::{AlarmId, ValidationError};

/// Reasons a submit is rejected. No store is changed when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Lane {lane} is full ({capacity} pending alarms)")]
    LaneFull { lane: usize, capacity: usize },

    #[error("Alarm engine is shutting down")]
    ShutDown,
}

/// Reasons a cancel does nothing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CancelError {
    #[error("No pending alarm with id {id}")]
    NotFound { id: AlarmId },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Alarm engine is shutting down")]
    ShutDown,
}
