//! Timed wait primitive
//!
//! A waiter blocks until either its deadline passes or someone signals.
//! Built on `tokio::sync::Notify`: a signal raised while nobody is waiting
//! is kept as a permit and consumed by the next wait, so a mutation made
//! between releasing the lane lock and starting the wait is never missed.

use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::trace;

/// Why a wait returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// Explicit signal from a store mutation
    Signalled,
    /// The deadline elapsed first
    TimedOut,
}

/// Single-consumer wake signal with an optional deadline
#[derive(Debug, Default)]
pub struct LaneSignal {
    notify: Notify,
}

impl LaneSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake the waiter, or leave a permit for the next wait
    pub fn notify(&self) {
        trace!("LaneSignal::notify: called");
        self.notify.notify_one();
    }

    /// Block until signalled, or until `deadline` if one is given
    pub async fn wait_until(&self, deadline: Option<Instant>) -> Wake {
        match deadline {
            None => {
                self.notify.notified().await;
                Wake::Signalled
            }
            Some(deadline) => match tokio::time::timeout_at(deadline, self.notify.notified()).await {
                Ok(()) => Wake::Signalled,
                Err(_) => Wake::TimedOut,
            },
        }
    }
}
