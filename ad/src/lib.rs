//! alarmdesk - lane-partitioned alarm scheduler
//!
//! A front desk ([`Intake`]) accepts alarm requests: a delay, a message and an
//! optional identifier. Each request is routed to a lane by its id, where it
//! is kept in expiry order. Every lane has a dispatcher that sleeps until the
//! earliest deadline (or until a more urgent request arrives) and a reporter
//! that emits periodic progress and the final expiry notification.
//!
//! # Core Concepts
//!
//! - **Lanes**: independent partitions, each with its own lock and wake signal
//! - **Timed waits**: dispatchers block on a signal with a deadline, never poll
//! - **Replace by id**: submitting a pending id supersedes it instead of duplicating
//! - **Events**: `Submitted`, `Progress`, `Expired`, `Cancelled` on a broadcast bus
//!
//! # Modules
//!
//! - [`domain`] - ids, bounded messages, the alarm entry
//! - [`store`] - expiry-ordered store for one lane
//! - [`signal`] - timed wait primitive
//! - [`lane`] - lane routing and snapshots
//! - [`engine`] - intake, dispatchers, reporters
//! - [`events`] - event types and bus
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface
//! - [`repl`] - interactive front end

pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod events;
pub mod lane;
pub mod repl;
pub mod signal;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use domain::{AlarmId, AlarmMessage, AlarmRequest, AlarmState, MessagePolicy, ValidationError};
pub use domain::{MAX_ALARM_ID, MAX_DELAY_SECS, MAX_MESSAGE_LEN};
pub use engine::{Accepted, AlarmEngine, CancelError, Cancelled, DispatchState, EngineConfig, Intake, SubmitError};
pub use events::{AlarmEvent, EventBus, LaneEmitter};
pub use lane::{Lane, LaneSnapshot, PendingAlarm};
pub use signal::{LaneSignal, Wake};
pub use store::AlarmStore;
