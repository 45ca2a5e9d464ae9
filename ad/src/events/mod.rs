//! Event stream produced by the alarm engine
//!
//! Intake, the dispatchers and the reporters emit events; the front end (or
//! any other consumer) subscribes. Delivery goes through a
//! `tokio::sync::broadcast` channel, so every subscriber sees every event
//! emitted after it subscribed.
//!
//! ```text
//!   Intake            Reporter (per lane)
//!   - Submitted       - Progress
//!   - Cancelled       - Expired
//!        \               /
//!         v             v
//!        ┌───────────────┐
//!        │   EVENT BUS   │
//!        └───────────────┘
//!         |             |
//!         v             v
//!    REPL renderer   tests / other subscribers
//! ```

mod bus;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, LaneEmitter};
pub use types::AlarmEvent;
