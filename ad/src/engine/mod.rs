//! The alarm engine: intake, per-lane dispatchers and reporters
//!
//! ```text
//!  submit/cancel ──> Intake ──lock──> Lane[i].store ──signal──> Dispatcher[i]
//!                                          ^                        │ due alarm
//!                                          └──── poll ── Reporter[i] <┘
//! ```

mod config;
mod core;
mod dispatcher;
mod error;
mod intake;
mod reporter;

pub use config::EngineConfig;
pub use self::core::AlarmEngine;
pub use dispatcher::DispatchState;
pub use error::{CancelError, SubmitError};
pub use intake::{Accepted, Cancelled, Intake};
