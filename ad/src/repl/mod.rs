//! Interactive front end for the alarm engine
//!
//! Reads operator lines, turns them into submit/cancel calls, and prints the
//! engine's events as they arrive.

mod parse;
mod render;
mod session;

pub use parse::{ParseError, ReplCommand, parse_command};
pub use render::{render_event, render_snapshot};
pub use session::ReplSession;

use eyre::{Context, Result};
use tracing::debug;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::engine::AlarmEngine;

/// Run the interactive prompt until EOF or `quit`
///
/// Must be called on a multi-threaded runtime: line reading blocks in place.
pub async fn run_interactive(config: &Config, format: OutputFormat) -> Result<()> {
    debug!(?format, "run_interactive: called");
    let engine = AlarmEngine::start(config.engine.clone()).context("Failed to start alarm engine")?;
    let events = engine.subscribe();

    let mut session = ReplSession::new(engine.intake(), format);
    let result = session.run(events).await;

    engine.shutdown().await.context("Failed to stop alarm engine")?;
    result
}
