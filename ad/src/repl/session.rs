//! REPL session management

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use super::parse::{ReplCommand, parse_command};
use super::render::{render_event, render_snapshot};
use crate::cli::OutputFormat;
use crate::engine::Intake;
use crate::events::AlarmEvent;

const HELP: &str = "\
Commands:
  <secs> Message(<id>) <text>   schedule (or replace) alarm <id>
  <secs> <text>                 schedule with the next free id
  Cancel: Message(<id>)         cancel a pending alarm
  list                          show pending alarms per lane
  help                          show this help
  quit | exit                   leave";

/// Result of handling one line
enum LineResult {
    Continue,
    Quit,
}

/// Interactive alarm prompt
pub struct ReplSession {
    intake: Intake,
    format: OutputFormat,
}

impl ReplSession {
    pub fn new(intake: Intake, format: OutputFormat) -> Self {
        Self { intake, format }
    }

    /// Run the prompt, printing engine events as they arrive
    pub async fn run(&mut self, mut events: broadcast::Receiver<AlarmEvent>) -> Result<()> {
        let format = self.format;
        let printer = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => println!("{}", render_event(&event, format)),
                    Err(RecvError::Lagged(missed)) => warn!(missed, "Event printer lagged"),
                    Err(RecvError::Closed) => break,
                }
            }
        });

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            // readline blocks; keep the runtime's other tasks moving meanwhile
            let readline = tokio::task::block_in_place(|| rl.readline("alarm> "));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    match self.handle_line(input).await {
                        LineResult::Continue => continue,
                        LineResult::Quit => break,
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    printer.abort();
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        printer.abort();
        Ok(())
    }

    async fn handle_line(&self, input: &str) -> LineResult {
        debug!(%input, "ReplSession::handle_line: called");
        let command = match parse_command(input) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e.to_string().red());
                return LineResult::Continue;
            }
        };

        match command {
            ReplCommand::Submit {
                delay_secs,
                id,
                message,
            } => {
                // acceptance is printed from the Submitted event
                if let Err(e) = self.intake.submit(id, delay_secs, &message).await {
                    eprintln!("{} {}", "Rejected:".red(), e);
                }
            }
            ReplCommand::Cancel { id } => {
                if let Err(e) = self.intake.cancel(id).await {
                    eprintln!("{} {}", "Not cancelled:".red(), e);
                }
            }
            ReplCommand::List => {
                let snapshots = self.intake.snapshot().await;
                println!("{}", render_snapshot(&snapshots, self.format));
            }
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Quit => return LineResult::Quit,
        }
        LineResult::Continue
    }
}
