//! Operator command grammar
//!
//! ```text
//! <secs> Message(<id>) <text>   submit with an explicit id
//! <secs> <text>                 submit with a system-assigned id
//! Cancel: Message(<id>)         cancel a pending alarm
//! list | help | quit | exit
//! ```

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static SUBMIT_WITH_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\d+)\s+Message\((\d+)\)\s+(.+)$").expect("valid regex"));

static SUBMIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(-?\d+)\s+(.+)$").expect("valid regex"));

static CANCEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Cancel:\s*Message\((\d+)\)(?:\s.*)?$").expect("valid regex"));

/// A parsed operator line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Submit {
        delay_secs: i64,
        id: Option<u64>,
        message: String,
    },
    Cancel {
        id: u64,
    },
    List,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Bad command")]
    BadCommand,

    #[error("Number out of range: {0}")]
    NumberOutOfRange(String),
}

/// Parse one non-empty operator line
pub fn parse_command(line: &str) -> Result<ReplCommand, ParseError> {
    let line = line.trim();

    match line.to_lowercase().as_str() {
        "list" => return Ok(ReplCommand::List),
        "help" | "?" => return Ok(ReplCommand::Help),
        "quit" | "exit" => return Ok(ReplCommand::Quit),
        _ => {}
    }

    if let Some(caps) = CANCEL.captures(line) {
        return Ok(ReplCommand::Cancel { id: number(&caps[1])? });
    }

    if let Some(caps) = SUBMIT_WITH_ID.captures(line) {
        return Ok(ReplCommand::Submit {
            delay_secs: number(&caps[1])?,
            id: Some(number(&caps[2])?),
            message: caps[3].trim_end().to_string(),
        });
    }

    if let Some(caps) = SUBMIT.captures(line) {
        return Ok(ReplCommand::Submit {
            delay_secs: number(&caps[1])?,
            id: None,
            message: caps[2].trim_end().to_string(),
        });
    }

    Err(ParseError::BadCommand)
}

fn number<T: std::str::FromStr>(s: &str) -> Result<T, ParseError> {
    s.parse().map_err(|_| ParseError::NumberOutOfRange(s.to_string()))
}
