//! Turning engine events into output lines

use chrono::Local;
use colored::Colorize;

use crate::cli::OutputFormat;
use crate::events::AlarmEvent;
use crate::lane::LaneSnapshot;

/// Format one event. Lanes are shown 1-based, as display threads.
pub fn render_event(event: &AlarmEvent, format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return serde_json::to_string(event).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e));
    }

    match event {
        AlarmEvent::Submitted {
            id,
            lane,
            delay_secs,
            message,
            replaced,
        } => {
            let verb = if *replaced { "Replaced" } else { "Accepted" };
            format!(
                "{} alarm ({}) for {}s [\"{}\"] on display lane {}",
                verb.green(),
                id,
                delay_secs,
                message,
                lane + 1
            )
        }
        AlarmEvent::Progress {
            id,
            lane,
            seconds_remaining,
            message,
        } => format!(
            "Display lane {}: {}s left for alarm ({}) [\"{}\"]",
            lane + 1,
            seconds_remaining.to_string().yellow(),
            id,
            message
        ),
        AlarmEvent::Expired {
            id,
            lane,
            delay_secs,
            message,
            expired_at,
        } => format!(
            "Display lane {}: {} at {} : alarm ({}) after {}s [\"{}\"]",
            lane + 1,
            "Expired".bright_red(),
            expired_at.with_timezone(&Local).format("%H:%M:%S"),
            id,
            delay_secs,
            message
        ),
        AlarmEvent::Cancelled { id, lane, message } => format!(
            "{} alarm ({}) on display lane {} [\"{}\"]",
            "Cancelled".cyan(),
            id,
            lane + 1,
            message
        ),
    }
}

/// Format the pending alarms of every lane
pub fn render_snapshot(snapshots: &[LaneSnapshot], format: OutputFormat) -> String {
    if format == OutputFormat::Json {
        return serde_json::to_string(snapshots).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e));
    }

    let mut lines = Vec::new();
    for snapshot in snapshots {
        lines.push(format!(
            "{} ({} pending)",
            format!("Lane {}", snapshot.lane + 1).bold(),
            snapshot.pending.len()
        ));
        for alarm in &snapshot.pending {
            lines.push(format!(
                "  ({}) {}s left of {}s [\"{}\"]",
                alarm.id, alarm.seconds_remaining, alarm.delay_secs, alarm.message
            ));
        }
    }
    lines.join("\n")
}
