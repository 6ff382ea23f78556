//! Reusable formatting utilities for CLI output
//!
//! Timestamps, durations and status colouring shared by the display models.

use chrono::{Local, TimeZone};
use colored::Colorize;
use serde_json::Value;

use crate::client::models::epoch_seconds;

/// Render a WAS timestamp (epoch seconds or RFC 3339) in local time.
///
/// Returns "N/A" when missing, zero or unparseable.
///
/// # Example output
/// `2025-01-15 14:30`
pub fn format_timestamp(value: Option<&Value>) -> String {
    let Some(secs) = value.and_then(epoch_seconds).filter(|s| *s > 0) else {
        return "N/A".to_string();
    };
    match Local.timestamp_opt(secs, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        _ => "N/A".to_string(),
    }
}

/// Format a duration in seconds as `2h 15m 30s`, `5m 10s` or `45s`.
///
/// Returns "N/A" when absent.
pub fn format_duration(seconds: Option<i64>) -> String {
    let Some(secs) = seconds.filter(|s| *s >= 0) else {
        return "N/A".to_string();
    };
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let rest = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, rest)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, rest)
    } else {
        format!("{}s", rest)
    }
}

/// Colour a raw scan status for terminal display.
pub fn colorize_status(status: &str) -> String {
    match status.to_ascii_lowercase().as_str() {
        "completed" => status.green().to_string(),
        "failed" => status.red().to_string(),
        "cancelled" => status.yellow().to_string(),
        "running" | "processing" => status.cyan().to_string(),
        _ => status.to_string(),
    }
}

/// Colour a severity label.
pub fn colorize_severity(severity: &str) -> String {
    match severity.to_ascii_lowercase().as_str() {
        "critical" => severity.red().bold().to_string(),
        "high" => severity.red().to_string(),
        "medium" => severity.yellow().to_string(),
        "low" => severity.blue().to_string(),
        _ => severity.to_string(),
    }
}

/// Shorten long text for table cells.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
