//! Severity ranking, sorting and grouping

use serde_json::Value;

use crate::client::payload::Record;

/// Known severities from most to least severe.
pub const SEVERITY_LEVELS: [&str; 5] = ["critical", "high", "medium", "low", "info"];

/// Numeric rank (critical 4 .. info 0); anything unrecognised is -1.
pub fn severity_rank(severity: Option<&str>) -> i32 {
    let Some(severity) = severity else {
        return -1;
    };
    match severity.trim().to_ascii_lowercase().as_str() {
        "critical" => 4,
        "high" => 3,
        "medium" => 2,
        "low" => 1,
        "info" => 0,
        _ => -1,
    }
}

fn record_severity(record: &Record) -> Option<&str> {
    record.get("severity").and_then(Value::as_str)
}

/// Stable sort on the `severity` field.
pub fn sort_by_severity(records: &mut [Record], most_severe_first: bool) {
    records.sort_by_key(|r| {
        let rank = severity_rank(record_severity(r));
        if most_severe_first { -rank } else { rank }
    });
}

/// Group by severity in rank order, with an `unknown` bucket last. Every
/// bucket is present even when empty.
pub fn group_by_severity(records: Vec<Record>) -> Vec<(&'static str, Vec<Record>)> {
    let mut groups: Vec<(&'static str, Vec<Record>)> = SEVERITY_LEVELS
        .iter()
        .chain(std::iter::once(&"unknown"))
        .map(|level| (*level, Vec::new()))
        .collect();

    for record in records {
        let rank = severity_rank(record_severity(&record));
        let slot = if rank < 0 {
            SEVERITY_LEVELS.len()
        } else {
            SEVERITY_LEVELS.len() - 1 - rank as usize
        };
        groups[slot].1.push(record);
    }
    groups
}

/// Count per severity, same ordering as [`group_by_severity`].
pub fn count_by_severity(records: &[Record]) -> Vec<(&'static str, usize)> {
    let mut counts: Vec<(&'static str, usize)> = SEVERITY_LEVELS
        .iter()
        .chain(std::iter::once(&"unknown"))
        .map(|level| (*level, 0))
        .collect();

    for record in records {
        let rank = severity_rank(record_severity(record));
        let slot = if rank < 0 {
            SEVERITY_LEVELS.len()
        } else {
            SEVERITY_LEVELS.len() - 1 - rank as usize
        };
        counts[slot].1 += 1;
    }
    counts
}
