//! Accessors for loosely shaped WAS payloads
//!
//! Field names drift between API versions (`items` vs `scans`, `id` vs
//! `scan_id`). Each accessor takes the known candidate keys in preference
//! order and returns the first one present.

use serde_json::{Map, Value};

/// A JSON object as returned by the API.
pub type Record = Map<String, Value>;

/// Array under the first key in `keys` that holds one, or an empty list.
/// A bare top-level array is returned as-is.
pub fn items_under(value: &Value, keys: &[&str]) -> Vec<Value> {
    if let Value::Array(items) = value {
        return items.clone();
    }
    keys.iter()
        .find_map(|k| value.get(*k).and_then(Value::as_array))
        .cloned()
        .unwrap_or_default()
}

/// Same as [`items_under`] but takes ownership and skips non-objects.
pub fn records_under(value: Value, keys: &[&str]) -> Vec<Record> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => keys
            .iter()
            .find_map(|k| match map.remove(*k) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

/// First present key rendered as a string; numbers are stringified.
pub fn str_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match value.get(*k)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// First present key as an unsigned integer; numeric strings are accepted.
pub fn usize_field(value: &Value, keys: &[&str]) -> Option<usize> {
    keys.iter().find_map(|k| match value.get(*k)? {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Same as [`str_field`] for a record.
pub fn record_str(record: &Record, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match record.get(*k)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Parse comma-separated IDs, dropping blanks.
pub fn parse_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
