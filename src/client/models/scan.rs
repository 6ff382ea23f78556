//! Scan models

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::flexible_id;

/// Scan resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    /// Scan ID (older payloads)
    #[serde(default, deserialize_with = "flexible_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Scan ID (v2 payloads)
    #[serde(default, deserialize_with = "flexible_id", skip_serializing_if = "Option::is_none")]
    pub scan_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Raw remote status (queued, running, completed, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Application or target the scan belongs to
    #[serde(default, deserialize_with = "flexible_id", skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,

    #[serde(default, deserialize_with = "flexible_id", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    /// Epoch seconds, numeric string or RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Value>,

    /// Fields this model does not name
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Scan {
    /// Identifier, preferring `scan_id` over `id`.
    pub fn id(&self) -> Option<&str> {
        self.scan_id.as_deref().or(self.id.as_deref())
    }

    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or("")
    }

    /// Seconds between start and end, clamped at zero.
    pub fn duration_seconds(&self) -> Option<i64> {
        let start = epoch_seconds(self.start_time.as_ref()?)?;
        let end = epoch_seconds(self.end_time.as_ref()?)?;
        Some((end - start).max(0))
    }

    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            scan_id: self.id().map(String::from),
            name: self.name.clone(),
            status: self.status.clone(),
            status_description: classify_status(self.status()),
            application: self.application.clone(),
            start: self.start_time.clone(),
            end: self.end_time.clone(),
            duration_seconds: self.duration_seconds(),
        }
    }
}

/// Condensed view of a scan for status reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    pub scan_id: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub status_description: String,
    pub application: Option<String>,
    pub start: Option<Value>,
    pub end: Option<Value>,
    pub duration_seconds: Option<i64>,
}

/// Human description of a raw scan status.
pub fn classify_status(status: &str) -> String {
    let normalized = status.trim().to_ascii_lowercase();
    let description = match normalized.as_str() {
        "" => "unknown",
        "queued" => "Queued (waiting to start)",
        "running" => "Running",
        "processing" => "Processing results",
        "completed" => "Completed successfully",
        "failed" => "Failed",
        "cancelled" => "Cancelled",
        _ => return format!("unknown ({})", status.trim()),
    };
    description.to_string()
}

/// Interpret a timestamp as epoch seconds.
///
/// Accepts integers, floats, numeric strings and RFC 3339 strings.
pub fn epoch_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                return Some(n);
            }
            if let Ok(f) = s.parse::<f64>() {
                return Some(f as i64);
            }
            DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.timestamp())
        }
        _ => None,
    }
}
