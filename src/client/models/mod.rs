//! WAS resource models
//!
//! Scans and applications get typed structs; every other resource is handled
//! as a raw [`Record`](crate::client::payload::Record). Unknown fields are kept
//! in `extra` so nothing the API adds is lost on the way to an export file.

mod app;
mod scan;

pub use app::{AppUrl, Application};
pub use scan::{Scan, ScanSummary, classify_status, epoch_seconds};

use serde::{Deserialize, Deserializer};

/// Accept an identifier sent either as a string or a number.
pub(crate) fn flexible_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdValue {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<IdValue>::deserialize(deserializer)? {
        Some(IdValue::Text(s)) if !s.is_empty() => Some(s),
        Some(IdValue::Int(n)) => Some(n.to_string()),
        Some(IdValue::Float(n)) => Some(n.to_string()),
        _ => None,
    })
}
