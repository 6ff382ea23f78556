//! JSON envelopes for command output

use chrono::Utc;
use serde::Serialize;

/// `{"data": ..., "meta": {...}}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub meta: Meta,
}

#[derive(Debug, Serialize)]
pub struct Meta {
    /// RFC 3339 generation time
    pub generated_at: String,
    pub version: &'static str,
    /// Item count when `data` is a list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(data: T) -> Self {
        let count = match serde_json::to_value(&data) {
            Ok(serde_json::Value::Array(items)) => Some(items.len()),
            _ => None,
        };
        Self {
            data,
            meta: Meta {
                generated_at: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION"),
                count,
            },
        }
    }
}

/// Pretty JSON envelope around `data`.
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&Envelope::new(data))
}
