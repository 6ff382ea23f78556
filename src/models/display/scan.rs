//! Scan display model

use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use super::BLANK;
use crate::client::models::Scan;
use crate::output::formatters::{colorize_status, format_duration, format_timestamp};

/// Scan row for table output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ScanDisplay {
    #[tabled(rename = "SCAN ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "APPLICATION")]
    pub application: String,

    #[tabled(rename = "STARTED")]
    pub started: String,

    #[tabled(rename = "DURATION")]
    pub duration: String,

    /// Filled only after owner enrichment
    #[tabled(rename = "OWNER")]
    pub owner: String,
}

impl From<&Scan> for ScanDisplay {
    fn from(scan: &Scan) -> Self {
        let owner = scan
            .extra
            .get("owner_email")
            .or_else(|| scan.extra.get("owner_name"))
            .and_then(Value::as_str)
            .or(scan.owner_id.as_deref())
            .unwrap_or(BLANK);

        Self {
            id: scan.id().unwrap_or(BLANK).to_string(),
            name: scan.name.clone().unwrap_or_else(|| BLANK.to_string()),
            status: colorize_status(scan.status.as_deref().unwrap_or(BLANK)),
            application: scan
                .application
                .clone()
                .unwrap_or_else(|| BLANK.to_string()),
            started: format_timestamp(scan.start_time.as_ref()),
            duration: format_duration(scan.duration_seconds()),
            owner: owner.to_string(),
        }
    }
}
