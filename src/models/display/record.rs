//! Display models built from raw API records
//!
//! Field names differ between endpoints, so each column reads the first of a
//! few candidate keys.

use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use super::BLANK;
use crate::client::BatchFailure;
use crate::client::payload::{Record, record_str};
use crate::output::formatters::{colorize_severity, truncate};

fn cell(record: &Record, keys: &[&str]) -> String {
    record_str(record, keys).unwrap_or_else(|| BLANK.to_string())
}

fn cell_value(value: &Value, keys: &[&str]) -> String {
    match value {
        Value::Object(record) => cell(record, keys),
        _ => BLANK.to_string(),
    }
}

/// Finding row.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct FindingDisplay {
    #[tabled(rename = "FINDING ID")]
    pub id: String,

    #[tabled(rename = "SEVERITY")]
    pub severity: String,

    #[tabled(rename = "PLUGIN")]
    pub plugin_id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "URL")]
    pub url: String,
}

impl From<&Record> for FindingDisplay {
    fn from(finding: &Record) -> Self {
        Self {
            id: cell(finding, &["finding_id", "id"]),
            severity: colorize_severity(&cell(finding, &["severity"])),
            plugin_id: cell(finding, &["plugin_id"]),
            name: truncate(&cell(finding, &["name", "title", "description"]), 50),
            url: cell(finding, &["url", "uri"]),
        }
    }
}

/// Vulnerability row.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct VulnDisplay {
    #[tabled(rename = "VULN ID")]
    pub id: String,

    #[tabled(rename = "SEVERITY")]
    pub severity: String,

    #[tabled(rename = "PLUGIN")]
    pub plugin_id: String,

    #[tabled(rename = "STATE")]
    pub state: String,

    #[tabled(rename = "LAST SEEN")]
    pub last_seen: String,
}

impl From<&Value> for VulnDisplay {
    fn from(vuln: &Value) -> Self {
        Self {
            id: cell_value(vuln, &["vuln_id", "id"]),
            severity: colorize_severity(&cell_value(vuln, &["severity"])),
            plugin_id: cell_value(vuln, &["plugin_id"]),
            state: cell_value(vuln, &["state", "status"]),
            last_seen: cell_value(vuln, &["last_seen"]),
        }
    }
}

/// Plugin row.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct PluginDisplay {
    #[tabled(rename = "PLUGIN ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "FAMILY")]
    pub family: String,

    #[tabled(rename = "RISK")]
    pub risk: String,
}

impl From<&Record> for PluginDisplay {
    fn from(plugin: &Record) -> Self {
        Self {
            id: cell(plugin, &["plugin_id", "id"]),
            name: truncate(&cell(plugin, &["name"]), 60),
            family: cell(plugin, &["family"]),
            risk: cell(plugin, &["risk_factor", "severity"]),
        }
    }
}

/// System template, scan configuration or user template row.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct TemplateDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "DESCRIPTION")]
    pub description: String,
}

impl From<&Record> for TemplateDisplay {
    fn from(template: &Record) -> Self {
        Self {
            id: cell(
                template,
                &["user_template_id", "template_id", "config_id", "id"],
            ),
            name: cell(template, &["name"]),
            description: truncate(&cell(template, &["description"]), 60),
        }
    }
}

/// User row.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct UserDisplay {
    #[tabled(rename = "USER ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "EMAIL")]
    pub email: String,
}

impl From<&Record> for UserDisplay {
    fn from(user: &Record) -> Self {
        Self {
            id: cell(user, &["user_id", "id", "uuid"]),
            name: cell(user, &["name", "username"]),
            email: cell(user, &["email"]),
        }
    }
}

/// Folder row.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct FolderDisplay {
    #[tabled(rename = "FOLDER ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,
}

impl From<&Record> for FolderDisplay {
    fn from(folder: &Record) -> Self {
        Self {
            id: cell(folder, &["folder_id", "id"]),
            name: cell(folder, &["name"]),
        }
    }
}

/// Scan note row.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct NoteDisplay {
    #[tabled(rename = "SEVERITY")]
    pub severity: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "MESSAGE")]
    pub message: String,
}

impl From<&Record> for NoteDisplay {
    fn from(note: &Record) -> Self {
        Self {
            severity: colorize_severity(&cell(note, &["severity"])),
            title: cell(note, &["title"]),
            message: truncate(&cell(note, &["message"]), 70),
        }
    }
}

/// Failed item from a batch operation.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct FailureDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "ERROR")]
    pub error: String,
}

impl From<&BatchFailure> for FailureDisplay {
    fn from(failure: &BatchFailure) -> Self {
        Self {
            id: failure.id.clone(),
            status: failure
                .status
                .map_or_else(|| BLANK.to_string(), |s| s.to_string()),
            error: truncate(&failure.error, 80),
        }
    }
}
