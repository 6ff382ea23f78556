//! JSON and CSV file writers plus output path resolution

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use super::flatten::display_scalar;
use crate::client::payload::Record;
use crate::error::Result;

/// `prefix_YYYY-MM-DDTHH-MM-SSZ.ext` for the current time.
pub fn timestamp_filename(prefix: &str, ext: &str) -> String {
    timestamp_filename_at(prefix, ext, Utc::now())
}

pub fn timestamp_filename_at(prefix: &str, ext: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}.{}",
        prefix,
        at.format("%Y-%m-%dT%H-%M-%SZ"),
        ext.trim_start_matches('.')
    )
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<PathBuf> {
    ensure_parent(path)?;
    let mut text = serde_json::to_string_pretty(data)?;
    text.push('\n');
    fs::write(path, text)?;
    info!("Wrote JSON to {}", path.display());
    Ok(path.to_path_buf())
}

/// Write flat rows as CSV.
///
/// The header is the sorted union of every row's keys; a key missing from a
/// row, or holding null, becomes an empty cell.
pub fn write_csv(path: &Path, rows: &[Record]) -> Result<PathBuf> {
    ensure_parent(path)?;
    let headers: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_path(path)?;
    if !headers.is_empty() {
        writer.write_record(&headers)?;
        for row in rows {
            writer.write_record(
                headers
                    .iter()
                    .map(|h| row.get(*h).map(display_scalar).unwrap_or_default()),
            )?;
        }
    }
    writer.flush()?;
    info!("Wrote {} CSV rows to {}", rows.len(), path.display());
    Ok(path.to_path_buf())
}

/// Where an export goes: an explicit path or a timestamped name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    Auto,
    Path(PathBuf),
}

impl FromStr for ExportTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            Err("output path cannot be empty".to_string())
        } else if s.eq_ignore_ascii_case("auto") {
            Ok(ExportTarget::Auto)
        } else {
            Ok(ExportTarget::Path(PathBuf::from(s)))
        }
    }
}

impl ExportTarget {
    pub fn resolve(&self, prefix: &str, ext: &str) -> PathBuf {
        match self {
            ExportTarget::Auto => PathBuf::from(timestamp_filename(prefix, ext)),
            ExportTarget::Path(path) => path.clone(),
        }
    }
}

/// Which files an export command produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    pub json: Option<ExportTarget>,
    pub csv: Option<ExportTarget>,
}

impl ExportPlan {
    /// Build from `--json-out` / `--csv-out`; neither means an automatic CSV.
    pub fn from_flags(json: Option<ExportTarget>, csv: Option<ExportTarget>) -> Self {
        match (json, csv) {
            (None, None) => Self {
                json: None,
                csv: Some(ExportTarget::Auto),
            },
            (json, csv) => Self { json, csv },
        }
    }

    /// Write `raw` as JSON and `rows` as CSV per the plan; returns written paths.
    pub fn write<T: Serialize + ?Sized>(
        &self,
        prefix: &str,
        raw: &T,
        rows: &[Record],
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        if let Some(target) = &self.json {
            written.push(write_json(&target.resolve(prefix, "json"), raw)?);
        }
        if let Some(target) = &self.csv {
            written.push(write_csv(&target.resolve(prefix, "csv"), rows)?);
        }
        Ok(written)
    }
}
