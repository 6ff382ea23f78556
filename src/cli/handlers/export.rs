//! Shared tail of the export commands: write files, report paths

use colored::Colorize;
use serde::Serialize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::client::payload::Record;
use crate::error::Result;
use crate::export::ExportPlan;
use crate::output::json;

/// Write `raw`/`rows` per `plan` and print the resulting paths.
pub fn write_export<T: Serialize + ?Sized>(
    plan: &ExportPlan,
    prefix: &str,
    raw: &T,
    rows: &[Record],
    format: OutputFormat,
) -> Result<()> {
    let written = plan.write(prefix, raw, rows)?;

    match format {
        OutputFormat::Json => {
            let files: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
            println!("{}", json::format_json(&json!({ "rows": rows.len(), "files": files }))?);
        }
        OutputFormat::Table => {
            for path in &written {
                println!("{} Wrote {}", "✓".green(), path.display());
            }
            eprintln!("{} rows exported", rows.len());
        }
    }
    Ok(())
}
