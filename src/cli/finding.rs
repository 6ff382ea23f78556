//! Findings commands

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;

use crate::cli::args::{ExportArgs, GlobalOptions};
use crate::cli::handlers::{run_list_command, write_export};
use crate::cli::{CommandContext, OutputFormat, PaginationArgs};
use crate::client::api::ScanExport;
use crate::client::payload::Record;
use crate::error::{Error, Result};
use crate::export::sort_by_severity;
use crate::models::FindingDisplay;
use crate::output::print_value;

/// Run the finding list command
pub async fn list(
    opts: &GlobalOptions,
    scan_id: &str,
    severity: Option<&str>,
    plugin_id: Option<&str>,
    sort: bool,
    pagination: &PaginationArgs,
) -> Result<()> {
    run_list_command::<Record, FindingDisplay, _, _>(
        opts,
        pagination,
        "findings",
        |client| async move {
            let mut findings = client
                .findings()
                .filter(scan_id, severity, plugin_id)
                .await?;
            if sort {
                sort_by_severity(&mut findings, true);
            }
            Ok(findings)
        },
    )
    .await
}

/// Run the finding summary command
pub async fn summary(opts: &GlobalOptions, scan_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let summary = ctx.client.findings().summary(scan_id).await?;
    print_value(&summary, ctx.format)
}

/// Run the finding export command for one scan
pub async fn export(opts: &GlobalOptions, scan_id: &str, out: &ExportArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let export = ctx.client.findings().export(scan_id).await?;
    let rows = export.rows();
    write_export(
        &out.plan(),
        &format!("findings_{}", scan_id),
        &export,
        &rows,
        ctx.format,
    )
}

/// Run the finding export-all command across every scan
pub async fn export_all(opts: &GlobalOptions, out: &ExportArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let findings = ctx.client.findings();
    let scans = ctx.client.scans();

    let bar = (ctx.format == OutputFormat::Table).then(|| {
        let pb = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{bar:30.cyan/blue} {pos}/{len} {msg}")
        {
            pb.set_style(style);
        }
        pb
    });

    let outcome = findings
        .export_all(scans, |index, total, scan_id| {
            if let Some(pb) = &bar {
                pb.set_length(total as u64);
                pb.set_position(index as u64);
                pb.set_message(scan_id.to_string());
            }
        })
        .await;
    if let Some(pb) = &bar {
        pb.finish_and_clear();
    }
    let outcome = outcome?;

    for failure in &outcome.failed {
        warn!("Export failed for scan {}: {}", failure.id, failure.error);
        if ctx.format == OutputFormat::Table {
            eprintln!("{} scan {}: {}", "✗".red(), failure.id, failure.error);
        }
    }
    if outcome.succeeded.is_empty() && !outcome.failed.is_empty() {
        return Err(Error::Other(format!(
            "findings export failed for all {} scans",
            outcome.failed.len()
        )));
    }

    let exports: Vec<ScanExport> = outcome.values();
    let rows: Vec<Record> = exports.iter().flat_map(ScanExport::rows).collect();
    write_export(&out.plan(), "findings_all", &exports, &rows, ctx.format)
}
