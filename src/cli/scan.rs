//! Scan commands

use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::cli::args::GlobalOptions;
use crate::cli::handlers::{collect_ids, report_batch, run_list_command};
use crate::cli::{CommandContext, OutputFormat, PaginationArgs};
use crate::client::PollOptions;
use crate::client::models::Scan;
use crate::client::payload::Record;
use crate::error::{Error, Result};
use crate::models::{NoteDisplay, ScanDisplay};
use crate::output::{print_rows, print_value};

/// Run the scan list command
pub async fn list(
    opts: &GlobalOptions,
    status: Option<&str>,
    with_owners: bool,
    pagination: &PaginationArgs,
) -> Result<()> {
    let status = status.map(str::to_string);
    let page_size = pagination.page_size;

    run_list_command::<Scan, ScanDisplay, _, _>(opts, pagination, "scans", |client| async move {
        let mut scans_api = client.scans();
        if let Some(size) = page_size {
            scans_api = scans_api.page_size(size);
        }

        let scans = scans_api.list().await?;
        let scans = apply_status_filter(scans, status.as_deref());
        if with_owners {
            client.users().enrich_scans(scans).await
        } else {
            Ok(scans)
        }
    })
    .await
}

fn apply_status_filter(scans: Vec<Scan>, status: Option<&str>) -> Vec<Scan> {
    match status {
        Some(wanted) => scans
            .into_iter()
            .filter(|s| s.status().eq_ignore_ascii_case(wanted))
            .collect(),
        None => scans,
    }
}

/// Run the scan get command
pub async fn get(opts: &GlobalOptions, scan_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let scan = ctx.client.scans().get(scan_id).await?;
    print_value(&scan, ctx.format)
}

/// Run the scan summary command
pub async fn summary(opts: &GlobalOptions, scan_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let summary = ctx.client.scans().summary(scan_id).await?;
    print_value(&summary, ctx.format)
}

/// Run the scan launch command, optionally waiting for the result
pub async fn launch(opts: &GlobalOptions, scan_id: &str, wait: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let response = ctx.client.scans().launch(scan_id).await?;

    if ctx.format == OutputFormat::Table {
        eprintln!("{} Launched scan {}", "✓".green(), scan_id.bold());
    }
    if !wait {
        return print_value(&response, ctx.format);
    }

    let options = ctx.config.poll_options();
    wait_and_report(&ctx, scan_id, options).await
}

/// Run the scan wait command
pub async fn wait(
    opts: &GlobalOptions,
    scan_id: &str,
    interval_secs: Option<u64>,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let mut options = ctx.config.poll_options();
    if let Some(secs) = interval_secs {
        options = options.interval(Duration::from_secs(secs));
    }
    if let Some(secs) = timeout_secs {
        options = options.timeout(Duration::from_secs(secs));
    }
    wait_and_report(&ctx, scan_id, options).await
}

async fn wait_and_report(
    ctx: &CommandContext,
    scan_id: &str,
    options: PollOptions,
) -> Result<()> {
    debug!(
        "Polling scan {} every {:?} (timeout {:?})",
        scan_id, options.interval, options.timeout
    );

    let spinner = (ctx.format == OutputFormat::Table).then(|| {
        let pb = ProgressBar::new_spinner();
        let template = "{spinner:.cyan} {msg} [{elapsed}]";
        if let Ok(style) = ProgressStyle::default_spinner().template(template) {
            pb.set_style(style);
        }
        pb.set_message(format!("Waiting for scan {}", scan_id));
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    });

    let result = ctx
        .client
        .scans()
        .wait_until_complete(scan_id, &options)
        .await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let scan = result?;
    let summary = scan.summary();
    print_value(&summary, ctx.format)?;

    if scan.status().eq_ignore_ascii_case("completed") {
        Ok(())
    } else {
        Err(Error::Other(format!(
            "scan {} finished with status '{}'",
            scan_id,
            scan.status()
        )))
    }
}

/// Run the scan set-owner command
pub async fn set_owner(opts: &GlobalOptions, scan_id: &str, user_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let response = ctx.client.scans().change_owner(scan_id, user_id).await?;

    match ctx.format {
        OutputFormat::Table => {
            println!(
                "{} Scan {} now owned by {}",
                "✓".green(),
                scan_id.bold(),
                user_id.bold()
            );
            Ok(())
        }
        OutputFormat::Json => print_value(&response, ctx.format),
    }
}

/// Run the scan set-owner-bulk command
pub async fn set_owner_bulk(
    opts: &GlobalOptions,
    scan_ids: &[String],
    file: Option<&Path>,
    user_id: &str,
) -> Result<()> {
    let ids = collect_ids(scan_ids, file)?;
    let ctx = CommandContext::new(opts)?;

    debug!("Reassigning {} scans to {}", ids.len(), user_id);
    let outcome = ctx.client.scans().change_owner_bulk(&ids, user_id).await;
    report_batch(&outcome, "Reassigned", ctx.format)
}

/// Run the scan notes command
pub async fn notes(opts: &GlobalOptions, scan_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let notes: Vec<Record> = ctx.client.scans().notes(scan_id).await?;
    let rows: Vec<NoteDisplay> = notes.iter().map(NoteDisplay::from).collect();
    print_rows(&notes, &rows, ctx.format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_scan(id: &str, status: &str) -> Scan {
        Scan {
            scan_id: Some(id.to_string()),
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_apply_status_filter_case_insensitive() {
        let scans = vec![
            make_scan("s1", "running"),
            make_scan("s2", "completed"),
            make_scan("s3", "RUNNING"),
        ];
        let running = apply_status_filter(scans, Some("Running"));
        assert_eq!(running.len(), 2);
        assert_eq!(running[1].id(), Some("s3"));
    }

    #[test]
    fn test_apply_status_filter_no_filter() {
        let scans = vec![make_scan("s1", "running"), make_scan("s2", "failed")];
        assert_eq!(apply_status_filter(scans, None).len(), 2);
    }
}
