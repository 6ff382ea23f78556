//! Helpers for commands that act on many IDs

use std::path::Path;

use colored::Colorize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::client::BatchOutcome;
use crate::client::payload::parse_ids;
use crate::error::{Error, Result};
use crate::models::FailureDisplay;
use crate::output::{json, table};

/// IDs from positional arguments and an optional file, comma or newline
/// separated, deduplicated in first-seen order.
pub fn collect_ids(args: &[String], file: Option<&Path>) -> Result<Vec<String>> {
    let mut raw: Vec<String> = args.to_vec();
    if let Some(path) = file {
        let contents = std::fs::read_to_string(path)?;
        raw.extend(contents.lines().map(String::from));
    }

    let mut ids: Vec<String> = Vec::new();
    for id in raw.iter().flat_map(|chunk| parse_ids(chunk)) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    if ids.is_empty() {
        return Err(Error::Other("no IDs given".to_string()));
    }
    Ok(ids)
}

/// Print a batch result. Any per-item failure makes the command fail after
/// everything has been reported.
pub fn report_batch<T>(
    outcome: &BatchOutcome<T>,
    action: &str,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let succeeded: Vec<&str> =
                outcome.succeeded.iter().map(|(id, _)| id.as_str()).collect();
            let data = json!({ "succeeded": succeeded, "failed": outcome.failed });
            println!("{}", json::format_json(&data)?);
        }
        OutputFormat::Table => {
            eprintln!(
                "{} {} {} of {}",
                "✓".green(),
                action,
                outcome.succeeded.len(),
                outcome.total()
            );
            if !outcome.failed.is_empty() {
                let failures: Vec<FailureDisplay> =
                    outcome.failed.iter().map(FailureDisplay::from).collect();
                eprintln!("{} {} failed:", "✗".red(), failures.len());
                eprintln!("{}", table::format_table(&failures));
            }
        }
    }
    check_batch(outcome)
}

/// List failures on stderr; error if there were any.
fn check_batch<T>(outcome: &BatchOutcome<T>) -> Result<()> {
    if outcome.is_complete_success() {
        return Ok(());
    }
    Err(Error::Other(format!(
        "{} of {} items failed",
        outcome.failed.len(),
        outcome.total()
    )))
}

/// Print failures of a batch whose successes were already printed.
pub fn warn_failures<T>(outcome: &BatchOutcome<T>) -> Result<()> {
    for failure in &outcome.failed {
        eprintln!("{} {}: {}", "✗".red(), failure.id, failure.error);
    }
    check_batch(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::BatchFailure;
    use tempfile::NamedTempFile;

    #[test]
    fn test_collect_ids_merges_args_and_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "s3\n\ns1, s4\n").unwrap();

        let ids = collect_ids(&["s1,s2".to_string()], Some(file.path())).unwrap();
        assert_eq!(ids, vec!["s1", "s2", "s3", "s4"]);
    }

    #[test]
    fn test_collect_ids_empty_is_error() {
        assert!(collect_ids(&[" , ".to_string()], None).is_err());
    }

    #[test]
    fn test_report_batch_fails_on_partial_failure() {
        let outcome: BatchOutcome<()> = BatchOutcome {
            succeeded: vec![("s1".into(), ())],
            failed: vec![BatchFailure {
                id: "s2".into(),
                error: "HTTP 404".into(),
                status: Some(404),
            }],
        };
        let err = report_batch(&outcome, "Updated", OutputFormat::Json).unwrap_err();
        assert!(err.to_string().contains("1 of 2"));

        let ok: BatchOutcome<()> = BatchOutcome {
            succeeded: vec![("s1".into(), ())],
            failed: vec![],
        };
        assert!(report_batch(&ok, "Updated", OutputFormat::Json).is_ok());
    }
}
