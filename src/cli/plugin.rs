//! Plugin commands

use std::path::Path;

use colored::Colorize;
use serde_json::Value;

use crate::cli::args::{ExportArgs, GlobalOptions};
use crate::cli::handlers::{collect_ids, run_list_command, write_export};
use crate::cli::{CommandContext, PaginationArgs};
use crate::client::api::plugin_rows;
use crate::client::payload::Record;
use crate::error::Result;
use crate::export::flatten_shallow;
use crate::models::PluginDisplay;
use crate::output::print_value;

/// Run the plugin list command
pub async fn list(opts: &GlobalOptions, pagination: &PaginationArgs) -> Result<()> {
    run_list_command::<Record, PluginDisplay, _, _>(
        opts,
        pagination,
        "plugins",
        |client| async move { client.plugins().list().await },
    )
    .await
}

/// Run the plugin get command
pub async fn get(opts: &GlobalOptions, plugin_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let plugin = ctx.client.plugins().get(plugin_id).await?;
    print_value(&plugin, ctx.format)
}

/// Run the plugin export command. Lookup failures become rows with an
/// `error` column rather than failing the export.
pub async fn export(
    opts: &GlobalOptions,
    plugin_ids: &[String],
    file: Option<&Path>,
    out: &ExportArgs,
) -> Result<()> {
    let ids = collect_ids(plugin_ids, file)?;
    let ctx = CommandContext::new(opts)?;

    let outcome = ctx.client.plugins().get_many(&ids).await;
    for failure in &outcome.failed {
        eprintln!("{} plugin {}: {}", "⚠".yellow(), failure.id, failure.error);
    }

    let raw = plugin_rows(&ids, &outcome);
    let rows: Vec<Record> = raw
        .iter()
        .filter_map(Value::as_object)
        .map(flatten_shallow)
        .collect();
    write_export(&out.plan(), "plugins", &raw, &rows, ctx.format)
}
