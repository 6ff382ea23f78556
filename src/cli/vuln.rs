//! Vulnerability search commands

use clap::Args;
use serde_json::Value;

use crate::cli::args::{ExportArgs, GlobalOptions};
use crate::cli::handlers::{run_list_command, warn_failures, write_export};
use crate::cli::{CommandContext, PaginationArgs};
use crate::client::api::{VulnFilters, flatten_vuln_rows};
use crate::error::Result;
use crate::models::VulnDisplay;
use crate::output::{print_rows, print_value};

/// Search filters shared by `vuln search` and `vuln export`
#[derive(Args, Debug, Default, Clone)]
pub struct VulnFilterArgs {
    /// Severity (critical, high, medium, low, info)
    #[arg(long, short = 's')]
    pub severity: Option<String>,

    /// Plugin ID; repeat or comma-separate for several
    #[arg(long = "plugin-id", short = 'p', value_delimiter = ',')]
    pub plugin_ids: Vec<String>,

    #[arg(long)]
    pub scan_id: Option<String>,

    #[arg(long = "app-id")]
    pub application_id: Option<String>,

    /// Vulnerability state (e.g. open, fixed)
    #[arg(long)]
    pub state: Option<String>,

    /// Only vulnerabilities last seen on or after this date
    #[arg(long)]
    pub since: Option<String>,

    /// Only vulnerabilities last seen on or before this date
    #[arg(long)]
    pub until: Option<String>,
}

impl VulnFilterArgs {
    pub fn to_filters(&self) -> VulnFilters {
        VulnFilters {
            severity: self.severity.clone(),
            plugin_ids: self.plugin_ids.clone(),
            scan_id: self.scan_id.clone(),
            application_id: self.application_id.clone(),
            state: self.state.clone(),
            since: self.since.clone(),
            until: self.until.clone(),
        }
    }
}

/// Run the vuln search command
pub async fn search(
    opts: &GlobalOptions,
    filters: &VulnFilterArgs,
    pagination: &PaginationArgs,
) -> Result<()> {
    let filters = filters.to_filters();
    let page_size = pagination.page_size;

    run_list_command::<Value, VulnDisplay, _, _>(opts, pagination, "vulns", |client| async move {
        let mut vulns = client.vulns();
        if let Some(size) = page_size {
            vulns = vulns.page_size(size);
        }
        vulns.search(&filters).await
    })
    .await
}

/// Run the vuln get command for one or more IDs
pub async fn get(opts: &GlobalOptions, vuln_ids: &[String]) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    if let [vuln_id] = vuln_ids {
        let vuln = ctx.client.vulns().get(vuln_id).await?;
        return print_value(&vuln, ctx.format);
    }

    let outcome = ctx.client.vulns().get_many(vuln_ids).await;
    let found: Vec<&Value> = outcome.succeeded.iter().map(|(_, v)| v).collect();
    let rows: Vec<VulnDisplay> = found.iter().map(|v| VulnDisplay::from(*v)).collect();
    print_rows(&found, &rows, ctx.format)?;
    warn_failures(&outcome)
}

/// Run the vuln export command
pub async fn export(
    opts: &GlobalOptions,
    filters: &VulnFilterArgs,
    out: &ExportArgs,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let vulns = ctx.client.vulns().search(&filters.to_filters()).await?;
    let rows = flatten_vuln_rows(&vulns);
    write_export(&out.plan(), "vulns", &vulns, &rows, ctx.format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_args_map_to_filters() {
        let args = VulnFilterArgs {
            severity: Some("high".into()),
            plugin_ids: vec!["98000".into(), "98001".into()],
            since: Some("2024-01-01".into()),
            ..Default::default()
        };
        let filters = args.to_filters();
        assert_eq!(filters.severity.as_deref(), Some("high"));
        assert_eq!(filters.plugin_ids.len(), 2);
        assert!(!filters.is_empty());
        assert!(VulnFilterArgs::default().to_filters().is_empty());
    }
}
