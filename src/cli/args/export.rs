//! Export destination arguments

use clap::Args;

use crate::export::{ExportPlan, ExportTarget};

/// `--json-out` / `--csv-out`, each a path or `auto` for a timestamped name.
#[derive(Args, Debug, Default, Clone)]
pub struct ExportArgs {
    /// Write raw JSON to PATH, or `auto`
    #[arg(long, value_name = "PATH|auto")]
    pub json_out: Option<ExportTarget>,

    /// Write flattened CSV to PATH, or `auto` (default when no output is given)
    #[arg(long, value_name = "PATH|auto")]
    pub csv_out: Option<ExportTarget>,
}

impl ExportArgs {
    pub fn plan(&self) -> ExportPlan {
        ExportPlan::from_flags(self.json_out.clone(), self.csv_out.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_plan_defaults_to_auto_csv() {
        let plan = ExportArgs::default().plan();
        assert_eq!(plan.csv, Some(ExportTarget::Auto));
        assert_eq!(plan.json, None);
    }

    #[test]
    fn test_plan_keeps_explicit_targets() {
        let args = ExportArgs {
            json_out: Some(ExportTarget::Path(PathBuf::from("out.json"))),
            csv_out: None,
        };
        let plan = args.plan();
        assert_eq!(plan.json, Some(ExportTarget::Path(PathBuf::from("out.json"))));
        assert_eq!(plan.csv, None);
    }
}
