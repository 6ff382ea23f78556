//! Listing argument types for CLI commands

use clap::Args;

/// Shared arguments for list commands.
///
/// Listings always fetch every page; `--limit` trims what is shown.
#[derive(Args, Debug, Default, Clone)]
pub struct PaginationArgs {
    /// Maximum results to show
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Items per API request (overrides preferences.page_size)
    #[arg(long)]
    pub page_size: Option<usize>,
}

impl PaginationArgs {
    /// Apply `--limit` to fetched items.
    pub fn truncate<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if let Some(limit) = self.limit {
            items.truncate(limit);
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_applies_limit() {
        let args = PaginationArgs {
            limit: Some(2),
            page_size: None,
        };
        assert_eq!(args.truncate(vec![1, 2, 3]), vec![1, 2]);
        assert_eq!(PaginationArgs::default().truncate(vec![1, 2, 3]).len(), 3);
    }
}
