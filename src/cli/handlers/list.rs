//! Generic list command handler
//!
//! Most list commands share one flow:
//! 1. Create command context
//! 2. Fetch every item
//! 3. Apply `--limit`
//! 4. Convert to display rows
//! 5. Print (rows as a table, raw items as JSON)

use std::future::Future;
use std::sync::Arc;

use log::debug;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, PaginationArgs};
use crate::client::WasClient;
use crate::error::Result;
use crate::output::print_rows;

/// Run a list command with the fetch → limit → display → print pattern.
///
/// ```ignore
/// run_list_command::<Record, UserDisplay, _, _>(opts, pagination, "users", |client| async move {
///     client.users().list().await
/// })
/// .await
/// ```
pub async fn run_list_command<T, D, F, Fut>(
    opts: &GlobalOptions,
    pagination: &PaginationArgs,
    resource_name: &str,
    fetcher: F,
) -> Result<()>
where
    T: Serialize,
    D: for<'a> From<&'a T> + Tabled,
    F: FnOnce(Arc<WasClient>) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let ctx = CommandContext::new(opts)?;

    debug!("Fetching {}", resource_name);
    let items = fetcher(ctx.client.clone()).await?;
    debug!("Fetched {} {}", items.len(), resource_name);

    let items = pagination.truncate(items);
    let rows: Vec<D> = items.iter().map(D::from).collect();
    print_rows(&items, &rows, ctx.format)
}
