//! Filter metadata command

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;
use crate::client::api::FilterKind;
use crate::error::Result;
use crate::output::print_value;

/// Run the filter command: show which fields a listing can be filtered on
pub async fn show(opts: &GlobalOptions, kind: FilterKind) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let filters = ctx.client.filters().get(kind).await?;
    print_value(&filters, ctx.format)
}
