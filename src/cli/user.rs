//! User and folder commands

use crate::cli::args::GlobalOptions;
use crate::cli::handlers::run_list_command;
use crate::cli::{CommandContext, PaginationArgs};
use crate::client::payload::Record;
use crate::error::Result;
use crate::models::{FolderDisplay, UserDisplay};
use crate::output::print_value;

/// Run the user list command
pub async fn list(opts: &GlobalOptions, pagination: &PaginationArgs) -> Result<()> {
    run_list_command::<Record, UserDisplay, _, _>(
        opts,
        pagination,
        "users",
        |client| async move { client.users().list().await },
    )
    .await
}

/// Run the user get command
pub async fn get(opts: &GlobalOptions, user_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let user = ctx.client.users().get(user_id).await?;
    print_value(&user, ctx.format)
}

/// Run the folder list command
pub async fn list_folders(opts: &GlobalOptions, pagination: &PaginationArgs) -> Result<()> {
    run_list_command::<Record, FolderDisplay, _, _>(
        opts,
        pagination,
        "folders",
        |client| async move { client.folders().list().await },
    )
    .await
}
