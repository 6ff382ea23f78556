//! Application management commands

use colored::Colorize;
use dialoguer::Confirm;

use crate::cli::args::GlobalOptions;
use crate::cli::handlers::run_list_command;
use crate::cli::{CommandContext, OutputFormat, PaginationArgs};
use crate::client::models::Application;
use crate::error::{Error, Result};
use crate::models::{AppDisplay, AppUrlDisplay};
use crate::output::{print_rows, print_value};

/// Run the app list command
pub async fn list(opts: &GlobalOptions, pagination: &PaginationArgs) -> Result<()> {
    run_list_command::<Application, AppDisplay, _, _>(
        opts,
        pagination,
        "applications",
        |client| async move { client.apps().list().await },
    )
    .await
}

/// Run the app get command
pub async fn get(opts: &GlobalOptions, app_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let app = ctx.client.apps().get(app_id).await?;
    print_value(&app, ctx.format)
}

/// Run the app create command
pub async fn create(
    opts: &GlobalOptions,
    name: &str,
    description: Option<&str>,
    urls: &[String],
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let app = ctx.client.apps().create(name, description, urls).await?;

    if ctx.format == OutputFormat::Table {
        eprintln!(
            "{} Created application {} ({})",
            "✓".green(),
            name.bold(),
            app.id().unwrap_or("no id returned")
        );
    }
    print_value(&app, ctx.format)
}

/// Run the app update command
pub async fn update(
    opts: &GlobalOptions,
    app_id: &str,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<()> {
    if name.is_none() && description.is_none() {
        return Err(Error::Other(
            "nothing to update: pass --name and/or --description".to_string(),
        ));
    }

    let ctx = CommandContext::new(opts)?;
    let app = ctx.client.apps().update(app_id, name, description).await?;
    print_value(&app, ctx.format)
}

/// Run the app delete command
pub async fn delete(opts: &GlobalOptions, app_id: &str, yes: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    if !yes {
        eprintln!(
            "{} Delete application {}? This cannot be undone.",
            "⚠".yellow(),
            app_id.bold()
        );
        let confirm = Confirm::new()
            .with_prompt("Confirm deletion?")
            .default(false)
            .interact()?;

        if !confirm {
            eprintln!("Cancelled.");
            return Ok(());
        }
    }

    ctx.client.apps().delete(app_id).await?;
    eprintln!("{} Deleted application {}", "✓".green(), app_id.bold());
    Ok(())
}

/// Run the app urls command
pub async fn urls(opts: &GlobalOptions, app_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let urls = ctx.client.apps().urls(app_id).await?;
    let rows: Vec<AppUrlDisplay> = urls.iter().map(AppUrlDisplay::from).collect();
    print_rows(&urls, &rows, ctx.format)
}

/// Run the app set-urls command
pub async fn set_urls(opts: &GlobalOptions, app_id: &str, urls: &[String]) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let urls = ctx.client.apps().set_urls(app_id, urls).await?;

    if ctx.format == OutputFormat::Table {
        eprintln!(
            "{} Application {} now has {} URLs",
            "✓".green(),
            app_id.bold(),
            urls.len()
        );
    }
    let rows: Vec<AppUrlDisplay> = urls.iter().map(AppUrlDisplay::from).collect();
    print_rows(&urls, &rows, ctx.format)
}
