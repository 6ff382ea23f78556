//! Scan template, scan configuration and user template commands

use std::path::Path;

use colored::Colorize;
use dialoguer::Confirm;
use serde_json::Value;

use crate::cli::args::GlobalOptions;
use crate::cli::handlers::run_list_command;
use crate::cli::{CommandContext, OutputFormat, PaginationArgs};
use crate::client::payload::Record;
use crate::error::{Error, Result};
use crate::models::TemplateDisplay;
use crate::output::print_value;

/// Run the template list command
pub async fn list(opts: &GlobalOptions, pagination: &PaginationArgs) -> Result<()> {
    run_list_command::<Record, TemplateDisplay, _, _>(
        opts,
        pagination,
        "templates",
        |client| async move { client.templates().list().await },
    )
    .await
}

/// Run the template get command
pub async fn get(opts: &GlobalOptions, template_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let template = ctx.client.templates().get(template_id).await?;
    print_value(&template, ctx.format)
}

/// Run the scan-config list command
pub async fn list_configs(opts: &GlobalOptions, pagination: &PaginationArgs) -> Result<()> {
    run_list_command::<Record, TemplateDisplay, _, _>(
        opts,
        pagination,
        "scan configurations",
        |client| async move { client.scan_configs().list().await },
    )
    .await
}

/// Run the scan-config get command
pub async fn get_config(opts: &GlobalOptions, config_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let config = ctx.client.scan_configs().get(config_id).await?;
    print_value(&config, ctx.format)
}

/// Run the user-template list command
pub async fn list_user(opts: &GlobalOptions, pagination: &PaginationArgs) -> Result<()> {
    run_list_command::<Record, TemplateDisplay, _, _>(
        opts,
        pagination,
        "user templates",
        |client| async move { client.user_templates().list().await },
    )
    .await
}

/// Run the user-template get command
pub async fn get_user(opts: &GlobalOptions, template_id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let template = ctx.client.user_templates().get(template_id).await?;
    print_value(&template, ctx.format)
}

/// Run the user-template create command with a JSON body from `file`
pub async fn create_user(opts: &GlobalOptions, file: &Path) -> Result<()> {
    let body = read_body(file)?;
    let ctx = CommandContext::new(opts)?;
    let created = ctx.client.user_templates().create(&body).await?;

    if ctx.format == OutputFormat::Table {
        eprintln!("{} Created user template", "✓".green());
    }
    print_value(&created, ctx.format)
}

/// Run the user-template update command with a JSON body from `file`
pub async fn update_user(opts: &GlobalOptions, template_id: &str, file: &Path) -> Result<()> {
    let body = read_body(file)?;
    let ctx = CommandContext::new(opts)?;
    let updated = ctx.client.user_templates().update(template_id, &body).await?;
    print_value(&updated, ctx.format)
}

/// Run the user-template delete command
pub async fn delete_user(opts: &GlobalOptions, template_id: &str, yes: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    if !yes {
        let confirm = Confirm::new()
            .with_prompt(format!("Delete user template {}?", template_id))
            .default(false)
            .interact()?;
        if !confirm {
            eprintln!("Cancelled.");
            return Ok(());
        }
    }

    ctx.client.user_templates().delete(template_id).await?;
    eprintln!("{} Deleted user template {}", "✓".green(), template_id.bold());
    Ok(())
}

/// Request body for create/update: a JSON object read from disk.
fn read_body(file: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(file)?;
    let body: Value = serde_json::from_str(&raw)?;
    if !body.is_object() {
        return Err(Error::Other(format!(
            "{} must contain a JSON object",
            file.display()
        )));
    }
    Ok(body)
}
