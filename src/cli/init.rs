//! Init command implementation

use colored::Colorize;
use dialoguer::{Confirm, Password, Select, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::client::{Transport, WasClient};
use crate::config::Config;
use crate::error::Result;

/// Run the init command
///
/// Prompts for credentials, checks them with one cheap API call, and writes
/// the config file. Existing settings other than credentials are kept.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let theme = ColorfulTheme::default();
    let config_path = Config::resolve_path(opts.config_ref())?;
    let mut config = Config::load_or_default(&config_path)?;

    println!("{}", "Welcome to wasop!".bold().green());
    println!("Let's set up your Tenable WAS credentials.\n");

    let choice = Select::with_theme(&theme)
        .with_prompt("How do you authenticate?")
        .items(&["Access key + secret key", "Single API key"])
        .default(0)
        .interact()?;

    if choice == 0 {
        let access_key: String = Password::with_theme(&theme)
            .with_prompt("Access key")
            .interact()?;
        let secret_key: String = Password::with_theme(&theme)
            .with_prompt("Secret key")
            .interact()?;
        config.access_key = Some(access_key);
        config.secret_key = Some(secret_key);
        config.api_key = None;
    } else {
        let api_key: String = Password::with_theme(&theme)
            .with_prompt("API key")
            .interact()?;
        config.api_key = Some(api_key);
        config.access_key = None;
        config.secret_key = None;
    }
    if let Some(host) = &opts.api_host {
        config.api_host = Some(host.clone());
    }

    println!("\n{}", "Checking credentials...".cyan());
    let transport = Transport::new(config.transport_settings(None)?)?;
    let client = WasClient::new(transport);
    match client.folders().list().await {
        Ok(folders) => println!(
            "{} Authentication successful ({} folders visible)",
            "✓".green(),
            folders.len()
        ),
        Err(err) => {
            println!("{} Could not verify credentials: {}", "⚠".yellow(), err);
            let keep = Confirm::with_theme(&theme)
                .with_prompt("Save them anyway?")
                .default(false)
                .interact()?;
            if !keep {
                return Err(err);
            }
        }
    }

    config.save_to(&config_path)?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "wasop status".cyan());
    println!("  {} - List scans", "wasop scan list".cyan());

    Ok(())
}
