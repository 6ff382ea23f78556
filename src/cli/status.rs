//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::client::transport::DEFAULT_BASE_URL;
use crate::config::Config;
use crate::error::Result;

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "wasop Configuration Status".bold());

    let config_path = Config::resolve_path(opts.config_ref())?;
    let config = match Config::load_from(&config_path) {
        Ok(config) => {
            println!("Config file: {}", config_path.display().to_string().cyan());
            config
        }
        Err(_) => {
            println!("{} Configuration not found", "✗".red());
            println!("  → Run {} to create one", "wasop init".cyan());
            Config::default()
        }
    };
    println!();

    // Credentials may come from the environment even without a file
    match config.credentials() {
        Ok(credentials) => println!("{} Credentials: {}", "✓".green(), credentials.masked()),
        Err(_) => {
            println!("{} No credentials configured", "✗".red());
            println!("  → Run 'wasop init' or set TENABLE_ACCESS_KEY / TENABLE_SECRET_KEY");
        }
    }

    let host = opts
        .api_host
        .clone()
        .or_else(|| config.api_host.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    if host == DEFAULT_BASE_URL {
        println!("{} API host: {}", "○".dimmed(), host);
    } else {
        println!("{} Custom API host: {}", "○".dimmed(), host.cyan());
    }

    match &config.proxy {
        Some(proxy) => match proxy.validated() {
            Ok(settings) => println!("{} Proxy: {}", "✓".green(), settings.url),
            Err(err) => println!("{} Proxy invalid: {}", "⚠".yellow(), err),
        },
        None => println!("{} No proxy", "○".dimmed()),
    }

    if let Some(rate) = config.max_requests_per_second {
        println!("{} Client-side rate limit: {} req/s", "○".dimmed(), rate);
    }

    println!(
        "{} Polling every {}s, giving up after {}s",
        "○".dimmed(),
        config.preferences.poll_interval_secs,
        config.preferences.poll_timeout_secs
    );
    println!();

    Ok(())
}
