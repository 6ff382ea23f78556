//! Local configuration commands

use colored::Colorize;
use dialoguer::Confirm;
use serde_json::{Map, Value};

use crate::cli::args::GlobalOptions;
use crate::config::{Config, ProxyConfig};
use crate::error::Result;
use crate::output::print_value;

/// Run the config show command (secrets masked)
pub fn show(opts: &GlobalOptions) -> Result<()> {
    let path = Config::resolve_path(opts.config_ref())?;
    let config = Config::load_or_default(&path)?;

    let mut fields = Map::new();
    fields.insert("path".into(), Value::String(path.display().to_string()));
    for (key, value) in config.describe() {
        fields.insert(key.into(), Value::String(value));
    }
    print_value(&Value::Object(fields), opts.format)
}

/// Run the config set command
pub fn set(opts: &GlobalOptions, key: &str, value: &str) -> Result<()> {
    let path = Config::resolve_path(opts.config_ref())?;
    let mut config = Config::load_or_default(&path)?;
    config.set_field(key, value)?;
    config.save_to(&path)?;

    eprintln!("{} Set {} in {}", "✓".green(), key.bold(), path.display());
    Ok(())
}

/// Run the config set-proxy command
pub fn set_proxy(
    opts: &GlobalOptions,
    url: &str,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<()> {
    let proxy = ProxyConfig {
        url: url.to_string(),
        username: username.map(String::from),
        password: password.map(String::from),
    };
    let settings = proxy.validated()?;

    let path = Config::resolve_path(opts.config_ref())?;
    let mut config = Config::load_or_default(&path)?;
    config.proxy = Some(ProxyConfig {
        url: settings.url.clone(),
        ..proxy
    });
    config.save_to(&path)?;

    eprintln!("{} Proxy set to {}", "✓".green(), settings.url.cyan());
    Ok(())
}

/// Run the config clear-proxy command
pub fn clear_proxy(opts: &GlobalOptions) -> Result<()> {
    let path = Config::resolve_path(opts.config_ref())?;
    let mut config = Config::load_or_default(&path)?;
    if config.proxy.take().is_none() {
        eprintln!("No proxy configured.");
        return Ok(());
    }
    config.save_to(&path)?;

    eprintln!("{} Proxy removed", "✓".green());
    Ok(())
}

/// Run the config clear command: delete the config file
pub fn clear(opts: &GlobalOptions, yes: bool) -> Result<()> {
    let path = Config::resolve_path(opts.config_ref())?;
    if !path.exists() {
        eprintln!("No configuration at {}", path.display());
        return Ok(());
    }

    if !yes {
        let confirm = Confirm::new()
            .with_prompt(format!("Delete {}?", path.display()))
            .default(false)
            .interact()?;
        if !confirm {
            eprintln!("Cancelled.");
            return Ok(());
        }
    }

    std::fs::remove_file(&path)?;
    eprintln!("{} Removed {}", "✓".green(), path.display());
    Ok(())
}
