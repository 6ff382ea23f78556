//! Command execution context
//!
//! Loads the config, resolves credentials and builds the shared client so
//! individual commands don't repeat that boilerplate.

use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use crate::cache::TtlCache;
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::{Transport, WasClient};
use crate::config::Config;
use crate::error::Result;

/// Context for command execution: config, client and output preferences.
pub struct CommandContext {
    pub config: Config,
    pub config_path: PathBuf,
    /// Arc-wrapped so list handlers can move it into their fetch futures
    pub client: Arc<WasClient>,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Build a context from the global options.
    ///
    /// A missing config file is fine as long as credentials come from the
    /// environment.
    ///
    /// # Errors
    /// Returns an error if the config cannot be parsed, no credentials are
    /// available, or the proxy settings are invalid.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config_path = Config::resolve_path(opts.config_ref())?;
        let config = Config::load_or_default(&config_path)?;
        let settings = config.transport_settings(opts.api_host_ref())?;
        let transport = Transport::new(settings)?;

        let mut client = WasClient::new(transport).page_size(config.preferences.page_size);
        if opts.no_cache {
            debug!("Response cache disabled");
        } else {
            client = client.with_cache(Arc::new(TtlCache::new()));
        }

        Ok(Self {
            config,
            config_path,
            client: Arc::new(client),
            format: opts.format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_from_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "access_key: ak\nsecret_key: sk\npreferences:\n  page_size: 50\n",
        )
        .unwrap();

        let opts = GlobalOptions {
            config: Some(path.clone()),
            api_host: Some("http://127.0.0.1:9".to_string()),
            no_cache: true,
            ..Default::default()
        };
        let ctx = CommandContext::new(&opts).unwrap();

        assert_eq!(ctx.config_path, path);
        assert_eq!(ctx.config.preferences.page_size, 50);
        assert_eq!(ctx.client.transport().base_url(), "http://127.0.0.1:9");
        assert!(ctx.client.cache().is_none());
    }

    #[test]
    fn test_context_with_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "api_key: k\n").unwrap();

        let opts = GlobalOptions {
            config: Some(path),
            ..Default::default()
        };
        let ctx = CommandContext::new(&opts).unwrap();
        assert!(ctx.client.cache().is_some());
    }
}
