//! Configuration management for wasop
//!
//! This is the only place that reads the environment. Everything below the
//! CLI receives plain settings built by [`Config::transport_settings`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::pagination::DEFAULT_PAGE_SIZE;
use crate::client::poll::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT, PollOptions};
use crate::client::transport::{
    Credentials, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, ProxySettings, TransportSettings, mask_key,
};
use crate::error::{ConfigError, Result};

pub const ENV_ACCESS_KEY: &str = "TENABLE_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "TENABLE_SECRET_KEY";
pub const ENV_API_KEY: &str = "TENABLE_API_KEY";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Tenable access key (paired with `secret_key`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    /// Single API key, used when no key pair is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Optional client-side request pacing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_requests_per_second: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyConfig>,

    #[serde(default)]
    pub preferences: Preferences,
}

/// Outbound proxy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Normalised URL plus credentials; auth needs both halves or neither.
    pub fn validated(&self) -> Result<ProxySettings> {
        let url = normalize_proxy_url(&self.url)?;
        match (&self.username, &self.password) {
            (Some(_), None) | (None, Some(_)) => Err(ConfigError::InvalidProxy(
                "proxy authentication needs both a username and a password".to_string(),
            )
            .into()),
            _ => Ok(ProxySettings {
                url,
                username: self.username.clone(),
                password: self.password.clone(),
            }),
        }
    }
}

/// User preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Page size for paginated listings
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

fn default_poll_timeout() -> u64 {
    DEFAULT_POLL_TIMEOUT.as_secs()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            poll_interval_secs: default_poll_interval(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

/// Accept only http(s) proxies; the scheme is lowercased.
pub fn normalize_proxy_url(url: &str) -> Result<String> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    for scheme in ["http://", "https://"] {
        if lower.starts_with(scheme) && url.len() > scheme.len() {
            return Ok(format!("{}{}", scheme, &url[scheme.len()..]));
        }
    }
    Err(ConfigError::InvalidProxy(format!(
        "proxy URL must start with http:// or https:// (got '{}')",
        url
    ))
    .into())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".wasop").join("config.yaml"))
    }

    /// `explicit` when given, otherwise the default location.
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load, or start from defaults when the file does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load_from(path) {
            Err(crate::error::Error::Config(ConfigError::NotFound)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Write atomically with owner-only permissions on unix.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        let tmp = path.with_extension("yaml.tmp");
        std::fs::write(&tmp, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&tmp)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&tmp, perms)?;
        }

        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Credentials from the file, with gaps filled from the process environment.
    pub fn credentials(&self) -> Result<Credentials> {
        self.credentials_with(|name| std::env::var(name).ok())
    }

    /// Credentials with gaps filled by `env`. A key pair wins over an API key.
    pub fn credentials_with<F>(&self, env: F) -> Result<Credentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access = non_empty(self.access_key.clone()).or_else(|| non_empty(env(ENV_ACCESS_KEY)));
        let secret = non_empty(self.secret_key.clone()).or_else(|| non_empty(env(ENV_SECRET_KEY)));
        if let (Some(access), Some(secret)) = (access, secret) {
            return Ok(Credentials::access_keys(access, secret));
        }

        non_empty(self.api_key.clone())
            .or_else(|| non_empty(env(ENV_API_KEY)))
            .map(Credentials::api_key)
            .ok_or_else(|| ConfigError::MissingCredentials.into())
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials().is_ok()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions::new()
            .interval(Duration::from_secs(self.preferences.poll_interval_secs))
            .timeout(Duration::from_secs(self.preferences.poll_timeout_secs))
    }

    /// Everything the transport needs; `api_host` overrides the configured host.
    pub fn transport_settings(&self, api_host: Option<&str>) -> Result<TransportSettings> {
        let base_url = api_host
            .map(String::from)
            .or_else(|| self.api_host.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut settings = TransportSettings::new(self.credentials()?)
            .base_url(base_url)
            .timeout(self.timeout())
            .max_requests_per_second(self.max_requests_per_second);
        if let Some(proxy) = &self.proxy {
            settings = settings.proxy(proxy.validated()?);
        }
        Ok(settings)
    }

    /// Masked key/value lines for display.
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        let shown = |v: &Option<String>| {
            v.as_deref()
                .map(mask_key)
                .unwrap_or_else(|| "(none)".into())
        };
        vec![
            ("access_key", shown(&self.access_key)),
            ("secret_key", shown(&self.secret_key)),
            ("api_key", shown(&self.api_key)),
            (
                "api_host",
                self.api_host.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            ),
            ("timeout_secs", self.timeout().as_secs().to_string()),
            (
                "max_requests_per_second",
                self.max_requests_per_second
                    .map_or_else(|| "(unlimited)".to_string(), |r| r.to_string()),
            ),
            (
                "proxy",
                self.proxy.as_ref().map_or_else(|| "(none)".to_string(), |p| p.url.clone()),
            ),
            (
                "proxy_auth",
                if self.proxy.as_ref().is_some_and(|p| p.username.is_some()) {
                    "enabled".to_string()
                } else {
                    "disabled".to_string()
                },
            ),
            ("page_size", self.preferences.page_size.to_string()),
            ("poll_interval_secs", self.preferences.poll_interval_secs.to_string()),
            ("poll_timeout_secs", self.preferences.poll_timeout_secs.to_string()),
        ]
    }

    /// Set a scalar field by name, as used by `config set`.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<()> {
        let parse_err = |what: &str| {
            ConfigError::Invalid(format!("{} must be a number, got '{}'", what, value))
        };
        match key {
            "access_key" => self.access_key = Some(value.to_string()),
            "secret_key" => self.secret_key = Some(value.to_string()),
            "api_key" => self.api_key = Some(value.to_string()),
            "api_host" => self.api_host = Some(value.trim_end_matches('/').to_string()),
            "timeout_secs" => self.timeout_secs = Some(value.parse().map_err(|_| parse_err(key))?),
            "max_requests_per_second" => {
                self.max_requests_per_second = Some(value.parse().map_err(|_| parse_err(key))?)
            }
            "page_size" => self.preferences.page_size = value.parse().map_err(|_| parse_err(key))?,
            "poll_interval_secs" => {
                self.preferences.poll_interval_secs = value.parse().map_err(|_| parse_err(key))?
            }
            "poll_timeout_secs" => {
                self.preferences.poll_timeout_secs = value.parse().map_err(|_| parse_err(key))?
            }
            other => {
                return Err(ConfigError::Invalid(format!("unknown config key '{}'", other)).into());
            }
        }
        Ok(())
    }
}
