//! Application display models

use serde::Serialize;
use tabled::Tabled;

use super::BLANK;
use crate::client::models::{AppUrl, Application};
use crate::output::formatters::truncate;

/// Application row for table output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct AppDisplay {
    #[tabled(rename = "APP ID")]
    pub id: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "URLS")]
    pub urls: usize,

    #[tabled(rename = "DESCRIPTION")]
    pub description: String,
}

impl From<&Application> for AppDisplay {
    fn from(app: &Application) -> Self {
        Self {
            id: app.id().unwrap_or(BLANK).to_string(),
            name: app.name.clone().unwrap_or_else(|| BLANK.to_string()),
            urls: app.url_count(),
            description: app
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .map_or_else(|| BLANK.to_string(), |d| truncate(d, 50)),
        }
    }
}

/// Application URL row.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct AppUrlDisplay {
    #[tabled(rename = "URL ID")]
    pub id: String,

    #[tabled(rename = "URL")]
    pub url: String,

    #[tabled(rename = "METHOD")]
    pub method: String,

    #[tabled(rename = "ENABLED")]
    pub enabled: String,
}

impl From<&AppUrl> for AppUrlDisplay {
    fn from(url: &AppUrl) -> Self {
        Self {
            id: url.id.clone().unwrap_or_else(|| BLANK.to_string()),
            url: url.url.clone().unwrap_or_else(|| BLANK.to_string()),
            method: url.method.clone().unwrap_or_else(|| BLANK.to_string()),
            enabled: match url.enabled {
                Some(true) => "\u{2713}".to_string(), // checkmark
                Some(false) => String::new(),
                None => BLANK.to_string(),
            },
        }
    }
}
