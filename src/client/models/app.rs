//! Application models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::flexible_id;

/// Application resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(default, deserialize_with = "flexible_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Target URLs (only present on detail responses)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<AppUrl>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Application {
    /// Identifier, falling back to `application_id`.
    pub fn id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or_else(|| self.extra.get("application_id").and_then(Value::as_str))
    }

    pub fn url_count(&self) -> usize {
        self.urls.as_ref().map_or(0, Vec::len)
    }
}

/// Target URL attached to an application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppUrl {
    #[serde(default, deserialize_with = "flexible_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_application_with_urls() {
        let app: Application = serde_json::from_value(json!({
            "id": "app-1",
            "name": "Shop",
            "tags": ["prod"],
            "urls": [
                {"id": 1, "url": "https://shop.example.com", "enabled": true},
                {"url": "https://api.shop.example.com", "owner": "web"}
            ]
        }))
        .unwrap();

        assert_eq!(app.id(), Some("app-1"));
        assert_eq!(app.url_count(), 2);
        let urls = app.urls.unwrap();
        assert_eq!(urls[0].id.as_deref(), Some("1"));
        assert_eq!(urls[1].extra.get("owner"), Some(&json!("web")));
    }

    #[test]
    fn test_application_id_fallback() {
        let app: Application =
            serde_json::from_value(json!({"application_id": "app-7", "name": "x"})).unwrap();
        assert_eq!(app.id(), Some("app-7"));
        assert_eq!(app.url_count(), 0);
    }
}
