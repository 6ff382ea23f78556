//! Applications and their target URLs

use log::info;
use serde_json::{Map, Value, json};

use super::ApiContext;
use crate::cache::{CacheTtl, cache_key, ns};
use crate::client::models::{AppUrl, Application};
use crate::client::payload;
use crate::error::Result;

const APPS_PATH: &str = "/was/v2/applications";

/// Application operations
#[derive(Clone, Copy)]
pub struct AppsApi<'a> {
    ctx: ApiContext<'a>,
}

impl<'a> AppsApi<'a> {
    pub fn new(ctx: ApiContext<'a>) -> Self {
        Self { ctx }
    }

    pub async fn list(&self) -> Result<Vec<Application>> {
        let key = cache_key(APPS_PATH, &[]);
        let raw = self
            .ctx
            .cached(ns::LISTINGS, &key, CacheTtl::APPS, || async {
                let raw = self.ctx.transport.get(APPS_PATH).await?;
                Ok(Value::Array(payload::items_under(
                    &raw,
                    &["items", "applications"],
                )))
            })
            .await?;

        let apps: Vec<Application> = serde_json::from_value(raw)?;
        info!("Loaded {} applications", apps.len());
        Ok(apps)
    }

    pub async fn get(&self, app_id: &str) -> Result<Application> {
        let raw = self
            .ctx
            .cached(ns::APPS, app_id, CacheTtl::APPS, || async move {
                self.ctx.transport.get(&app_path(app_id)).await
            })
            .await?;
        Ok(serde_json::from_value(raw)?)
    }

    /// Create an application, optionally with initial target URLs.
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
        urls: &[String],
    ) -> Result<Application> {
        let mut body = json!({
            "name": name,
            "description": description.unwrap_or_default(),
        });
        if !urls.is_empty() {
            body["urls"] = url_objects(urls);
        }

        let raw = self.ctx.transport.post(APPS_PATH, Some(&body)).await?;
        let app: Application = serde_json::from_value(raw.clone())?;
        self.remember(&app, raw);
        Ok(app)
    }

    /// Update name and/or description; absent fields are left untouched.
    pub async fn update(
        &self,
        app_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Application> {
        let mut body = Map::new();
        if let Some(name) = name {
            body.insert("name".into(), json!(name));
        }
        if let Some(description) = description {
            body.insert("description".into(), json!(description));
        }

        let raw = self
            .ctx
            .transport
            .post(&app_path(app_id), Some(&Value::Object(body)))
            .await?;
        let app: Application = serde_json::from_value(raw.clone())?;
        self.remember(&app, raw);
        Ok(app)
    }

    pub async fn delete(&self, app_id: &str) -> Result<()> {
        self.ctx.transport.delete(&app_path(app_id)).await?;
        self.ctx.evict(ns::APPS, app_id);
        self.forget_listing();
        info!("Deleted application {}", app_id);
        Ok(())
    }

    pub async fn urls(&self, app_id: &str) -> Result<Vec<AppUrl>> {
        let raw = self
            .ctx
            .transport
            .get(&format!("{}/urls", app_path(app_id)))
            .await?;
        Ok(serde_json::from_value(Value::Array(payload::items_under(
            &raw,
            &["urls", "items"],
        )))?)
    }

    /// Replace the application's URL list.
    pub async fn set_urls(&self, app_id: &str, urls: &[String]) -> Result<Vec<AppUrl>> {
        let body = json!({ "urls": url_objects(urls) });
        let raw = self
            .ctx
            .transport
            .post(&format!("{}/urls", app_path(app_id)), Some(&body))
            .await?;
        self.ctx.evict(ns::APPS, app_id);
        Ok(serde_json::from_value(Value::Array(payload::items_under(
            &raw,
            &["urls", "items"],
        )))?)
    }

    fn remember(&self, app: &Application, raw: Value) {
        if let Some(id) = app.id() {
            self.ctx.store(ns::APPS, id, raw, CacheTtl::APPS);
        }
        self.forget_listing();
    }

    fn forget_listing(&self) {
        self.ctx.evict(ns::LISTINGS, &cache_key(APPS_PATH, &[]));
    }
}

fn app_path(app_id: &str) -> String {
    format!("{}/{}", APPS_PATH, app_id)
}

fn url_objects(urls: &[String]) -> Value {
    Value::Array(urls.iter().map(|u| json!({ "url": u })).collect())
}
