//! System templates, scan configurations and user templates

use log::info;
use serde_json::Value;

use super::ApiContext;
use crate::cache::{CacheTtl, cache_key, ns};
use crate::client::payload::{self, Record};
use crate::error::Result;

/// Read-only catalog shared by system templates and scan configurations.
#[derive(Clone, Copy)]
struct Catalog<'a> {
    ctx: ApiContext<'a>,
    path: &'static str,
    item_keys: &'static [&'static str],
}

impl Catalog<'_> {
    async fn list(&self) -> Result<Vec<Record>> {
        let raw = self
            .ctx
            .cached(
                ns::TEMPLATES,
                &cache_key(self.path, &[]),
                CacheTtl::TEMPLATES,
                || self.ctx.transport.get(self.path),
            )
            .await?;
        Ok(payload::records_under(raw, self.item_keys))
    }

    async fn get(&self, id: &str) -> Result<Value> {
        let path = format!("{}/{}", self.path, id);
        let key = cache_key(&path, &[]);
        self.ctx
            .cached(ns::TEMPLATES, &key, CacheTtl::TEMPLATES, || {
                self.ctx.transport.get(&path)
            })
            .await
    }
}

/// Tenable-provided scan templates
#[derive(Clone, Copy)]
pub struct TemplatesApi<'a> {
    catalog: Catalog<'a>,
}

impl<'a> TemplatesApi<'a> {
    pub fn new(ctx: ApiContext<'a>) -> Self {
        Self {
            catalog: Catalog {
                ctx,
                path: "/was/v2/templates",
                item_keys: &["items", "templates"],
            },
        }
    }

    pub async fn list(&self) -> Result<Vec<Record>> {
        self.catalog.list().await
    }

    pub async fn get(&self, template_id: &str) -> Result<Value> {
        self.catalog.get(template_id).await
    }
}

/// System scan configurations
#[derive(Clone, Copy)]
pub struct ScanConfigsApi<'a> {
    catalog: Catalog<'a>,
}

impl<'a> ScanConfigsApi<'a> {
    pub fn new(ctx: ApiContext<'a>) -> Self {
        Self {
            catalog: Catalog {
                ctx,
                path: "/was/v2/configurations",
                item_keys: &["items", "configurations"],
            },
        }
    }

    pub async fn list(&self) -> Result<Vec<Record>> {
        self.catalog.list().await
    }

    pub async fn get(&self, config_id: &str) -> Result<Value> {
        self.catalog.get(config_id).await
    }
}

const USER_TEMPLATES_PATH: &str = "/was/v2/user-templates";

/// Templates saved by users of the container
#[derive(Clone, Copy)]
pub struct UserTemplatesApi<'a> {
    ctx: ApiContext<'a>,
}

impl<'a> UserTemplatesApi<'a> {
    pub fn new(ctx: ApiContext<'a>) -> Self {
        Self { ctx }
    }

    pub async fn list(&self) -> Result<Vec<Record>> {
        let raw = self.ctx.transport.get(USER_TEMPLATES_PATH).await?;
        Ok(payload::records_under(
            raw,
            &["items", "templates", "user_templates"],
        ))
    }

    pub async fn get(&self, template_id: &str) -> Result<Value> {
        self.ctx.transport.get(&user_template_path(template_id)).await
    }

    pub async fn create(&self, body: &Value) -> Result<Value> {
        let created = self
            .ctx
            .transport
            .post(USER_TEMPLATES_PATH, Some(body))
            .await?;
        info!(
            "Created user template {}",
            payload::str_field(&created, &["user_template_id", "id"]).unwrap_or_default()
        );
        Ok(created)
    }

    pub async fn update(&self, template_id: &str, body: &Value) -> Result<Value> {
        self.ctx
            .transport
            .put(&user_template_path(template_id), body)
            .await
    }

    pub async fn delete(&self, template_id: &str) -> Result<()> {
        self.ctx
            .transport
            .delete(&user_template_path(template_id))
            .await?;
        Ok(())
    }
}

fn user_template_path(template_id: &str) -> String {
    format!("{}/{}", USER_TEMPLATES_PATH, template_id)
}
