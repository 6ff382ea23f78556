//! Plugin metadata

use std::collections::HashMap;

use serde_json::{Value, json};

use super::ApiContext;
use crate::cache::{CacheTtl, cache_key, ns};
use crate::client::bulk::{BatchOutcome, for_each_id};
use crate::client::payload::{self, Record};
use crate::error::Result;

const PLUGINS_PATH: &str = "/was/v2/plugins";

/// Plugin operations
#[derive(Clone, Copy)]
pub struct PluginsApi<'a> {
    ctx: ApiContext<'a>,
}

impl<'a> PluginsApi<'a> {
    pub fn new(ctx: ApiContext<'a>) -> Self {
        Self { ctx }
    }

    pub async fn list(&self) -> Result<Vec<Record>> {
        let raw = self
            .ctx
            .cached(
                ns::PLUGINS,
                &cache_key(PLUGINS_PATH, &[]),
                CacheTtl::PLUGINS,
                || self.ctx.transport.get(PLUGINS_PATH),
            )
            .await?;
        Ok(payload::records_under(raw, &["items", "plugins"]))
    }

    pub async fn get(&self, plugin_id: &str) -> Result<Value> {
        self.ctx
            .cached(ns::PLUGINS, plugin_id, CacheTtl::PLUGINS, || async move {
                self.ctx
                    .transport
                    .get(&format!("{}/{}", PLUGINS_PATH, plugin_id))
                    .await
            })
            .await
    }

    pub async fn get_many(&self, plugin_ids: &[String]) -> BatchOutcome<Value> {
        for_each_id(plugin_ids, |id| async move { self.get(&id).await }).await
    }
}

/// Export rows for a batch in the order of `plugin_ids`: the plugin for each
/// success, a `{plugin_id, error}` row for each failure.
pub fn plugin_rows(plugin_ids: &[String], outcome: &BatchOutcome<Value>) -> Vec<Value> {
    let found: HashMap<&str, &Value> = outcome
        .succeeded
        .iter()
        .map(|(id, plugin)| (id.as_str(), plugin))
        .collect();
    let failed: HashMap<&str, &str> = outcome
        .failed
        .iter()
        .map(|f| (f.id.as_str(), f.error.as_str()))
        .collect();

    plugin_ids
        .iter()
        .filter_map(|id| match (found.get(id.as_str()), failed.get(id.as_str())) {
            (Some(plugin), _) => Some((*plugin).clone()),
            (None, Some(error)) => Some(json!({ "plugin_id": id, "error": error })),
            (None, None) => None,
        })
        .collect()
}
