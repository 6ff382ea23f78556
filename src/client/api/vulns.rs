//! Vulnerability search and lookup

use log::info;
use serde_json::{Value, json};

use super::ApiContext;
use crate::cache::{CacheTtl, body_key, ns};
use crate::client::bulk::{BatchOutcome, for_each_id};
use crate::client::pagination::{Page, collect_all};
use crate::client::payload::Record;
use crate::error::Result;
use crate::export::flatten_nested;

const SEARCH_PATH: &str = "/was/v2/vulns/search";

/// Default page size for vulnerability search.
pub const SEARCH_PAGE_SIZE: usize = 1000;

/// Search criteria, turned into WAS filter objects by [`VulnFilters::to_value`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VulnFilters {
    pub severity: Option<String>,
    pub plugin_ids: Vec<String>,
    pub scan_id: Option<String>,
    pub application_id: Option<String>,
    pub state: Option<String>,
    /// Lower bound on `last_seen`
    pub since: Option<String>,
    /// Upper bound on `last_seen`
    pub until: Option<String>,
}

impl VulnFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `{"filters": [{"field", "operator", "value"}, ...]}`
    pub fn to_value(&self) -> Value {
        let mut filters = Vec::new();
        if let Some(severity) = &self.severity {
            filters.push(filter("severity", "eq", json!(severity.to_lowercase())));
        }
        if !self.plugin_ids.is_empty() {
            let ids: Vec<Value> = self.plugin_ids.iter().map(|id| numeric_or_text(id)).collect();
            filters.push(filter("plugin_id", "in", Value::Array(ids)));
        }
        if let Some(scan_id) = &self.scan_id {
            filters.push(filter("scan_id", "in", json!([scan_id])));
        }
        if let Some(app_id) = &self.application_id {
            filters.push(filter("application_id", "in", json!([app_id])));
        }
        if let Some(state) = &self.state {
            filters.push(filter("state", "eq", json!(state)));
        }
        if let Some(since) = &self.since {
            filters.push(filter("last_seen", "gte", json!(since)));
        }
        if let Some(until) = &self.until {
            filters.push(filter("last_seen", "lte", json!(until)));
        }
        json!({ "filters": filters })
    }
}

fn filter(field: &str, operator: &str, value: Value) -> Value {
    json!({ "field": field, "operator": operator, "value": value })
}

/// Plugin IDs are numeric on the wire when they parse as such.
fn numeric_or_text(id: &str) -> Value {
    id.parse::<u64>().map(Value::from).unwrap_or_else(|_| json!(id))
}

/// One row per affected URL, or a single row with a null `affected_url`.
pub fn flatten_vuln_rows(vulns: &[Value]) -> Vec<Record> {
    let mut rows = Vec::new();
    for vuln in vulns {
        let Value::Object(record) = vuln else {
            continue;
        };
        let base = flatten_nested(record);
        let urls = record
            .get("affected_urls")
            .and_then(Value::as_array)
            .filter(|urls| !urls.is_empty());

        match urls {
            Some(urls) => {
                for url in urls {
                    let mut row = base.clone();
                    row.insert("affected_url".into(), url.clone());
                    rows.push(row);
                }
            }
            None => {
                let mut row = base;
                row.insert("affected_url".into(), Value::Null);
                rows.push(row);
            }
        }
    }
    rows
}

/// Vulnerability operations
#[derive(Clone, Copy)]
pub struct VulnsApi<'a> {
    ctx: ApiContext<'a>,
    page_size: usize,
}

impl<'a> VulnsApi<'a> {
    pub fn new(ctx: ApiContext<'a>) -> Self {
        Self {
            ctx,
            page_size: SEARCH_PAGE_SIZE,
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub async fn search_page(
        &self,
        filters: &Value,
        size: usize,
        offset: usize,
    ) -> Result<Page<Value>> {
        let body = json!({
            "filters": filters.get("filters").cloned().unwrap_or_else(|| json!([])),
            "size": size,
            "offset": offset,
        });
        let raw = self.ctx.transport.post(SEARCH_PATH, Some(&body)).await?;
        Ok(Page::from_payload(&raw, &["vulns", "items"]))
    }

    /// Every vulnerability matching `filters`, all pages.
    pub async fn search(&self, filters: &VulnFilters) -> Result<Vec<Value>> {
        let filters = filters.to_value();
        let key = body_key(SEARCH_PATH, &filters);
        let raw = self
            .ctx
            .cached(ns::VULNS, &key, CacheTtl::VULN_SEARCH, || async {
                let items = collect_all(self.page_size, |size, offset| {
                    self.search_page(&filters, size, offset)
                })
                .await?;
                Ok(Value::Array(items))
            })
            .await?;

        let vulns = match raw {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        info!("Search returned {} vulns", vulns.len());
        Ok(vulns)
    }

    pub async fn get(&self, vuln_id: &str) -> Result<Value> {
        self.ctx
            .transport
            .get(&format!("/was/v2/vulns/{}", vuln_id))
            .await
    }

    /// Fetch several vulnerabilities; failures are recorded per ID.
    pub async fn get_many(&self, vuln_ids: &[String]) -> BatchOutcome<Value> {
        for_each_id(vuln_ids, |id| async move { self.get(&id).await }).await
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;
    use crate::client::api::test_support;

    #[test]
    fn test_build_filters() {
        let filters = VulnFilters {
            severity: Some("HIGH".into()),
            plugin_ids: vec!["98074".into(), "abc".into()],
            scan_id: Some("s1".into()),
            since: Some("2024-01-01".into()),
            until: Some("2024-02-01".into()),
            ..Default::default()
        };

        assert_eq!(
            filters.to_value(),
            json!({"filters": [
                {"field": "severity", "operator": "eq", "value": "high"},
                {"field": "plugin_id", "operator": "in", "value": [98074, "abc"]},
                {"field": "scan_id", "operator": "in", "value": ["s1"]},
                {"field": "last_seen", "operator": "gte", "value": "2024-01-01"},
                {"field": "last_seen", "operator": "lte", "value": "2024-02-01"}
            ]})
        );
        assert!(VulnFilters::default().is_empty());
        assert_eq!(VulnFilters::default().to_value(), json!({"filters": []}));
    }

    #[test]
    fn test_flatten_rows_per_affected_url() {
        let vulns = vec![
            json!({
                "vuln_id": "v1",
                "plugin": {"id": 1},
                "affected_urls": ["https://a", "https://b"]
            }),
            json!({"vuln_id": "v2", "affected_urls": []}),
        ];
        let rows = flatten_vuln_rows(&vulns);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["affected_url"], "https://a");
        assert_eq!(rows[1]["affected_url"], "https://b");
        assert_eq!(rows[1]["plugin.id"], 1);
        assert_eq!(rows[2]["vuln_id"], "v2");
        assert_eq!(rows[2]["affected_url"], Value::Null);
    }

    #[tokio::test]
    async fn test_search_pages_through_body_offset() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/was/v2/vulns/search")
            .match_body(Matcher::PartialJson(json!({"size": 2, "offset": 0})))
            .with_body(r#"{"returned":2,"total":3,"vulns":[{"vuln_id":"v1"},{"vuln_id":"v2"}]}"#)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("POST", "/was/v2/vulns/search")
            .match_body(Matcher::PartialJson(json!({"size": 2, "offset": 2})))
            .with_body(r#"{"returned":1,"total":3,"vulns":[{"vuln_id":"v3"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let (transport, _) = test_support::transport(&server.url());
        let vulns = VulnsApi::new(ApiContext::new(&transport, None)).page_size(2);
        let found = vulns
            .search(&VulnFilters {
                severity: Some("high".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(found.len(), 3);
        assert_eq!(found[2]["vuln_id"], "v3");
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_many_partial() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/was/v2/vulns/v1")
            .with_body(r#"{"vuln_id":"v1"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/was/v2/vulns/v2")
            .with_status(404)
            .with_body(r#"{"error":"not found"}"#)
            .create_async()
            .await;

        let (transport, _) = test_support::transport(&server.url());
        let outcome = VulnsApi::new(ApiContext::new(&transport, None))
            .get_many(&["v1".to_string(), "v2".to_string()])
            .await;

        assert_eq!(outcome.succeeded.len(), 1);
        assert_eq!(outcome.failed[0].id, "v2");
    }
}
