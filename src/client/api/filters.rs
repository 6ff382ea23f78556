//! Filter metadata: which fields and operators each search accepts

use serde_json::Value;

use super::ApiContext;
use crate::cache::{CacheTtl, cache_key, ns};
use crate::error::Result;

/// Resource whose filter metadata to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FilterKind {
    Scans,
    ScanConfigs,
    UserTemplates,
    Vulns,
    ScanVulns,
}

impl FilterKind {
    pub fn path(self) -> &'static str {
        match self {
            FilterKind::Scans => "/was/v2/filters/scans",
            FilterKind::ScanConfigs => "/was/v2/filters/scan-configs",
            FilterKind::UserTemplates => "/was/v2/filters/user-templates",
            FilterKind::Vulns => "/was/v2/filters/vulnerabilities",
            FilterKind::ScanVulns => "/was/v2/filters/scans/vulnerabilities",
        }
    }
}

/// Filter metadata operations
#[derive(Clone, Copy)]
pub struct FiltersApi<'a> {
    ctx: ApiContext<'a>,
}

impl<'a> FiltersApi<'a> {
    pub fn new(ctx: ApiContext<'a>) -> Self {
        Self { ctx }
    }

    pub async fn get(&self, kind: FilterKind) -> Result<Value> {
        let path = kind.path();
        self.ctx
            .cached(
                ns::TEMPLATES,
                &cache_key(path, &[]),
                CacheTtl::TEMPLATES,
                || self.ctx.transport.get(path),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::api::test_support;

    #[tokio::test]
    async fn test_scan_vulns_filters_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/was/v2/filters/scans/vulnerabilities")
            .with_body(r#"[{"name":"severity","operators":["eq"]}]"#)
            .create_async()
            .await;

        let (transport, _) = test_support::transport(&server.url());
        let filters = FiltersApi::new(ApiContext::new(&transport, None))
            .get(FilterKind::ScanVulns)
            .await
            .unwrap();
        assert_eq!(filters[0]["name"], "severity");
        mock.assert_async().await;
    }
}
