//! Findings for a scan, and findings exports

use log::{debug, info};
use serde::Serialize;
use serde_json::{Value, json};

use super::{ApiContext, ScansApi};
use crate::cache::{CacheTtl, ns};
use crate::client::bulk::{BatchOutcome, for_each_id};
use crate::client::payload::{self, Record};
use crate::error::Result;
use crate::export::{count_by_severity, flatten_shallow, sort_by_severity};

const EXPORT_PATH: &str = "/was/v2/export/findings";

/// Per-severity finding counts for one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FindingsSummary {
    pub scan_id: String,
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
    pub unknown: usize,
}

/// Findings exported for one scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanExport {
    pub scan_id: String,
    pub findings: Vec<Record>,
}

impl ScanExport {
    /// CSV-safe rows, each tagged with the scan ID.
    pub fn rows(&self) -> Vec<Record> {
        self.findings
            .iter()
            .map(|f| {
                let mut row = flatten_shallow(f);
                row.entry("scan_id")
                    .or_insert_with(|| Value::String(self.scan_id.clone()));
                row
            })
            .collect()
    }
}

/// Finding operations
#[derive(Clone, Copy)]
pub struct FindingsApi<'a> {
    ctx: ApiContext<'a>,
}

impl<'a> FindingsApi<'a> {
    pub fn new(ctx: ApiContext<'a>) -> Self {
        Self { ctx }
    }

    /// All findings for a scan, cached per scan.
    pub async fn list(&self, scan_id: &str) -> Result<Vec<Record>> {
        let raw = self
            .ctx
            .cached(ns::FINDINGS, scan_id, CacheTtl::FINDINGS, || async move {
                self.ctx
                    .transport
                    .get(&format!("/was/v2/scans/{}/findings", scan_id))
                    .await
            })
            .await?;
        Ok(payload::records_under(raw, &["items", "findings"]))
    }

    pub async fn get(&self, scan_id: &str, finding_id: &str) -> Result<Value> {
        self.ctx
            .transport
            .get(&format!("/was/v2/scans/{}/findings/{}", scan_id, finding_id))
            .await
    }

    /// Findings matching an optional severity (case-insensitive) and plugin ID.
    pub async fn filter(
        &self,
        scan_id: &str,
        severity: Option<&str>,
        plugin_id: Option<&str>,
    ) -> Result<Vec<Record>> {
        let findings: Vec<Record> = self
            .list(scan_id)
            .await?
            .into_iter()
            .filter(|f| matches_finding(f, severity, plugin_id))
            .collect();
        debug!("Filter kept {} findings", findings.len());
        Ok(findings)
    }

    /// Findings ordered most severe first.
    pub async fn sorted_by_severity(&self, scan_id: &str) -> Result<Vec<Record>> {
        let mut findings = self.list(scan_id).await?;
        sort_by_severity(&mut findings, true);
        Ok(findings)
    }

    pub async fn summary(&self, scan_id: &str) -> Result<FindingsSummary> {
        let findings = self.list(scan_id).await?;
        Ok(summarize(scan_id, &findings))
    }

    /// Server-side findings export for one scan.
    pub async fn export(&self, scan_id: &str) -> Result<ScanExport> {
        let body = json!({ "scan_id": scan_id });
        let raw = self.ctx.transport.post(EXPORT_PATH, Some(&body)).await?;
        let scan_id = payload::str_field(&raw, &["scan_id"]).unwrap_or_else(|| scan_id.to_string());
        Ok(ScanExport {
            scan_id,
            findings: payload::records_under(raw, &["findings", "items"]),
        })
    }

    /// Export findings for every listed scan, one scan at a time.
    ///
    /// `progress` is called before each scan with (index, total, scan_id).
    pub async fn export_all<P>(
        &self,
        scans: ScansApi<'a>,
        mut progress: P,
    ) -> Result<BatchOutcome<ScanExport>>
    where
        P: FnMut(usize, usize, &str),
    {
        let ids: Vec<String> = scans
            .list()
            .await?
            .iter()
            .filter_map(|s| s.id().map(String::from))
            .collect();
        info!("Exporting findings for {} scans", ids.len());

        let total = ids.len();
        let mut index = 0usize;
        let outcome = for_each_id(&ids, |id| {
            progress(index, total, &id);
            index += 1;
            async move { self.export(&id).await }
        })
        .await;
        Ok(outcome)
    }
}

fn matches_finding(finding: &Record, severity: Option<&str>, plugin_id: Option<&str>) -> bool {
    if let Some(wanted) = severity {
        let actual = finding.get("severity").and_then(Value::as_str).unwrap_or("");
        if !actual.eq_ignore_ascii_case(wanted) {
            return false;
        }
    }
    if let Some(wanted) = plugin_id {
        if payload::record_str(finding, &["plugin_id"]).as_deref() != Some(wanted) {
            return false;
        }
    }
    true
}

fn summarize(scan_id: &str, findings: &[Record]) -> FindingsSummary {
    let mut summary = FindingsSummary {
        scan_id: scan_id.to_string(),
        total: findings.len(),
        ..Default::default()
    };
    for (level, count) in count_by_severity(findings) {
        match level {
            "critical" => summary.critical = count,
            "high" => summary.high = count,
            "medium" => summary.medium = count,
            "low" => summary.low = count,
            "info" => summary.info = count,
            _ => summary.unknown = count,
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;
    use crate::client::api::test_support;

    const FINDINGS: &str = r#"{"items":[
        {"finding_id":"f1","severity":"High","plugin_id":98000},
        {"finding_id":"f2","severity":"low","plugin_id":98001},
        {"finding_id":"f3","severity":"critical","plugin_id":98000},
        {"finding_id":"f4","plugin_id":98002}
    ]}"#;

    #[tokio::test]
    async fn test_filter_and_summary() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/was/v2/scans/s1/findings")
            .with_body(FINDINGS)
            .expect(1)
            .create_async()
            .await;

        let (transport, _) = test_support::transport(&server.url());
        let cache = crate::cache::TtlCache::new();
        let findings = FindingsApi::new(ApiContext::new(&transport, Some(&cache)));

        let high = findings.filter("s1", Some("HIGH"), None).await.unwrap();
        assert_eq!(high.len(), 1);

        let by_plugin = findings.filter("s1", None, Some("98000")).await.unwrap();
        assert_eq!(by_plugin.len(), 2);

        let summary = findings.summary("s1").await.unwrap();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.high, 1);
        assert_eq!(summary.low, 1);
        assert_eq!(summary.unknown, 1);

        let sorted = findings.sorted_by_severity("s1").await.unwrap();
        assert_eq!(sorted[0]["finding_id"], "f3");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_export_rows_carry_scan_id() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/was/v2/export/findings")
            .match_body(Matcher::Json(json!({"scan_id": "s1"})))
            .with_body(r#"{"scan_id":"s1","findings":[
                {"id":"f1","cwe":[79,80],"plugin":{"id":1}}]}"#)
            .create_async()
            .await;

        let (transport, _) = test_support::transport(&server.url());
        let export = FindingsApi::new(ApiContext::new(&transport, None))
            .export("s1")
            .await
            .unwrap();

        let rows = export.rows();
        assert_eq!(rows[0]["scan_id"], "s1");
        assert_eq!(rows[0]["cwe"], "79, 80");
        assert_eq!(rows[0]["plugin"], "{\"id\":1}");
    }

    #[tokio::test]
    async fn test_export_all_tolerates_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/was/v2/scans")
            .match_query(Matcher::Any)
            .with_body(r#"{"items":[{"scan_id":"s1"},{"id":"s2"}],"pagination":{"total":2}}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/was/v2/export/findings")
            .match_body(Matcher::Json(json!({"scan_id": "s1"})))
            .with_body(r#"{"findings":[{"id":"f1"}]}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/was/v2/export/findings")
            .match_body(Matcher::Json(json!({"scan_id": "s2"})))
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let (transport, _) = test_support::transport(&server.url());
        let ctx = ApiContext::new(&transport, None);
        let mut seen = Vec::new();
        let outcome = FindingsApi::new(ctx)
            .export_all(ScansApi::new(ctx), |i, total, id| {
                seen.push((i, total, id.to_string()))
            })
            .await
            .unwrap();

        assert_eq!(outcome.succeeded.len(), 1);
        assert_eq!(outcome.succeeded[0].1.scan_id, "s1");
        assert_eq!(outcome.failed[0].id, "s2");
        assert_eq!(outcome.failed[0].status, Some(500));
        assert_eq!(seen, vec![(0, 2, "s1".to_string()), (1, 2, "s2".to_string())]);
    }
}
