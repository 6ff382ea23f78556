//! Scans: listing, launch, polling and ownership

use log::{debug, info};
use serde_json::{Value, json};

use super::ApiContext;
use crate::cache::{CacheTtl, cache_key, ns};
use crate::client::bulk::{BatchOutcome, for_each_id};
use crate::client::models::{Scan, ScanSummary};
use crate::client::pagination::{DEFAULT_PAGE_SIZE, Page, collect_all};
use crate::client::payload::{self, Record};
use crate::client::poll::{PollOptions, wait_until_terminal};
use crate::error::Result;

const SCANS_PATH: &str = "/was/v2/scans";
const ITEM_KEYS: &[&str] = &["items", "scans", "data"];

/// Scan operations
#[derive(Clone, Copy)]
pub struct ScansApi<'a> {
    ctx: ApiContext<'a>,
    page_size: usize,
}

impl<'a> ScansApi<'a> {
    pub fn new(ctx: ApiContext<'a>) -> Self {
        Self {
            ctx,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// One page of the scan listing.
    pub async fn list_page(&self, limit: usize, offset: usize) -> Result<Page<Value>> {
        let raw = self
            .ctx
            .transport
            .get_with(
                SCANS_PATH,
                &[("limit", limit.to_string()), ("offset", offset.to_string())],
            )
            .await?;
        Ok(Page::from_payload(&raw, ITEM_KEYS))
    }

    /// Every scan, all pages. Individual scans are cached as a side effect.
    pub async fn list(&self) -> Result<Vec<Scan>> {
        let key = cache_key(SCANS_PATH, &[]);
        let raw = self
            .ctx
            .cached(ns::LISTINGS, &key, CacheTtl::SCAN_LIST, || async {
                let items = collect_all(self.page_size, |limit, offset| {
                    self.list_page(limit, offset)
                })
                .await?;
                Ok(Value::Array(items))
            })
            .await?;

        let scans: Vec<Scan> = serde_json::from_value(raw)?;
        if let Some(cache) = self.ctx.cache {
            let entries = scans
                .iter()
                .filter_map(|s| Some((s.id()?.to_string(), serde_json::to_value(s).ok()?)));
            cache.warm(ns::SCANS, entries, Some(CacheTtl::SCANS));
        }
        info!("Loaded {} scans", scans.len());
        Ok(scans)
    }

    /// Scan details, served from cache when live.
    pub async fn get(&self, scan_id: &str) -> Result<Scan> {
        let raw = self
            .ctx
            .cached(ns::SCANS, scan_id, CacheTtl::SCANS, || async move {
                self.ctx.transport.get(&scan_path(scan_id)).await
            })
            .await?;
        Ok(serde_json::from_value(raw)?)
    }

    /// Scan details straight from the API; refreshes the cached copy.
    pub async fn get_fresh(&self, scan_id: &str) -> Result<Scan> {
        let raw = self.ctx.transport.get(&scan_path(scan_id)).await?;
        self.ctx.store(ns::SCANS, scan_id, raw.clone(), CacheTtl::SCANS);
        Ok(serde_json::from_value(raw)?)
    }

    /// Current raw status, always fetched live.
    pub async fn status(&self, scan_id: &str) -> Result<Option<String>> {
        Ok(self.get_fresh(scan_id).await?.status)
    }

    pub async fn summary(&self, scan_id: &str) -> Result<ScanSummary> {
        Ok(self.get(scan_id).await?.summary())
    }

    /// Start a scan. The cached copy is dropped since its status is now stale.
    pub async fn launch(&self, scan_id: &str) -> Result<Value> {
        info!("Launching scan {}", scan_id);
        let response = self
            .ctx
            .transport
            .post(&format!("{}/launch", scan_path(scan_id)), None)
            .await?;
        self.ctx.evict(ns::SCANS, scan_id);
        Ok(response)
    }

    /// Poll until the scan reaches a terminal status. Never reads the cache.
    pub async fn wait_until_complete(&self, scan_id: &str, options: &PollOptions) -> Result<Scan> {
        let label = format!("scan {}", scan_id);
        wait_until_terminal(
            &label,
            options,
            self.ctx.transport.timing(),
            || self.get_fresh(scan_id),
            |scan: &Scan| scan.status.clone(),
        )
        .await
    }

    /// Launch once, then poll. A failed launch never polls.
    pub async fn launch_and_wait(&self, scan_id: &str, options: &PollOptions) -> Result<Scan> {
        self.launch(scan_id).await?;
        self.wait_until_complete(scan_id, options).await
    }

    /// Reassign a scan to another user.
    pub async fn change_owner(&self, scan_id: &str, user_id: &str) -> Result<Value> {
        debug!("Changing owner of scan {} to {}", scan_id, user_id);
        let body = json!({ "user_id": user_id });
        let response = self
            .ctx
            .transport
            .put(&format!("{}/owner", scan_path(scan_id)), &body)
            .await?;
        self.ctx.evict(ns::SCANS, scan_id);
        Ok(response)
    }

    /// Reassign several scans one at a time; failures are recorded per scan.
    pub async fn change_owner_bulk(
        &self,
        scan_ids: &[String],
        user_id: &str,
    ) -> BatchOutcome<Value> {
        let outcome = for_each_id(scan_ids, |id| async move {
            self.change_owner(&id, user_id).await
        })
        .await;
        info!(
            "Owner change: {} succeeded, {} failed",
            outcome.succeeded.len(),
            outcome.failed.len()
        );
        outcome
    }

    /// Scanner notes attached to a scan.
    pub async fn notes(&self, scan_id: &str) -> Result<Vec<Record>> {
        let raw = self
            .ctx
            .transport
            .get(&format!("{}/notes", scan_path(scan_id)))
            .await?;
        Ok(payload::records_under(raw, &["items", "notes"]))
    }
}

fn scan_path(scan_id: &str) -> String {
    format!("{}/{}", SCANS_PATH, scan_id)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use mockito::Matcher;

    use super::*;
    use crate::cache::TtlCache;
    use crate::client::api::test_support;
    use crate::client::clock::{ManualClock, RecordingSleeper, Timing};
    use crate::error::{ApiError, Error};

    #[tokio::test]
    async fn test_list_pages_through_query_params() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/was/v2/scans")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "2".into()),
                Matcher::UrlEncoded("offset".into(), "0".into()),
            ]))
            .with_body(r#"{"items":[{"scan_id":"a"},{"scan_id":"b"}],
                "pagination":{"total":3,"offset":0,"limit":2}}"#)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/was/v2/scans")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "2".into()),
                Matcher::UrlEncoded("offset".into(), "2".into()),
            ]))
            .with_body(r#"{"items":[{"scan_id":"c"}],
                "pagination":{"total":3,"offset":2,"limit":2}}"#)
            .create_async()
            .await;

        let (transport, _) = test_support::transport(&server.url());
        let cache = TtlCache::new();
        let scans = ScansApi::new(ApiContext::new(&transport, Some(&cache))).page_size(2);

        let all = scans.list().await.unwrap();
        let ids: Vec<&str> = all.iter().filter_map(Scan::id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(cache.len(ns::SCANS), 3);

        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_uses_shared_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/was/v2/scans/s1")
            .with_body(r#"{"scan_id":"s1","status":"running"}"#)
            .expect(1)
            .create_async()
            .await;

        let (transport, _) = test_support::transport(&server.url());
        let cache = TtlCache::new();
        let scans = ScansApi::new(ApiContext::new(&transport, Some(&cache)));

        scans.get("s1").await.unwrap();
        let again = scans.get("s1").await.unwrap();
        assert_eq!(again.status.as_deref(), Some("running"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_wait_bypasses_cache() {
        let mut server = mockito::Server::new_async().await;
        let running = server
            .mock("GET", "/was/v2/scans/s1")
            .with_body(r#"{"scan_id":"s1","status":"running"}"#)
            .expect(2)
            .create_async()
            .await;
        let done = server
            .mock("GET", "/was/v2/scans/s1")
            .with_body(r#"{"scan_id":"s1","status":"completed"}"#)
            .expect(1)
            .create_async()
            .await;

        let clock = Arc::new(ManualClock::new());
        let sleeper = Arc::new(RecordingSleeper::driving(clock.clone()));
        let transport =
            test_support::transport_with(&server.url(), Timing::new(clock, sleeper.clone()));
        let cache = TtlCache::new();
        cache.set(
            ns::SCANS,
            "s1",
            serde_json::json!({"scan_id": "s1", "status": "completed"}),
            None,
        );
        let scans = ScansApi::new(ApiContext::new(&transport, Some(&cache)));

        let scan = scans
            .wait_until_complete("s1", &PollOptions::default())
            .await
            .unwrap();

        assert_eq!(scan.status(), "completed");
        assert_eq!(sleeper.calls(), vec![Duration::from_secs(20); 2]);
        running.assert_async().await;
        done.assert_async().await;
    }

    #[tokio::test]
    async fn test_launch_failure_never_polls() {
        let mut server = mockito::Server::new_async().await;
        let launch = server
            .mock("POST", "/was/v2/scans/s1/launch")
            .with_status(403)
            .with_body(r#"{"error":"forbidden"}"#)
            .expect(1)
            .create_async()
            .await;
        let poll = server
            .mock("GET", "/was/v2/scans/s1")
            .expect(0)
            .create_async()
            .await;

        let (transport, _) = test_support::transport(&server.url());
        let scans = ScansApi::new(ApiContext::new(&transport, None));
        let err = scans
            .launch_and_wait("s1", &PollOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::Status { status: 403, .. })));
        launch.assert_async().await;
        poll.assert_async().await;
    }

    #[tokio::test]
    async fn test_launch_evicts_cached_scan() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/was/v2/scans/s1/launch")
            .with_status(202)
            .with_body("")
            .create_async()
            .await;

        let (transport, _) = test_support::transport(&server.url());
        let cache = TtlCache::new();
        cache.set(ns::SCANS, "s1", serde_json::json!({"status": "completed"}), None);
        let scans = ScansApi::new(ApiContext::new(&transport, Some(&cache)));

        assert_eq!(scans.launch("s1").await.unwrap(), Value::Null);
        assert!(cache.get(ns::SCANS, "s1").is_none());
    }

    #[tokio::test]
    async fn test_change_owner_bulk_records_failures() {
        let mut server = mockito::Server::new_async().await;
        for id in ["s1", "s2", "s4", "s5"] {
            server
                .mock("PUT", format!("/was/v2/scans/{}/owner", id).as_str())
                .match_body(Matcher::Json(serde_json::json!({"user_id": "u-9"})))
                .with_body("{}")
                .create_async()
                .await;
        }
        server
            .mock("PUT", "/was/v2/scans/s3/owner")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let (transport, _) = test_support::transport(&server.url());
        let scans = ScansApi::new(ApiContext::new(&transport, None));
        let ids: Vec<String> = (1..=5).map(|i| format!("s{}", i)).collect();

        let outcome = scans.change_owner_bulk(&ids, "u-9").await;
        assert_eq!(outcome.succeeded.len(), 4);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].id, "s3");
        assert_eq!(outcome.failed[0].status, Some(404));
    }

    #[tokio::test]
    async fn test_notes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/was/v2/scans/s1/notes")
            .with_body(r#"{"items":[
                {"scan_note_id":"n1","severity":"high","title":"Authentication Failed"}]}"#)
            .create_async()
            .await;

        let (transport, _) = test_support::transport(&server.url());
        let notes = ScansApi::new(ApiContext::new(&transport, None))
            .notes("s1")
            .await
            .unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0]["title"], "Authentication Failed");
    }
}
