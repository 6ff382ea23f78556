//! Offset/limit pagination
//!
//! [`collect_all`] drains a listing by calling a page-fetch closure until the
//! server reports nothing more. The closure is the only thing that differs
//! between endpoints (query-string paging for scans, body paging for vulns).

use std::future::Future;

use log::{debug, warn};
use serde_json::Value;

use super::payload;
use crate::error::Result;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Upper bound on page fetches for a listing that never reports a total.
pub const MAX_PAGES_WITHOUT_TOTAL: usize = 1000;

/// One page of a listing with whatever pagination metadata the server sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: Option<usize>,
    /// Offset echoed by the server for this page
    pub offset: Option<usize>,
    /// Limit echoed by the server for this page
    pub limit: Option<usize>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            total: None,
            offset: None,
            limit: None,
        }
    }

    pub fn total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    /// Record the server's own offset/limit echo.
    pub fn echo(mut self, offset: usize, limit: usize) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }
}

impl Page<Value> {
    /// Read a page out of a JSON payload.
    ///
    /// Items come from the first of `item_keys` holding an array. Metadata is
    /// read from a `pagination` object when present, else from the top level.
    pub fn from_payload(value: &Value, item_keys: &[&str]) -> Self {
        let items = payload::items_under(value, item_keys);
        let meta = value
            .get("pagination")
            .filter(|p| p.is_object())
            .unwrap_or(value);

        Self {
            items,
            total: payload::usize_field(meta, &["total", "total_count"]),
            offset: payload::usize_field(meta, &["offset"]),
            limit: payload::usize_field(meta, &["limit", "size"]),
        }
    }
}

/// Fetch every page and concatenate items in server order.
///
/// Stops when the accumulated count reaches the reported total, when a page
/// comes back empty, or (with no total) when a page is shorter than `limit`.
/// Without a total, a page whose echoed offset is behind the requested one is
/// a repeat and is dropped, and fetching stops after
/// [`MAX_PAGES_WITHOUT_TOTAL`] pages. The next offset is the server's
/// `offset + limit` echo when both are present and move forward, otherwise
/// `offset + items.len()`.
pub async fn collect_all<T, F, Fut>(limit: usize, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let limit = limit.max(1);
    let mut offset = 0usize;
    let mut all: Vec<T> = Vec::new();
    let mut pages = 0usize;

    loop {
        let page = fetch(limit, offset).await?;
        pages += 1;
        let received = page.items.len();

        if received == 0 {
            debug!("Empty page at offset {}, stopping", offset);
            break;
        }

        if page.total.is_none() && page.offset.is_some_and(|o| o < offset) {
            warn!(
                "Server echoed offset {:?} for requested offset {}, stopping",
                page.offset, offset
            );
            break;
        }

        all.extend(page.items);

        match page.total {
            Some(total) if all.len() >= total => break,
            None if received < limit => break,
            None if pages >= MAX_PAGES_WITHOUT_TOTAL => {
                warn!(
                    "No total after {} full pages ({} items), stopping",
                    pages,
                    all.len()
                );
                break;
            }
            _ => {}
        }

        let fallback = offset + received;
        offset = match (page.offset, page.limit) {
            (Some(o), Some(l)) if o + l > offset => o + l,
            _ => fallback,
        };
        debug!("Fetched {} items so far, next offset {}", all.len(), offset);
    }

    Ok(all)
}
