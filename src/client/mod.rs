//! Tenable WAS v2 API client
//!
//! [`Transport`] performs requests (auth headers, 429 backoff, error
//! classification). The resource wrappers in [`api`] layer pagination,
//! caching and polling on top. [`WasClient`] bundles a transport with an
//! optional shared cache and hands out wrappers that all see the same cache.

pub mod api;
pub mod bulk;
pub mod clock;
pub mod models;
pub mod pagination;
pub mod payload;
pub mod poll;
pub mod rate_limit;
pub mod transport;

use std::sync::Arc;

pub use api::ApiContext;
pub use bulk::{BatchFailure, BatchOutcome};
pub use clock::Timing;
pub use pagination::{DEFAULT_PAGE_SIZE, Page, collect_all};
pub use poll::{PollOptions, wait_until_terminal};
pub use transport::{Credentials, ProxySettings, RetryPolicy, Transport, TransportSettings};

use crate::cache::TtlCache;

/// Transport plus shared cache; entry point for every resource wrapper.
pub struct WasClient {
    transport: Transport,
    cache: Option<Arc<TtlCache>>,
    /// Page size for every paginated listing; each wrapper's own default when unset
    page_size: Option<usize>,
}

impl WasClient {
    /// Client without a cache.
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            cache: None,
            page_size: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<TtlCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn cache(&self) -> Option<&Arc<TtlCache>> {
        self.cache.as_ref()
    }

    pub fn context(&self) -> ApiContext<'_> {
        ApiContext::new(&self.transport, self.cache.as_deref())
    }

    pub fn scans(&self) -> api::ScansApi<'_> {
        let scans = api::ScansApi::new(self.context());
        match self.page_size {
            Some(size) => scans.page_size(size),
            None => scans,
        }
    }

    pub fn apps(&self) -> api::AppsApi<'_> {
        api::AppsApi::new(self.context())
    }

    pub fn findings(&self) -> api::FindingsApi<'_> {
        api::FindingsApi::new(self.context())
    }

    pub fn vulns(&self) -> api::VulnsApi<'_> {
        let vulns = api::VulnsApi::new(self.context());
        match self.page_size {
            Some(size) => vulns.page_size(size),
            None => vulns,
        }
    }

    pub fn plugins(&self) -> api::PluginsApi<'_> {
        api::PluginsApi::new(self.context())
    }

    pub fn templates(&self) -> api::TemplatesApi<'_> {
        api::TemplatesApi::new(self.context())
    }

    pub fn scan_configs(&self) -> api::ScanConfigsApi<'_> {
        api::ScanConfigsApi::new(self.context())
    }

    pub fn user_templates(&self) -> api::UserTemplatesApi<'_> {
        api::UserTemplatesApi::new(self.context())
    }

    pub fn users(&self) -> api::UsersApi<'_> {
        api::UsersApi::new(self.context())
    }

    pub fn folders(&self) -> api::FoldersApi<'_> {
        api::FoldersApi::new(self.context())
    }

    pub fn filters(&self) -> api::FiltersApi<'_> {
        api::FiltersApi::new(self.context())
    }
}
