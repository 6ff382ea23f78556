//! Resource wrappers over the WAS v2 API
//!
//! Each wrapper is built from an [`ApiContext`]: the shared [`Transport`] and
//! an optional shared [`TtlCache`]. No wrapper owns a cache of its own, so
//! entries written by one are visible to every other built from the same
//! context.

mod apps;
mod filters;
mod findings;
mod folders;
mod plugins;
mod scans;
mod templates;
mod users;
mod vulns;

pub use apps::AppsApi;
pub use filters::{FilterKind, FiltersApi};
pub use findings::{FindingsApi, FindingsSummary, ScanExport};
pub use folders::FoldersApi;
pub use plugins::{PluginsApi, plugin_rows};
pub use scans::ScansApi;
pub use templates::{ScanConfigsApi, TemplatesApi, UserTemplatesApi};
pub use users::{Owner, UsersApi};
pub use vulns::{VulnFilters, VulnsApi, flatten_vuln_rows};

use std::future::Future;
use std::time::Duration;

use log::debug;
use serde_json::Value;

use super::transport::Transport;
use crate::cache::{Lookup, TtlCache};
use crate::error::Result;

/// Shared handles passed to every resource wrapper.
#[derive(Clone, Copy)]
pub struct ApiContext<'a> {
    pub transport: &'a Transport,
    pub cache: Option<&'a TtlCache>,
}

impl<'a> ApiContext<'a> {
    pub fn new(transport: &'a Transport, cache: Option<&'a TtlCache>) -> Self {
        Self { transport, cache }
    }

    /// Serve from cache when live, otherwise run `fetch` and store the result.
    pub async fn cached<F, Fut>(
        &self,
        namespace: &str,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if let Some(cache) = self.cache {
            match cache.lookup(namespace, key) {
                Lookup::Hit(value) => {
                    debug!("Cache hit: {}/{}", namespace, key);
                    return Ok(value);
                }
                Lookup::Expired => debug!("Cache expired: {}/{}", namespace, key),
                Lookup::Missing => debug!("Cache miss: {}/{}", namespace, key),
            }
        }

        let value = fetch().await?;
        self.store(namespace, key, value.clone(), ttl);
        Ok(value)
    }

    pub fn store(&self, namespace: &str, key: &str, value: Value, ttl: Duration) {
        if let Some(cache) = self.cache {
            cache.set(namespace, key, value, Some(ttl));
        }
    }

    pub fn evict(&self, namespace: &str, key: &str) {
        if let Some(cache) = self.cache {
            cache.delete(namespace, key);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::client::clock::{RecordingSleeper, SystemClock, Timing};
    use crate::client::transport::{Credentials, Transport, TransportSettings};

    /// Transport against a mock server with sleeps recorded instead of slept.
    pub fn transport(url: &str) -> (Transport, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::new());
        let transport = transport_with(url, Timing::new(Arc::new(SystemClock), sleeper.clone()));
        (transport, sleeper)
    }

    pub fn transport_with(url: &str, timing: Timing) -> Transport {
        let settings = TransportSettings::new(Credentials::access_keys("ak", "sk")).base_url(url);
        Transport::new(settings).unwrap().with_timing(timing)
    }
}
