//! In-memory response cache
//!
//! A process-local TTL store shared explicitly between API wrappers. Nothing
//! is persisted; a fresh process starts cold.

pub mod key;
pub mod memory;

use std::time::Duration;

/// Cache TTL configuration per data type
pub struct CacheTtl;

impl CacheTtl {
    // Scans change state while running
    pub const SCANS: Duration = Duration::from_secs(5 * 60); // 5 min
    pub const SCAN_LIST: Duration = Duration::from_secs(2 * 60); // 2 min

    // Findings and vulns are stable once a scan completes, triage aside
    pub const FINDINGS: Duration = Duration::from_secs(10 * 60); // 10 min
    pub const VULN_SEARCH: Duration = Duration::from_secs(5 * 60); // 5 min

    // Relatively stable data
    pub const APPS: Duration = Duration::from_secs(10 * 60); // 10 min
    pub const USERS: Duration = Duration::from_secs(60 * 60); // 1 hr
    pub const PLUGINS: Duration = Duration::from_secs(60 * 60); // 1 hr
    pub const TEMPLATES: Duration = Duration::from_secs(60 * 60); // 1 hr
}

/// Namespace names used by the API wrappers.
pub mod ns {
    pub const SCANS: &str = "scans";
    pub const LISTINGS: &str = "listings";
    pub const APPS: &str = "apps";
    pub const FINDINGS: &str = "findings";
    pub const VULNS: &str = "vulns";
    pub const USERS: &str = "users";
    pub const PLUGINS: &str = "plugins";
    pub const TEMPLATES: &str = "templates";
}

pub use key::{body_key, cache_key};
pub use memory::{CacheEntry, Lookup, TtlCache};
