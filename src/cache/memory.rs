//! In-process TTL cache partitioned by namespace

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::debug;
use serde_json::Value;

use crate::client::clock::{Clock, SystemClock};

/// A stored value with its insertion time and optional lifetime.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub created_at: Instant,
    pub ttl: Option<Duration>,
}

impl<V> CacheEntry<V> {
    /// Expired iff more than `ttl` has elapsed since insertion.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.saturating_duration_since(self.created_at) > ttl,
            None => false,
        }
    }
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<V> {
    Hit(V),
    Missing,
    /// Present but past its TTL; the entry has been evicted.
    Expired,
}

impl<V> Lookup<V> {
    pub fn hit(self) -> Option<V> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Missing | Lookup::Expired => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }
}

type Namespaces<V> = HashMap<String, HashMap<String, CacheEntry<V>>>;

/// Thread-safe namespace → key → entry store with lazy expiry.
///
/// A single mutex guards the whole map; every operation is a hash lookup so
/// the lock is held only briefly.
pub struct TtlCache<V = Value> {
    store: Mutex<Namespaces<V>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Namespaces<V>> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store a value, replacing any existing entry. `None` never expires.
    pub fn set(&self, namespace: &str, key: &str, value: V, ttl: Option<Duration>) {
        let entry = CacheEntry {
            value,
            created_at: self.clock.now(),
            ttl,
        };
        self.lock()
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), entry);
    }

    /// Look up a live value, evicting it if it has expired.
    pub fn lookup(&self, namespace: &str, key: &str) -> Lookup<V> {
        let now = self.clock.now();
        let mut store = self.lock();
        let Some(entries) = store.get_mut(namespace) else {
            return Lookup::Missing;
        };

        match entries.get(key) {
            None => Lookup::Missing,
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                debug!("Cache expired: {}/{}", namespace, key);
                Lookup::Expired
            }
            Some(entry) => Lookup::Hit(entry.value.clone()),
        }
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<V> {
        self.lookup(namespace, key).hit()
    }

    /// Remove an entry; absent keys are ignored.
    pub fn delete(&self, namespace: &str, key: &str) {
        if let Some(entries) = self.lock().get_mut(namespace) {
            entries.remove(key);
        }
    }

    pub fn clear_namespace(&self, namespace: &str) {
        if let Some(entries) = self.lock().get_mut(namespace) {
            entries.clear();
        }
    }

    pub fn clear_all(&self) {
        self.lock().clear();
    }

    /// Bulk-load entries into one namespace with a shared TTL.
    pub fn warm<I>(&self, namespace: &str, items: I, ttl: Option<Duration>)
    where
        I: IntoIterator<Item = (String, V)>,
    {
        let now = self.clock.now();
        let mut store = self.lock();
        let entries = store.entry(namespace.to_string()).or_default();
        let mut count = 0usize;
        for (key, value) in items {
            entries.insert(
                key,
                CacheEntry {
                    value,
                    created_at: now,
                    ttl,
                },
            );
            count += 1;
        }
        debug!("Cache warmed: {} entries in {}", count, namespace);
    }

    /// Number of stored entries in a namespace, expired ones included until looked up.
    pub fn len(&self, namespace: &str) -> usize {
        self.lock().get(namespace).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().values().all(HashMap::is_empty)
    }

    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }
}
