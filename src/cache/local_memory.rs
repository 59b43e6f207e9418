//! Per-process in-memory cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::CacheError;
use crate::config::CachePolicy;

/// Entry lifetime requested on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Use the cache's configured default.
    Default,
    /// Keep until evicted or deleted.
    Never,
    After(Duration),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    expires_at: Option<Instant>,
    last_used: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// A thread-safe cache living inside one process.
///
/// Clones share storage. Nothing is shared across processes, so each
/// application instance holds its own independent copy.
#[derive(Debug, Clone)]
pub struct LocalMemoryCache {
    inner: Arc<DashMap<String, CacheEntry>>,
    location: String,
    default_timeout: Duration,
    max_entries: usize,
    cull_frequency: usize,
}

impl LocalMemoryCache {
    /// Create an empty cache from the resolved cache settings.
    pub fn from_policy(policy: &CachePolicy) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            location: policy.location.clone(),
            default_timeout: Duration::from_secs(policy.default_timeout_secs),
            max_entries: policy.max_entries.max(1),
            cull_frequency: policy.cull_frequency,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Fetch a live value, refreshing its recency.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let now = Instant::now();
        let value = match self.inner.get_mut(key) {
            Some(mut entry) if !entry.is_expired(now) => {
                entry.last_used = now;
                entry.value.clone()
            }
            Some(entry) => {
                drop(entry);
                self.inner.remove_if(key, |_, e| e.is_expired(now));
                return Ok(None);
            }
            None => return Ok(None),
        };
        Ok(Some(serde_json::from_value(value)?))
    }

    /// Store a value, replacing any existing entry.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, timeout: Timeout) -> Result<(), CacheError> {
        let entry = self.entry_for(value, timeout)?;
        if !self.inner.contains_key(key) {
            self.make_room();
        }
        self.inner.insert(key.to_string(), entry);
        Ok(())
    }

    /// Store a value only if no live entry exists. Returns whether it was stored.
    pub fn add<T: Serialize>(&self, key: &str, value: &T, timeout: Timeout) -> Result<bool, CacheError> {
        let entry = self.entry_for(value, timeout)?;
        let now = Instant::now();
        if self.inner.get(key).is_some_and(|e| !e.is_expired(now)) {
            return Ok(false);
        }
        self.make_room();
        let stored = match self.inner.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(entry);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
                true
            }
        };
        Ok(stored)
    }

    /// Remove an entry. Returns whether a live entry was removed.
    pub fn delete(&self, key: &str) -> bool {
        let now = Instant::now();
        self.inner
            .remove(key)
            .is_some_and(|(_, entry)| !entry.is_expired(now))
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Number of stored entries, including ones expired but not yet purged.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn entry_for<T: Serialize>(&self, value: &T, timeout: Timeout) -> Result<CacheEntry, CacheError> {
        let now = Instant::now();
        // Lifetimes past the representable horizon never expire.
        let expires_at = match timeout {
            Timeout::Default => now.checked_add(self.default_timeout),
            Timeout::Never => None,
            Timeout::After(d) => now.checked_add(d),
        };
        Ok(CacheEntry {
            value: serde_json::to_value(value)?,
            expires_at,
            last_used: now,
        })
    }

    /// Purge expired entries, then cull least recently used ones if still full.
    fn make_room(&self) {
        if self.inner.len() < self.max_entries {
            return;
        }

        let now = Instant::now();
        self.inner.retain(|_, entry| !entry.is_expired(now));
        if self.inner.len() < self.max_entries {
            return;
        }

        if self.cull_frequency == 0 {
            self.inner.clear();
            tracing::debug!(location = %self.location, "Cache full, cleared");
            return;
        }

        let mut by_age: Vec<(String, Instant)> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().last_used))
            .collect();
        by_age.sort_by_key(|(_, used)| *used);

        let count = (by_age.len() / self.cull_frequency).max(1);
        for (key, _) in by_age.into_iter().take(count) {
            self.inner.remove(&key);
        }
        tracing::debug!(location = %self.location, culled = count, "Cache full, culled entries");
    }
}
