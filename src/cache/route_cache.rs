//! TTL cache of built route envelopes.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::config::CacheConfig;
use crate::observability::metrics;
use crate::route::{CacheKey, RouteEnvelope};

/// A cached response envelope.
#[derive(Debug, Clone)]
pub struct CachedEntry {
    pub envelope: Arc<RouteEnvelope>,
    pub inserted_at: Instant,
}

impl CachedEntry {
    pub fn new(envelope: RouteEnvelope) -> Self {
        Self {
            envelope: Arc::new(envelope),
            inserted_at: Instant::now(),
        }
    }

    /// True once the entry is older than `ttl`.
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) > ttl
    }
}

/// Worker-local route cache.
///
/// Reads never see an expired entry: expiry is checked on lookup and a
/// background sweep removes stale entries regardless of traffic.
#[derive(Clone)]
pub struct RouteCache {
    inner: Arc<DashMap<CacheKey, CachedEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl RouteCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
            max_entries,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs), config.max_entries)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live entry, dropping it if it has expired.
    pub fn get(&self, key: &CacheKey) -> Option<CachedEntry> {
        let now = Instant::now();
        match self.inner.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired(self.ttl, now) => return Some(entry.clone()),
            Some(_) => {}
        }

        let ttl = self.ttl;
        if self.inner.remove_if(key, |_, e| e.is_expired(ttl, now)).is_some() {
            metrics::record_cache_size(self.inner.len());
        }
        None
    }

    /// Store an entry. Last write wins.
    pub fn put(&self, key: CacheKey, entry: CachedEntry) {
        if self.inner.len() >= self.max_entries && !self.inner.contains_key(&key) {
            self.sweep();
            if self.inner.len() >= self.max_entries {
                self.evict_oldest();
            }
        }
        self.inner.insert(key, entry);
        metrics::record_cache_size(self.inner.len());
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        let before = self.inner.len();
        self.inner.retain(|_, e| !e.is_expired(ttl, now));
        let removed = before.saturating_sub(self.inner.len());
        metrics::record_cache_size(self.inner.len());
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn evict_oldest(&self) {
        let oldest = self
            .inner
            .iter()
            .min_by_key(|r| r.value().inserted_at)
            .map(|r| r.key().clone());
        if let Some(key) = oldest {
            self.inner.remove(&key);
            tracing::debug!(key = %key, "Evicted oldest route from full cache");
        }
    }

    /// Spawn the periodic expiry sweep on the current runtime.
    ///
    /// Shares the worker's scheduler with request handling, so a busy worker
    /// may run a tick late.
    pub fn spawn_sweeper(
        &self,
        period: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = cache.sweep();
                        if removed > 0 {
                            tracing::debug!(removed, remaining = cache.len(), "Swept expired routes");
                        }
                    }
                    _ = shutdown.recv() => break,
                }
            }
        })
    }
}
