//! The Client Cache (spec §4.1).
//!
//! Bounded, TTL-expiring, LRU-evicting, thread-safe mapping from client
//! identifier to the full client record. Read-heavy by design: `get` only
//! ever takes a shared read lock and never updates access time, trading
//! precise LRU for a read path with no writer contention.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration as StdDuration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::types::{CachedClient, Client};

/// Default TTL for a cached client record.
pub const DEFAULT_TTL: StdDuration = StdDuration::from_secs(600);
/// Default maximum number of entries held in the cache.
pub const DEFAULT_MAX_SIZE: usize = 5000;
/// Floor on the background cleanup interval.
const MIN_CLEANUP_INTERVAL: StdDuration = StdDuration::from_secs(60);

/// Configuration for the Client Cache.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub ttl: StdDuration,
    pub max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL, max_size: DEFAULT_MAX_SIZE }
    }
}

impl CacheConfig {
    /// Replaces non-positive fields with defaults, logging a warning for each.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.ttl.is_zero() {
            warn!(default = ?DEFAULT_TTL, "client cache ttl must be positive; using default");
            self.ttl = DEFAULT_TTL;
        }
        if self.max_size == 0 {
            warn!(default = DEFAULT_MAX_SIZE, "client cache max_size must be positive; using default");
            self.max_size = DEFAULT_MAX_SIZE;
        }
        self
    }

    fn cleanup_interval(&self) -> StdDuration {
        std::cmp::max(self.ttl / 2, MIN_CLEANUP_INTERVAL)
    }
}

/// Monotonic hit/miss/eviction counters. Updated with atomics, never behind
/// the entries lock.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evicted: AtomicU64,
}

/// A point-in-time snapshot of `CacheStats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evicted: u64,
}

impl CacheStats {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_eviction(&self) {
        self.evicted.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
        }
    }
}

impl CacheStatsSnapshot {
    /// `hits / (hits + misses)`, or 0.0 when the denominator is 0.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded, TTL-expiring, LRU-evicting client cache.
pub struct ClientCache {
    entries: RwLock<HashMap<String, CachedClient>>,
    stats: CacheStats,
    config: CacheConfig,
    cleanup_handle: std::sync::Mutex<Option<JoinHandle<()>>>,
    cleanup_shutdown: Arc<Notify>,
}

impl ClientCache {
    /// Creates a new cache and starts its background cleanup task.
    #[must_use]
    pub fn new(config: CacheConfig) -> Arc<Self> {
        let config = config.normalized();
        let cache = Arc::new(Self {
            entries: RwLock::new(HashMap::new()),
            stats: CacheStats::default(),
            config,
            cleanup_handle: std::sync::Mutex::new(None),
            cleanup_shutdown: Arc::new(Notify::new()),
        });
        cache.clone().spawn_cleanup_task();
        cache
    }

    fn spawn_cleanup_task(self: Arc<Self>) {
        let interval_period = self.config.cleanup_interval();
        let shutdown = self.cleanup_shutdown.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval_period);
            interval.tick().await; // first tick fires immediately; discard it
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        self.evict_expired();
                    }
                    () = shutdown.notified() => {
                        debug!("client cache cleanup task stopping");
                        break;
                    }
                }
            }
        });
        *self.cleanup_handle.lock().expect("cleanup handle mutex poisoned") = Some(handle);
    }

    fn evict_expired(&self) {
        let now = Instant::now();
        let mut entries = self.entries.write().expect("client cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "client cache cleanup removed expired entries");
        }
    }

    /// Looks up a client, returning `Some(client)` iff a live entry exists.
    /// Never returns an expired entry; never itself removes one (that is the
    /// background cleanup task's job). Only ever takes a shared read lock.
    #[must_use]
    pub fn get(&self, client_id: &str) -> Option<Client> {
        let now = Instant::now();
        let entries = self.entries.read().expect("client cache lock poisoned");
        match entries.get(client_id) {
            Some(entry) if entry.is_live(now) => {
                self.stats.record_hit();
                Some(entry.client.clone())
            }
            _ => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Inserts or replaces the entry for `client_id`. Rejects an empty
    /// `client_id` (logged at warn, no state change). Evicts one victim
    /// first if inserting a new key at capacity.
    pub fn set(&self, client_id: impl Into<String>, client: Client) {
        let client_id = client_id.into();
        if client_id.is_empty() {
            warn!("rejected client cache Set with empty client_id");
            return;
        }

        let now = Instant::now();
        let entry = CachedClient { client, created_at: now, expires_at: now + self.config.ttl };

        let mut entries = self.entries.write().expect("client cache lock poisoned");
        if !entries.contains_key(&client_id) && entries.len() >= self.config.max_size {
            self.evict_one_locked(&mut entries);
        }
        entries.insert(client_id, entry);
    }

    /// Evicts the entry with the smallest `created_at`. No-op if empty.
    fn evict_one_locked(&self, entries: &mut HashMap<String, CachedClient>) {
        let victim = entries
            .iter()
            .min_by_key(|(_, entry)| entry.created_at)
            .map(|(key, _)| key.clone());
        if let Some(victim) = victim {
            entries.remove(&victim);
            self.stats.record_eviction();
        }
    }

    /// Removes the entry for `client_id` if present; silent on absent.
    pub fn invalidate(&self, client_id: &str) {
        let mut entries = self.entries.write().expect("client cache lock poisoned");
        entries.remove(client_id);
    }

    /// Removes all entries.
    pub fn clear(&self) {
        let mut entries = self.entries.write().expect("client cache lock poisoned");
        entries.clear();
    }

    /// Stops the background cleanup task. Idempotent; joins the task before
    /// returning.
    pub async fn stop(&self) {
        let handle = self.cleanup_handle.lock().expect("cleanup handle mutex poisoned").take();
        if let Some(handle) = handle {
            self.cleanup_shutdown.notify_one();
            if let Err(err) = handle.await {
                warn!(error = %err, "client cache cleanup task panicked");
            }
            info!("client cache cleanup task stopped");
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.entries.read().expect("client cache lock poisoned").len()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }
}
