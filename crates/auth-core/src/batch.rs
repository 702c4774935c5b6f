//! The Token Batch Writer (spec §4.2).
//!
//! Converts per-request synchronous Store writes into batched asynchronous
//! writes. A single mutex-protected buffer absorbs `add` calls; a background
//! timer task and size-triggered flushes drain it via a swap-then-write
//! pattern so concurrent flushes never interleave.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::storage::Store;
use crate::types::IssuedToken;

/// Default maximum buffered tokens before a size-triggered flush.
pub const DEFAULT_MAX_BATCH: usize = 1000;
/// Default period between time-triggered flushes.
pub const DEFAULT_FLUSH_INTERVAL: StdDuration = StdDuration::from_secs(5);

/// Configuration for the Token Batch Writer.
#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    pub max_batch: usize,
    pub flush_interval: StdDuration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { max_batch: DEFAULT_MAX_BATCH, flush_interval: DEFAULT_FLUSH_INTERVAL }
    }
}

impl BatchConfig {
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.max_batch == 0 {
            warn!(default = DEFAULT_MAX_BATCH, "batch writer max_batch must be positive; using default");
            self.max_batch = DEFAULT_MAX_BATCH;
        }
        if self.flush_interval.is_zero() {
            warn!(default = ?DEFAULT_FLUSH_INTERVAL, "batch writer flush_interval must be positive; using default");
            self.flush_interval = DEFAULT_FLUSH_INTERVAL;
        }
        self
    }
}

/// Asynchronous batching writer for issued tokens.
pub struct TokenBatchWriter {
    pending: Mutex<Vec<IssuedToken>>,
    store: Arc<dyn Store>,
    config: BatchConfig,
    timer_handle: std::sync::Mutex<Option<JoinHandle<()>>>,
    timer_shutdown: Arc<Notify>,
    stopped: AtomicBool,
}

impl TokenBatchWriter {
    /// Creates a writer and starts its background flush timer.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: BatchConfig) -> Arc<Self> {
        let config = config.normalized();
        let writer = Arc::new(Self {
            pending: Mutex::new(Vec::new()),
            store,
            config,
            timer_handle: std::sync::Mutex::new(None),
            timer_shutdown: Arc::new(Notify::new()),
            stopped: AtomicBool::new(false),
        });
        writer.clone().spawn_timer();
        writer
    }

    fn spawn_timer(self: Arc<Self>) {
        let interval_period = self.config.flush_interval;
        let shutdown = self.timer_shutdown.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval_period);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        self.flush().await;
                    }
                    () = shutdown.notified() => {
                        debug!("batch writer timer task stopping");
                        break;
                    }
                }
            }
        });
        *self.timer_handle.lock().expect("timer handle mutex poisoned") = Some(handle);
    }

    /// Enqueues a token. Rejects malformed records (empty `token_id` or
    /// `client_id`) without error. Never blocks on a flush.
    pub async fn add(self: &Arc<Self>, token: IssuedToken) {
        if !token.is_well_formed() {
            warn!("rejected batch writer Add with empty token_id or client_id");
            return;
        }

        let should_flush = {
            let mut pending = self.pending.lock().await;
            pending.push(token);
            pending.len() >= self.config.max_batch
        };

        if should_flush {
            let writer = Arc::clone(self);
            tokio::spawn(async move {
                writer.flush().await;
            });
        }
    }

    /// Current buffered count.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Swaps the pending buffer for an empty one and persists the snapshot
    /// in a single transaction. A no-op on an empty snapshot.
    async fn flush(&self) {
        let batch = {
            let mut pending = self.pending.lock().await;
            if pending.is_empty() {
                return;
            }
            std::mem::take(&mut *pending)
        };

        let size = batch.len();
        if let Err(err) = self.store.insert_tokens(&batch).await {
            error!(batch_size = size, error = %err, "batch flush failed; tokens lost to the store");
        } else {
            debug!(batch_size = size, "batch flush committed");
        }
    }

    /// Stops the background timer, then performs one final synchronous
    /// flush. Idempotent.
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }

        let handle = self.timer_handle.lock().expect("timer handle mutex poisoned").take();
        if let Some(handle) = handle {
            self.timer_shutdown.notify_one();
            if let Err(err) = handle.await {
                warn!(error = %err, "batch writer timer task panicked");
            }
        }

        self.flush().await;
    }
}
