//! Read-through snapshot cache.
//!
//! One snapshot slot per data source, guarded by a single async mutex. The
//! fetch runs while the lock is held, so concurrent readers during a miss
//! wait for the first fetch instead of starting their own.
//!
//! # Slot States
//!
//! - empty: nothing fetched yet, or explicitly invalidated
//! - fresh: fetched less than `ttl` ago
//! - stale: fetched `ttl` or more ago, detected lazily on the next read

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::{
    error::AppError,
    models::{snapshot::Snapshot, transaction::Transaction},
    services::DataSource,
};

/// How long a fetched snapshot is served before the next read refetches it.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct Cached {
    snapshot: Arc<Snapshot>,
    fetched_at: Instant,
}

/// Caches the latest snapshot of one data source.
pub struct SnapshotCache {
    source: Arc<dyn DataSource>,
    ttl: Duration,
    slot: Mutex<Option<Cached>>,
}

impl SnapshotCache {
    pub fn new(source: Arc<dyn DataSource>, ttl: Duration) -> Self {
        SnapshotCache {
            source,
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    /// Return the cached snapshot, fetching a new one when the slot is empty,
    /// stale, or `force_fresh` is set.
    ///
    /// # Errors
    ///
    /// A failed fetch is returned as-is and leaves the previous snapshot in place.
    pub async fn get(&self, force_fresh: bool) -> Result<Arc<Snapshot>, AppError> {
        let mut slot = self.slot.lock().await;

        if !force_fresh {
            if let Some(cached) = slot.as_ref() {
                if cached.fetched_at.elapsed() < self.ttl {
                    return Ok(cached.snapshot.clone());
                }
            }
        }

        let started = Instant::now();
        let snapshot = Arc::new(self.source.load().await?);
        tracing::info!(
            source = self.source.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            transactions = snapshot.transactions.len(),
            "Snapshot loaded"
        );

        *slot = Some(Cached {
            snapshot: snapshot.clone(),
            fetched_at: started,
        });
        Ok(snapshot)
    }

    /// Drop the cached snapshot so that the next read fetches.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        *slot = None;
        tracing::debug!(source = self.source.name(), "Snapshot cache cleared");
    }

    /// Append `tx` to the cached snapshot and apply it to its account balance.
    ///
    /// Returns false, changing nothing, when no snapshot is cached. Readers
    /// holding the previous snapshot keep their copy; later reads see the
    /// patched one.
    pub async fn append_transaction(&self, tx: Transaction) -> bool {
        let mut slot = self.slot.lock().await;
        match slot.as_mut() {
            Some(cached) => {
                Arc::make_mut(&mut cached.snapshot).append(tx);
                true
            }
            None => false,
        }
    }
}
