//! SyncWorker - background snapshot sync
//!
//! Subscribes to the manager's event broadcast, debounces bursts, writes the
//! aggregate to the local cache and then pushes it to the remote store with
//! exponential backoff. A failed push leaves the cache dirty; the next
//! flush pushes again.

use super::cache::SnapshotCache;
use super::gateway::PersistenceGateway;
use crate::ops::{OpsManager, OpsState};
use shared::OpsEvent;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Upper bound for the backoff delay
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Timing knobs, taken from `Config`
#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    pub debounce: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

/// Sync state reported by `/health`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub gateway: String,
    /// Sequence last written to the local cache
    pub cached_sequence: u64,
    /// Sequence last confirmed by the remote store
    pub remote_sequence: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Unix milliseconds of the last successful push
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<i64>,
}

impl SyncStatus {
    pub fn is_dirty(&self) -> bool {
        self.cached_sequence > self.remote_sequence
    }
}

pub type SharedSyncStatus = Arc<RwLock<SyncStatus>>;

/// Result of one flush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub sequence: u64,
    pub cached: bool,
    pub pushed: bool,
}

pub struct SyncWorker {
    manager: Arc<OpsManager>,
    cache: SnapshotCache,
    gateway: Arc<dyn PersistenceGateway>,
    settings: SyncSettings,
    status: SharedSyncStatus,
    events: broadcast::Receiver<OpsEvent>,
    shutdown: CancellationToken,
}

impl SyncWorker {
    pub fn new(
        manager: Arc<OpsManager>,
        cache: SnapshotCache,
        gateway: Arc<dyn PersistenceGateway>,
        settings: SyncSettings,
        status: SharedSyncStatus,
        shutdown: CancellationToken,
    ) -> Self {
        status.write().gateway = gateway.name().to_string();
        // Subscribe now so nothing committed after construction is missed
        let events = manager.subscribe();
        Self {
            manager,
            cache,
            gateway,
            settings,
            status,
            events,
            shutdown,
        }
    }

    /// Run until the shutdown token fires or the broadcast closes
    ///
    /// Pending changes are flushed before returning.
    pub async fn run(mut self) {
        tracing::info!(gateway = %self.gateway.name(), "SyncWorker started");

        // Push whatever an earlier run left unsynced
        if self.cache.is_dirty().unwrap_or(false) {
            self.flush().await;
        }

        let mut debounce_deadline: Option<Instant> = None;

        loop {
            let sleep_until =
                debounce_deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("SyncWorker shutting down");
                    if debounce_deadline.is_some() || self.has_uncached_changes() {
                        self.flush().await;
                    }
                    break;
                }

                _ = tokio::time::sleep_until(sleep_until), if debounce_deadline.is_some() => {
                    debounce_deadline = None;
                    self.flush().await;
                }

                result = self.events.recv() => {
                    match result {
                        Ok(_) => {
                            debounce_deadline = Some(Instant::now() + self.settings.debounce);
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            // The snapshot covers everything, so missed events cost nothing
                            tracing::debug!(skipped = n, "SyncWorker lagged");
                            debounce_deadline = Some(Instant::now() + self.settings.debounce);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::info!("Broadcast channel closed, SyncWorker stopping");
                            if debounce_deadline.is_some() || self.has_uncached_changes() {
                                self.flush().await;
                            }
                            break;
                        }
                    }
                }
            }
        }

        tracing::info!("SyncWorker stopped");
    }

    /// Commits that happened but were not written to the cache yet
    ///
    /// Covers events still queued in the channel when shutdown wins the select.
    fn has_uncached_changes(&self) -> bool {
        self.manager.current_sequence() > self.status.read().cached_sequence
    }

    /// Write the current snapshot to the cache, then push it to the remote store
    pub async fn flush(&self) -> FlushReport {
        let snapshot = self.manager.snapshot();
        let sequence = snapshot.sequence;

        let cached = match self.cache.save(&snapshot) {
            Ok(()) => {
                self.status.write().cached_sequence = sequence;
                true
            }
            Err(e) => {
                tracing::error!(sequence, error = %e, "Failed to write snapshot cache");
                false
            }
        };

        let pushed = match self.push_with_retry(&snapshot).await {
            Ok(()) => {
                if let Err(e) = self.cache.mark_synced(sequence) {
                    tracing::error!(sequence, error = %e, "Failed to record sync confirmation");
                }
                let mut status = self.status.write();
                status.remote_sequence = status.remote_sequence.max(sequence);
                status.last_error = None;
                status.last_synced_at = Some(shared::util::now_millis());
                tracing::debug!(sequence, "Snapshot synced");
                true
            }
            Err(e) => {
                tracing::error!(sequence, error = %e, "Snapshot sync failed after retries, cache stays dirty");
                self.status.write().last_error = Some(e);
                false
            }
        };

        FlushReport {
            sequence,
            cached,
            pushed,
        }
    }

    /// Push with exponential backoff retry
    async fn push_with_retry(&self, snapshot: &OpsState) -> Result<(), String> {
        let attempts = self.settings.max_retries.max(1);
        let mut delay = self.settings.retry_delay;

        for attempt in 0..attempts {
            match self.gateway.sync_snapshot(snapshot).await.into_result() {
                Ok(_) => return Ok(()),
                Err(e) if attempt + 1 < attempts => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Snapshot sync attempt failed, retrying: {e}"
                    );
                    tokio::select! {
                        _ = self.shutdown.cancelled() => return Err(e),
                        _ = tokio::time::sleep(delay) => {}
                    }
                    delay = (delay * 2).min(MAX_RETRY_DELAY);
                }
                Err(e) => return Err(e),
            }
        }

        Err("no sync attempt made".to_string())
    }
}
