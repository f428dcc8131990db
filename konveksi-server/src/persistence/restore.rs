//! Startup restore
//!
//! Loads the remote and the local snapshot and restores the newest one by
//! sequence. A snapshot the manager refuses (broken ledger) falls through to
//! the other source.

use super::cache::SnapshotCache;
use super::gateway::PersistenceGateway;
use crate::ops::{OpsManager, OpsState};
use serde::Serialize;

/// Where the running state came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "sequence", rename_all = "snake_case")]
pub enum RestoreSource {
    Remote(u64),
    Local(u64),
    Empty,
}

pub async fn restore_latest(
    manager: &OpsManager,
    cache: &SnapshotCache,
    gateway: &dyn PersistenceGateway,
) -> RestoreSource {
    let remote = match gateway.get_snapshot().await.into_result() {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(gateway = %gateway.name(), error = %e, "Remote snapshot unavailable");
            None
        }
    };
    let local = match cache.load() {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Local snapshot unreadable");
            None
        }
    };

    let mut candidates: Vec<(RestoreSource, OpsState)> = Vec::new();
    if let Some(state) = remote {
        candidates.push((RestoreSource::Remote(state.sequence), state));
    }
    if let Some(state) = local {
        candidates.push((RestoreSource::Local(state.sequence), state));
    }
    // Newest first; on a tie the remote copy wins (it was confirmed)
    candidates.sort_by(|a, b| b.1.sequence.cmp(&a.1.sequence));

    for (source, state) in candidates {
        match manager.restore(state) {
            Ok(()) => {
                tracing::info!(?source, "Operations state restored");
                return source;
            }
            Err(e) => {
                tracing::error!(?source, error = %e, "Snapshot refused, trying the next source");
            }
        }
    }

    tracing::info!("No snapshot found, starting with an empty state");
    RestoreSource::Empty
}
