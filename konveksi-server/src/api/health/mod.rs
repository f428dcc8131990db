//! Health check
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /health | GET | status, version, sequence and sync state |
//!
//! ```json
//! {
//!   "status": "ok",
//!   "version": "0.1.0",
//!   "epoch": "5d0c...",
//!   "sequence": 42,
//!   "uptime_seconds": 3600,
//!   "restored_from": {"source": "local", "sequence": 40},
//!   "sync": {"gateway": "http", "cached_sequence": 42, "remote_sequence": 42}
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::time::SystemTime;

use crate::core::ServerState;
use crate::persistence::{RestoreSource, SyncStatus};

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// ok | degraded (last remote sync failed)
    pub status: &'static str,
    pub version: &'static str,
    pub epoch: String,
    pub sequence: u64,
    pub uptime_seconds: u64,
    pub restored_from: RestoreSource,
    pub sync: SyncStatus,
}

static START_TIME: std::sync::OnceLock<SystemTime> = std::sync::OnceLock::new();

/// Pin the start time; called once while building state
pub fn mark_started() {
    START_TIME.get_or_init(SystemTime::now);
}

fn uptime_seconds() -> u64 {
    let start = START_TIME.get_or_init(SystemTime::now);
    SystemTime::now()
        .duration_since(*start)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let sync = state.sync_status.read().clone();
    Json(HealthResponse {
        status: if sync.last_error.is_some() { "degraded" } else { "ok" },
        version: env!("CARGO_PKG_VERSION"),
        epoch: state.manager.epoch().to_string(),
        sequence: state.manager.current_sequence(),
        uptime_seconds: uptime_seconds(),
        restored_from: state.restored_from,
        sync,
    })
}
