//! In-process gateway
//!
//! Used when no remote store is configured and in tests. `set_offline`
//! makes every call fail the way an unreachable remote would.

use super::gateway::{PersistenceGateway, record_id};
use crate::ops::OpsState;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use shared::gateway::GatewayResponse;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

const OFFLINE_MESSAGE: &str = "remote store unavailable";

#[derive(Debug, Default)]
struct MemoryStore {
    tables: BTreeMap<String, BTreeMap<String, Value>>,
    snapshot: Option<OpsState>,
}

#[derive(Debug, Default)]
pub struct MemoryGateway {
    store: Mutex<MemoryStore>,
    offline: AtomicBool,
    snapshot_writes: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway that already holds a snapshot
    pub fn with_snapshot(state: OpsState) -> Self {
        let gateway = Self::new();
        gateway.store.lock().snapshot = Some(state);
        gateway
    }

    /// Simulate a remote outage
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Successful `sync_snapshot` calls so far
    pub fn snapshot_writes(&self) -> usize {
        self.snapshot_writes.load(Ordering::SeqCst)
    }

    /// Sequence of the stored snapshot
    pub fn stored_sequence(&self) -> Option<u64> {
        self.store.lock().snapshot.as_ref().map(|s| s.sequence)
    }

    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn save(&self, table: &str, mut record: Value) -> GatewayResponse<Value> {
        if self.is_offline() {
            return GatewayResponse::error(OFFLINE_MESSAGE);
        }
        let id = match record_id(&record) {
            Some(id) => id,
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                if let Value::Object(map) = &mut record {
                    map.insert("id".to_string(), Value::String(id.clone()));
                }
                id
            }
        };
        let mut store = self.store.lock();
        let rows = store.tables.entry(table.to_string()).or_default();
        if rows.contains_key(&id) {
            return GatewayResponse::error(format!("{} {} already exists", table, id));
        }
        rows.insert(id, record.clone());
        GatewayResponse::success(record)
    }

    async fn get(&self, table: &str) -> GatewayResponse<Vec<Value>> {
        if self.is_offline() {
            return GatewayResponse::error(OFFLINE_MESSAGE);
        }
        let store = self.store.lock();
        let rows = store
            .tables
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default();
        GatewayResponse::success(rows)
    }

    async fn update(&self, table: &str, id: &str, record: Value) -> GatewayResponse<Value> {
        if self.is_offline() {
            return GatewayResponse::error(OFFLINE_MESSAGE);
        }
        let mut store = self.store.lock();
        match store.tables.get_mut(table).and_then(|rows| rows.get_mut(id)) {
            Some(slot) => {
                *slot = record.clone();
                GatewayResponse::success(record)
            }
            None => GatewayResponse::error(format!("{} {} not found", table, id)),
        }
    }

    async fn delete(&self, table: &str, id: &str) -> GatewayResponse<()> {
        if self.is_offline() {
            return GatewayResponse::error(OFFLINE_MESSAGE);
        }
        let mut store = self.store.lock();
        match store.tables.get_mut(table).and_then(|rows| rows.remove(id)) {
            Some(_) => GatewayResponse::empty(),
            None => GatewayResponse::error(format!("{} {} not found", table, id)),
        }
    }

    async fn sync_snapshot(&self, state: &OpsState) -> GatewayResponse<()> {
        if self.is_offline() {
            return GatewayResponse::error(OFFLINE_MESSAGE);
        }
        let mut store = self.store.lock();
        // Never replace a newer snapshot with an older one
        let newer = store
            .snapshot
            .as_ref()
            .is_none_or(|stored| stored.sequence <= state.sequence);
        if newer {
            store.snapshot = Some(state.clone());
        }
        self.snapshot_writes.fetch_add(1, Ordering::SeqCst);
        GatewayResponse::empty()
    }

    async fn get_snapshot(&self) -> GatewayResponse<OpsState> {
        if self.is_offline() {
            return GatewayResponse::error(OFFLINE_MESSAGE);
        }
        match &self.store.lock().snapshot {
            Some(state) => GatewayResponse::success(state.clone()),
            None => GatewayResponse::empty(),
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
