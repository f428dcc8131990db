//! Persistence gateway contract
//!
//! Every call answers the `{success, data?, error?}` envelope. Transport
//! failures are folded into the envelope too, so callers handle one shape.

use crate::ops::OpsState;
use async_trait::async_trait;
use serde_json::Value;
use shared::gateway::GatewayResponse;

/// Remote record store plus aggregate snapshot slot
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Insert a record into `table`
    async fn save(&self, table: &str, record: Value) -> GatewayResponse<Value>;

    /// All records of `table`
    async fn get(&self, table: &str) -> GatewayResponse<Vec<Value>>;

    /// Replace record `id` of `table`
    async fn update(&self, table: &str, id: &str, record: Value) -> GatewayResponse<Value>;

    async fn delete(&self, table: &str, id: &str) -> GatewayResponse<()>;

    /// Idempotent upsert of the whole aggregate
    async fn sync_snapshot(&self, state: &OpsState) -> GatewayResponse<()>;

    /// Last aggregate stored remotely; `data` is absent when none exists
    async fn get_snapshot(&self) -> GatewayResponse<OpsState>;

    /// Short label for logs and health output
    fn name(&self) -> &'static str;
}

/// Record id carried in the `id` field, when it is a string or number
pub fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
