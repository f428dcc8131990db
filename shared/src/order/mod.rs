//! Order types
//!
//! - Snapshot: current order state with its append-only status history
//! - Types: items, payment proofs and the sale created at stock commit

pub mod snapshot;
pub mod types;

// Re-exports
pub use snapshot::{HistoryEntry, Order, OrderStatus};
pub use types::*;
