//! Persistence - local cache, remote gateway and background sync
//!
//! - **gateway**: `PersistenceGateway` contract (`{success, data?, error?}`)
//! - **http** / **memory**: remote and in-process implementations
//! - **cache**: redb snapshot cache with dirty tracking
//! - **worker**: debounced cache-then-remote sync
//! - **restore**: newest-snapshot selection at startup

pub mod cache;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod restore;
pub mod worker;

pub use cache::{SnapshotCache, StorageError, StorageResult};
pub use gateway::PersistenceGateway;
pub use http::HttpGateway;
pub use memory::MemoryGateway;
pub use restore::{RestoreSource, restore_latest};
pub use worker::{FlushReport, SharedSyncStatus, SyncSettings, SyncStatus, SyncWorker};
