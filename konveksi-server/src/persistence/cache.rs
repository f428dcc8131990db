//! redb-backed local snapshot cache
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `snapshot` | `"latest"` | JSON `OpsState` | Last locally written aggregate |
//! | `sync_meta` | `"local_sequence"` / `"remote_sequence"` | `u64` | Dirty tracking |
//!
//! The cache is written before every remote push, so a remote outage never
//! loses more than the debounce window.

use crate::ops::OpsState;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Latest aggregate snapshot, JSON-serialized
const SNAPSHOT_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("snapshot");

/// Sequence bookkeeping
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sync_meta");

const LATEST_KEY: &str = "latest";
const LOCAL_SEQUENCE_KEY: &str = "local_sequence";
const REMOTE_SEQUENCE_KEY: &str = "remote_sequence";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Local snapshot cache backed by redb
#[derive(Clone)]
pub struct SnapshotCache {
    db: Arc<Database>,
}

impl std::fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache").finish_non_exhaustive()
    }
}

impl SnapshotCache {
    /// Open or create the cache file at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::init(Database::create(path)?)
    }

    /// Open an in-memory cache (tests, or when no work dir is writable)
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?,
        )
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SNAPSHOT_TABLE)?;
            let _ = write_txn.open_table(META_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Replace the cached snapshot
    pub fn save(&self, state: &OpsState) -> StorageResult<()> {
        let bytes = serde_json::to_vec(state)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SNAPSHOT_TABLE)?;
            table.insert(LATEST_KEY, bytes.as_slice())?;
            let mut meta = write_txn.open_table(META_TABLE)?;
            meta.insert(LOCAL_SEQUENCE_KEY, state.sequence)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Cached snapshot, if any
    pub fn load(&self) -> StorageResult<Option<OpsState>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNAPSHOT_TABLE)?;
        match table.get(LATEST_KEY)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Record that the remote store holds everything up to `sequence`
    pub fn mark_synced(&self, sequence: u64) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut meta = write_txn.open_table(META_TABLE)?;
            let current = meta
                .get(REMOTE_SEQUENCE_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0);
            meta.insert(REMOTE_SEQUENCE_KEY, current.max(sequence))?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn local_sequence(&self) -> StorageResult<u64> {
        self.meta(LOCAL_SEQUENCE_KEY)
    }

    /// Last sequence confirmed by the remote store
    pub fn remote_sequence(&self) -> StorageResult<u64> {
        self.meta(REMOTE_SEQUENCE_KEY)
    }

    /// Local snapshot is ahead of the remote store
    pub fn is_dirty(&self) -> StorageResult<bool> {
        Ok(self.local_sequence()? > self.remote_sequence()?)
    }

    fn meta(&self, key: &str) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let meta = read_txn.open_table(META_TABLE)?;
        Ok(meta.get(key)?.map(|guard| guard.value()).unwrap_or(0))
    }
}
