use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use crate::core::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::ops::OpsManager;
use crate::persistence::{
    HttpGateway, MemoryGateway, PersistenceGateway, RestoreSource, SharedSyncStatus,
    SnapshotCache, SyncWorker, restore_latest,
};

/// How often the ledger chain is re-verified
const LEDGER_VERIFY_INTERVAL: Duration = Duration::from_secs(3600);

/// Server state - shared handles to every service
///
/// Cloning is cheap; every field is reference counted.
///
/// | Field | Meaning |
/// |-------|---------|
/// | config | immutable configuration |
/// | manager | single writer over the operations state |
/// | cache | local redb snapshot cache |
/// | gateway | remote store (or the in-process one) |
/// | sync_status | last sync result, shown by `/health` |
/// | restored_from | which snapshot startup restored |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub manager: Arc<OpsManager>,
    pub cache: SnapshotCache,
    pub gateway: Arc<dyn PersistenceGateway>,
    pub sync_status: SharedSyncStatus,
    pub restored_from: RestoreSource,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("manager", &self.manager)
            .field("cache", &self.cache)
            .field("gateway", &self.gateway.name())
            .field("restored_from", &self.restored_from)
            .finish()
    }
}

impl ServerState {
    /// Initialize from configuration
    ///
    /// 1. Work dir (`work_dir/snapshot.redb`)
    /// 2. Gateway (`HttpGateway` when `REMOTE_STORE_URL` is set)
    /// 3. Manager, restored from the newest snapshot
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        let work_dir = PathBuf::from(&config.work_dir);
        std::fs::create_dir_all(&work_dir)
            .with_context(|| format!("Failed to create work dir {}", work_dir.display()))?;

        let cache_path = config.cache_path();
        let cache = SnapshotCache::open(&cache_path)
            .with_context(|| format!("Failed to open snapshot cache {}", cache_path.display()))?;

        let gateway: Arc<dyn PersistenceGateway> = match &config.remote_store_url {
            Some(url) => Arc::new(
                HttpGateway::new(url.clone(), config.remote_timeout())
                    .context("Failed to build remote store client")?,
            ),
            None => {
                tracing::warn!("REMOTE_STORE_URL not set, using the in-process store");
                Arc::new(MemoryGateway::new())
            }
        };

        Ok(Self::with_services(config.clone(), cache, gateway).await)
    }

    /// Build around an existing cache and gateway, restoring the newest snapshot
    pub async fn with_services(
        config: Config,
        cache: SnapshotCache,
        gateway: Arc<dyn PersistenceGateway>,
    ) -> Self {
        let manager = Arc::new(OpsManager::new(
            config.score_rules(),
            config.activity_log_capacity,
        ));
        let restored_from = restore_latest(&manager, &cache, gateway.as_ref()).await;
        let sync_status = SharedSyncStatus::default();
        {
            let mut status = sync_status.write();
            status.gateway = gateway.name().to_string();
            status.cached_sequence = cache.local_sequence().unwrap_or(0);
            status.remote_sequence = cache.remote_sequence().unwrap_or(0);
        }

        Self {
            config,
            manager,
            cache,
            gateway,
            sync_status,
            restored_from,
        }
    }

    /// Register the sync worker and the periodic ledger check
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let worker = SyncWorker::new(
            self.manager.clone(),
            self.cache.clone(),
            self.gateway.clone(),
            self.config.sync_settings(),
            self.sync_status.clone(),
            tasks.shutdown_token(),
        );
        tasks.spawn("sync_worker", TaskKind::Worker, worker.run());

        tasks.spawn(
            "ledger_verifier",
            TaskKind::Periodic,
            verify_ledger_periodically(self.manager.clone(), tasks.shutdown_token()),
        );
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    pub fn print_banner_content(&self) {
        tracing::info!("════════════════════════════════════════════════════════");
        tracing::info!("  KONVEKSI OPERATIONS SERVER");
        tracing::info!("════════════════════════════════════════════════════════");
        tracing::info!("  Environment : {}", self.config.environment);
        tracing::info!("  Work dir    : {}", self.config.work_dir);
        tracing::info!("  HTTP        : http://localhost:{}", self.config.http_port);
        tracing::info!("  Store       : {}", self.gateway.name());
        tracing::info!("  Restored    : {:?}", self.restored_from);
        tracing::info!("  Sequence    : {}", self.manager.current_sequence());
    }
}

async fn verify_ledger_periodically(manager: Arc<OpsManager>, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(LEDGER_VERIFY_INTERVAL);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                let report = manager.verify_ledger();
                if report.is_intact() {
                    tracing::debug!(entries = report.entries_checked, "Ledger chain intact");
                } else {
                    tracing::error!(
                        breaks = report.breaks.len(),
                        mismatches = report.mismatches.len(),
                        "Ledger chain verification failed"
                    );
                }
            }
        }
    }
}
