//! Konveksi Server - garment operations core
//!
//! Single-writer service keeping stock, orders and HR scores consistent.
//!
//! - **Ledger** (`inventory`): append-only stock movements, stock derivable by replay
//! - **Orders** (`orders`): status graph gating when stock is committed
//! - **Scores** (`score`): deterministic per-person recompute from HR logs
//! - **Activity** (`activity`): capped trail of what changed, mirrored to the audit log
//! - **Persistence** (`persistence`): redb cache plus best-effort remote sync
//!
//! # Module structure
//!
//! ```text
//! konveksi-server/src/
//! ├── core/          # config, state, background tasks, server
//! ├── ops/           # command engine and manager
//! ├── inventory/     # ledger
//! ├── orders/        # order lifecycle rules
//! ├── score/         # score engine
//! ├── activity/      # activity log
//! ├── persistence/   # cache, gateways, sync worker, restore
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # errors, logging
//! ```

pub mod activity;
pub mod api;
pub mod core;
pub mod inventory;
pub mod ops;
pub mod orders;
pub mod persistence;
pub mod score;
pub mod utils;

pub use core::{Config, Server, ServerState};
pub use ops::{OpsManager, OpsState};
pub use persistence::{HttpGateway, MemoryGateway, PersistenceGateway, SnapshotCache};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Load `.env`, create the work dir and start logging
///
/// Returns the configuration so startup reads the environment once.
pub fn setup_environment() -> anyhow::Result<Config> {
    // A missing .env is normal outside development
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;
    init_logger_with_file(&config.log_level, config.log_json, Some(&log_dir))?;
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    __                          __              _
   / /______  ____ _   _____  / /__________ _(_)
  / //_/ __ \/ __ \ | / / _ \/ //_/ ___/ _ \/ /
 / ,< / /_/ / / / / |/ /  __/ ,< (__  )  __/ /
/_/|_|\____/_/ /_/|___/\___/_/|_/____/\___/_/
    "#
    );
}
