//! Server Implementation
//!
//! HTTP server startup and graceful shutdown

use crate::core::tasks::BackgroundTasks;
use crate::core::{Config, Result, ServerError, ServerState};
use std::net::SocketAddr;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// Serve until Ctrl-C, then stop background tasks
    ///
    /// The sync worker flushes pending changes while stopping.
    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let mut tasks = BackgroundTasks::new();
        state.start_background_tasks(&mut tasks);
        tasks.log_summary();

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        crate::api::health::mark_started();
        state.print_banner_content();
        tracing::info!("Konveksi server listening on {}", addr);

        let app = crate::api::build_app(state);
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await;

        // Stop the workers even when serving failed so pending changes are flushed
        tasks.shutdown(self.config.shutdown_timeout()).await;
        served?;
        Ok(())
    }
}
