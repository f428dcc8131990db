use thiserror::Error;

/// Server lifecycle errors
///
/// Request handlers use `AppError`; this covers startup and serving.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server failed: {0}")]
    Serve(#[from] std::io::Error),

    #[error("Startup failed: {0}")]
    Startup(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
