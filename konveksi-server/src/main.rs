use konveksi_server::{Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, work dir, logging)
    let config = setup_environment()?;

    print_banner();
    tracing::info!("Konveksi server starting...");

    // 2. Restore state from the newest snapshot
    let state = ServerState::initialize(&config).await?;

    // 3. Serve (Server::run starts the background tasks)
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
