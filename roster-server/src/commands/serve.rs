//! Serve command - run the HTTP API until a shutdown signal

use roster_core::Config;
use roster_server::{router, serve, shutdown_signal, Backend};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Execute the serve command
pub async fn execute(config: &Config) -> anyhow::Result<()> {
    let backend = Backend::open(config).await?;
    let app = router(backend.services.clone());

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", config.server.bind, e))?;
    tracing::info!(addr = %listener.local_addr()?, "Server listening");

    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    serve(listener, app, token, config.server.shutdown_timeout).await?;
    backend.close().await;

    tracing::info!("Server stopped");
    Ok(())
}
