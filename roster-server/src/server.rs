//! Backend wiring and the HTTP server lifecycle

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use roster_core::{Config, InMemoryStore, ReviewerPicker, Services, StorageBackend};
use roster_db::{Database, DatabaseConfig};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Services plus the database they run on, if any
pub struct Backend {
    pub services: Services,
    pub database: Option<Database>,
}

impl Backend {
    /// Open the configured store and wire the services to it
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let picker = ReviewerPicker::from_seed(config.assignment.seed);
        if config.assignment.seed.is_some() {
            tracing::info!(seed = ?config.assignment.seed, "Using seeded reviewer selection");
        }

        match config.storage.backend {
            StorageBackend::Memory => {
                tracing::info!("Using in-memory store");
                Ok(Self {
                    services: Services::new(Arc::new(InMemoryStore::new()), picker),
                    database: None,
                })
            }
            StorageBackend::Sqlite => {
                let db_config = DatabaseConfig::from(&config.storage);
                tracing::info!(path = %db_config.path.display(), "Using SQLite store");
                let db = Database::open(db_config).await?;
                let services = Services::from_stores(
                    Arc::new(db.teams()),
                    Arc::new(db.users()),
                    Arc::new(db.pull_requests()),
                    picker,
                );
                Ok(Self {
                    services,
                    database: Some(db),
                })
            }
        }
    }

    /// Release the database pool, if there is one
    pub async fn close(self) {
        if let Some(db) = self.database {
            db.close().await;
        }
    }
}

/// Serve `app` until `shutdown` fires, then give in-flight requests `grace` to finish
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
    grace: Duration,
) -> std::io::Result<()> {
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result,
        _ = shutdown.cancelled() => {
            tracing::info!(grace = ?grace, "Shutting down, draining in-flight requests");
            match tokio::time::timeout(grace, server).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!("Shutdown timeout elapsed, dropping remaining connections");
                    Ok(())
                }
            }
        }
    }
}

/// Resolve on Ctrl-C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
