//! Database connection and configuration

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;

use roster_core::config::StorageConfig;

use crate::error::Result;
use crate::repos::{PullRequestsRepo, TeamsRepo, UsersRepo};

/// Where the SQLite file lives and how many connections to pool
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 5,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}

impl From<&StorageConfig> for DatabaseConfig {
    fn from(storage: &StorageConfig) -> Self {
        Self::new(storage.database_path()).with_max_connections(storage.max_connections)
    }
}

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database with the given configuration
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // WAL lets readers proceed while a write is in flight
        let options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", config.path.display()))?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .foreign_keys(true)
                .busy_timeout(Duration::from_secs(30))
                .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        tracing::debug!(path = %config.path.display(), "Database connected");

        Ok(Self { pool })
    }

    /// Connect and bring the schema up to date
    pub async fn open(config: DatabaseConfig) -> Result<Self> {
        let db = Self::connect(config).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the teams repository
    pub fn teams(&self) -> TeamsRepo {
        TeamsRepo::new(self.pool.clone())
    }

    /// Get the users repository
    pub fn users(&self) -> UsersRepo {
        UsersRepo::new(self.pool.clone())
    }

    /// Get the pull requests repository
    pub fn pull_requests(&self) -> PullRequestsRepo {
        PullRequestsRepo::new(self.pool.clone())
    }

    /// Close the database connection
    pub async fn close(self) {
        self.pool.close().await;
    }
}
