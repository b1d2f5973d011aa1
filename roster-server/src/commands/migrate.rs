//! Migrate command - bring the SQLite schema up to date

use roster_core::{Config, StorageBackend};
use roster_db::{Database, DatabaseConfig};

/// Execute the migrate command
pub async fn execute(config: &Config) -> anyhow::Result<()> {
    if config.storage.backend == StorageBackend::Memory {
        println!("In-memory storage has no schema to migrate.");
        return Ok(());
    }

    let path = config.storage.database_path();
    let db = Database::connect(DatabaseConfig::from(&config.storage))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open database {}: {}", path.display(), e))?;
    db.migrate().await?;
    db.close().await;

    println!("Database migrated: {}", path.display());
    Ok(())
}
