//! Configuration management for Review Roster
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (ROSTER_*)
//! 3. Config file (~/.config/roster/config.toml, or --config)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: String,

    /// How long in-flight requests may run after a shutdown signal
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

/// Which store backs the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(Error::Config(format!("unknown storage backend: {}", other))),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// SQLite database file; defaults to ~/.cache/roster/roster.db
    pub path: Option<PathBuf>,

    /// Maximum number of pooled SQLite connections
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            path: None,
            max_connections: 5,
        }
    }
}

impl StorageConfig {
    /// Configured database path, or the default cache location
    pub fn database_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("roster")
                .join("roster.db")
        })
    }
}

/// Reviewer assignment configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Fixed seed for reproducible reviewer selection
    pub seed: Option<u64>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub assignment: AssignmentConfig,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind: Option<String>,
    pub database: Option<PathBuf>,
    pub memory: bool,
    pub seed: Option<u64>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/roster/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("roster").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - ROSTER_BIND: listen address
    /// - ROSTER_STORAGE: `sqlite` or `memory`
    /// - ROSTER_DATABASE: SQLite file path
    /// - ROSTER_SEED: reviewer selection seed
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(bind) = var("ROSTER_BIND") {
            self.server.bind = bind;
        }

        if let Some(backend) = var("ROSTER_STORAGE") {
            self.storage.backend = backend.parse()?;
        }

        if let Some(path) = var("ROSTER_DATABASE") {
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Some(seed) = var("ROSTER_SEED") {
            let seed = seed
                .parse()
                .map_err(|e| Error::Config(format!("ROSTER_SEED: {}", e)))?;
            self.assignment.seed = Some(seed);
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, cli: CliOverrides) -> Self {
        if let Some(bind) = cli.bind {
            self.server.bind = bind;
        }

        if let Some(path) = cli.database {
            self.storage.path = Some(path);
            self.storage.backend = StorageBackend::Sqlite;
        }

        if cli.memory {
            self.storage.backend = StorageBackend::Memory;
        }

        if let Some(seed) = cli.seed {
            self.assignment.seed = Some(seed);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(config_file: Option<&Path>, cli: CliOverrides) -> Result<Self> {
        let base = match config_file {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };
        Ok(base.with_env_overrides()?.with_cli_overrides(cli))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.server.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.max_connections, 5);
        assert!(config.assignment.seed.is_none());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[server]
bind = "127.0.0.1:9000"
shutdown_timeout = "30s"

[storage]
backend = "memory"

[assignment]
seed = 7
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.server.shutdown_timeout, Duration::from_secs(30));
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.assignment.seed, Some(7));
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[storage]
path = "/var/lib/roster/roster.db"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(
            config.storage.database_path(),
            PathBuf::from("/var/lib/roster/roster.db")
        );
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("ROSTER_BIND", "127.0.0.1:1234"),
            ("ROSTER_STORAGE", "MEMORY"),
            ("ROSTER_SEED", "99"),
        ]
        .into_iter()
        .collect();

        let config = Config::default()
            .with_overrides_from(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:1234");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.assignment.seed, Some(99));
    }

    #[test]
    fn test_bad_env_seed() {
        let err = Config::default()
            .with_overrides_from(|k| (k == "ROSTER_SEED").then(|| "abc".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = Config::default().with_cli_overrides(CliOverrides {
            bind: Some("127.0.0.1:3000".to_string()),
            database: Some(PathBuf::from("/tmp/r.db")),
            memory: false,
            seed: Some(5),
        });
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.database_path(), PathBuf::from("/tmp/r.db"));
        assert_eq!(config.assignment.seed, Some(5));

        let config = config.with_cli_overrides(CliOverrides {
            memory: true,
            ..Default::default()
        });
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nbind = \"127.0.0.1:7070\"\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:7070");

        std::fs::write(&path, "[server\n").unwrap();
        assert!(matches!(
            Config::load_from_file(&path).unwrap_err(),
            Error::Config(_)
        ));
    }
}
