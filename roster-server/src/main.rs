//! Roster CLI - run and administer the Review Roster service
//!
//! Teams, users and pull requests with automatic reviewer assignment.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roster_core::{CliOverrides, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Review Roster: reviewer assignment for pull requests
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.config/roster/config.toml)
    #[arg(long, global = true, env = "ROSTER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config and env)
    #[arg(long, global = true)]
    bind: Option<String>,

    /// SQLite database file (overrides config and env)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Keep everything in memory instead of SQLite
    #[arg(long, global = true)]
    memory: bool,

    /// Seed for reproducible reviewer selection
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server (default)
    #[command(visible_alias = "s")]
    Serve,

    /// Create or update the database schema
    Migrate,

    /// Show current configuration
    Config,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let overrides = CliOverrides {
        bind: cli.bind.clone(),
        database: cli.database.clone(),
        memory: cli.memory,
        seed: cli.seed,
    };
    let config = Config::load_with_overrides(cli.config.as_deref(), overrides)?;

    tracing::debug!(
        bind = %config.server.bind,
        backend = ?config.storage.backend,
        "Configuration loaded"
    );

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::execute(&config).await?,
        Commands::Migrate => commands::migrate::execute(&config).await?,
        Commands::Config => print_config(&config, cli.config.as_deref()),
        Commands::Version => println!("roster {}", env!("CARGO_PKG_VERSION")),
    }

    Ok(())
}

fn print_config(config: &Config, config_file: Option<&std::path::Path>) {
    println!("Roster Configuration");
    println!("====================");
    println!();
    println!("Server:");
    println!("  bind: {}", config.server.bind);
    println!("  shutdown_timeout: {:?}", config.server.shutdown_timeout);
    println!();
    println!("Storage:");
    println!("  backend: {:?}", config.storage.backend);
    println!("  path: {}", config.storage.database_path().display());
    println!("  max_connections: {}", config.storage.max_connections);
    println!();
    println!("Assignment:");
    match config.assignment.seed {
        Some(seed) => println!("  seed: {}", seed),
        None => println!("  seed: (random)"),
    }
    println!();

    let path = config_file
        .map(|p| p.to_path_buf())
        .or_else(Config::default_config_path);
    if let Some(path) = path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
