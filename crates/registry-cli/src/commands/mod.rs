//! CLI command definitions and dispatch.

pub mod config;
pub mod migrate;
pub mod registry;

use clap::{Parser, Subcommand};

use registry_core::config::{AppConfig, DatabaseDriver};
use registry_core::error::AppError;
use registry_database::Stores;

use crate::output::OutputFormat;

/// Gift registry administration
#[derive(Debug, Parser)]
#[command(name = "registry", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and the environment overlays
    #[arg(short, long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to apply
    #[arg(short, long, env = "REGISTRY_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Registry items
    Registry(registry::RegistryArgs),
    /// Effective configuration
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load_from(&self.config_dir, &self.env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config, self.format).await,
            Commands::Registry(args) => registry::execute(args, &config, self.format).await,
            Commands::Config(args) => config::execute(args, &config, self.format),
        }
    }
}

/// Helper: connect the configured PostgreSQL stores
pub async fn open_stores(config: &AppConfig) -> Result<Stores, AppError> {
    require_postgres(config, "Registry commands")?;
    Stores::from_config(&config.database).await
}

/// Reject the memory driver; its data lives only inside one process.
pub fn require_postgres(config: &AppConfig, what: &str) -> Result<(), AppError> {
    if config.database.driver == DatabaseDriver::Memory {
        return Err(AppError::configuration(format!(
            "{what} need database.driver = \"postgres\"; the memory store is private to the server process"
        )));
    }
    Ok(())
}
