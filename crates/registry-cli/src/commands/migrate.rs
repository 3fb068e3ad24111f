//! Database migration management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use registry_core::config::AppConfig;
use registry_core::error::AppError;
use registry_database::DatabasePool;
use registry_database::migration::{self, MigrationStatus};

use crate::output::{self, OutputFormat};

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Show which embedded migrations have been applied
    Status,
}

#[derive(Debug, Serialize, Tabled)]
struct MigrationRow {
    #[tabled(rename = "Version")]
    version: i64,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Applied")]
    applied: bool,
}

impl From<MigrationStatus> for MigrationRow {
    fn from(m: MigrationStatus) -> Self {
        Self {
            version: m.version,
            description: m.description,
            applied: m.applied,
        }
    }
}

/// Execute migration commands
pub async fn execute(
    args: &MigrateArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    super::require_postgres(config, "Migrations")?;

    let pool = DatabasePool::connect(&config.database).await?;
    let result = run(args, &pool, format).await;
    pool.close().await;
    result
}

async fn run(args: &MigrateArgs, pool: &DatabasePool, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            migration::run_migrations(pool.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Status => {
            let rows: Vec<MigrationRow> = migration::migration_status(pool.pool())
                .await?
                .into_iter()
                .map(MigrationRow::from)
                .collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}
