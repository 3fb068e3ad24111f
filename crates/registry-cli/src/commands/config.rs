//! Configuration inspection commands.

use clap::{Args, Subcommand};

use registry_core::config::AppConfig;
use registry_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for the config command
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the merged configuration (secrets omitted)
    Show,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => match format {
            OutputFormat::Json => output::print_json(config),
            OutputFormat::Table => {
                output::print_kv("bind", &config.server.bind_address());
                output::print_kv("database", &format!("{:?}", config.database.driver));
                output::print_kv("payment", &format!("{:?}", config.payment.provider));
                output::print_kv("environment", &format!("{:?}", config.payment.environment));
                output::print_kv(
                    "alerts",
                    config.alerts.operator_email.as_deref().unwrap_or("disabled"),
                );
                output::print_kv("log level", &config.logging.level);
            }
        },
    }
    Ok(())
}
