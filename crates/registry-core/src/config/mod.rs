//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod alerts;
pub mod app;
pub mod database;
pub mod logging;
pub mod payment;
pub mod realtime;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use self::alerts::AlertsConfig;
pub use self::app::{CorsConfig, ServerConfig};
pub use self::database::{DatabaseConfig, DatabaseDriver, SeedItem};
pub use self::logging::LoggingConfig;
pub use self::payment::{PaymentConfig, PaymentEnvironment, PaymentProvider};
pub use self::realtime::RealtimeConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides (`REGISTRY__PAYMENT__PRIVATE_KEY`).
pub const ENV_PREFIX: &str = "REGISTRY";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP/WebSocket server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Payment gateway settings.
    #[serde(default)]
    pub payment: PaymentConfig,
    /// Real-time WebSocket settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Operator alert settings.
    #[serde(default)]
    pub alerts: AlertsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the `config/` directory.
    ///
    /// Merges `config/default.toml`, the environment overlay
    /// `config/{env}.toml`, and environment variables prefixed with
    /// `REGISTRY__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration from an explicit directory.
    pub fn load_from(dir: impl AsRef<Path>, env: &str) -> Result<Self, AppError> {
        let dir = dir.as_ref();
        let default_path = dir.join("default");
        let env_path = dir.join(env);

        let config = config::Config::builder()
            .add_source(config::File::from(default_path).required(false))
            .add_source(config::File::from(env_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
