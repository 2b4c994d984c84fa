//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! `config/default.toml`, an environment overlay (`config/<env>.toml`), and
//! `CAMPUS__SECTION__KEY` environment variables. Every field has a default,
//! so an empty source set yields a runnable development configuration.

pub mod app;
pub mod database;
pub mod logging;
pub mod notification;
pub mod storage;
pub mod summarizer;
pub mod upload;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::notification::NotificationConfig;
pub use self::storage::{LocalStorageConfig, StorageConfig};
pub use self::summarizer::SummarizerConfig;
pub use self::upload::{UploadConfig, UploadPolicy};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database backend settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Blob storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Attachment upload policies and pipeline settings.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Notification fan-out settings.
    #[serde(default)]
    pub notification: NotificationConfig,
    /// Document summarizer settings.
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `./config` for the given environment name.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from(Path::new("config"), env)
    }

    /// Load configuration from a directory.
    ///
    /// Merges `<dir>/default`, `<dir>/<env>` and environment variables
    /// prefixed with `CAMPUS__`, later sources winning.
    pub fn load_from(dir: &Path, env: &str) -> Result<Self, AppError> {
        let default_path = dir.join("default");
        let env_path = dir.join(env);

        let config = config::Config::builder()
            .add_source(config::File::from(default_path).required(false))
            .add_source(config::File::from(env_path).required(false))
            .add_source(
                config::Environment::with_prefix("CAMPUS")
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
