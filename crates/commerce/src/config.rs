//! Commerce configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARIGOLD_DATABASE_URL` - `SQLite` connection string
//!   (e.g., `sqlite://marigold.db`)
//!
//! ## Optional
//! - `MARIGOLD_DB_MAX_CONNECTIONS` - Pool size cap (default: 10)

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Commerce application configuration.
#[derive(Debug, Clone)]
pub struct CommerceConfig {
    /// Database connection URL (may embed credentials for remote stores)
    pub database_url: SecretString,
    /// Pool size cap
    pub max_connections: u32,
}

impl CommerceConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if a required variable is unset
    /// and `ConfigError::InvalidEnvVar` if a value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("MARIGOLD_DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("MARIGOLD_DATABASE_URL".to_owned()))?;

        let max_connections = match std::env::var("MARIGOLD_DB_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse().map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "MARIGOLD_DB_MAX_CONNECTIONS".to_owned(),
                    format!("{e}"),
                )
            })?,
            Err(_) => 10,
        };

        Ok(Self {
            database_url: database_url.into(),
            max_connections,
        })
    }
}
