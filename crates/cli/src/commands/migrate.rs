//! Database migration command.
//!
//! # Environment Variables
//!
//! - `MARIGOLD_DATABASE_URL` - `SQLite` connection string
//! - `MARIGOLD_DB_MAX_CONNECTIONS` - Pool size cap (optional, default: 10)

use thiserror::Error;

use marigold_commerce::config::{CommerceConfig, ConfigError};
use marigold_commerce::db;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the embedded migrations against the configured database.
///
/// # Errors
///
/// Returns `MigrateError` if configuration, connection, or a migration step
/// fails.
pub async fn run() -> Result<(), MigrateError> {
    dotenvy::dotenv().ok();

    let config = CommerceConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url, config.max_connections).await?;

    tracing::info!("Running migrations...");
    db::MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
