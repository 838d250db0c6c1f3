//! CLI command implementations.

pub mod flock;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors common to CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] roost_dashboard::db::RepositoryError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] roost_ledger::LedgerError),
}

/// Connect to the dashboard database using the same URL fallback as the
/// dashboard itself (`DASHBOARD_DATABASE_URL`, then `DATABASE_URL`).
pub(crate) async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DASHBOARD_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("DASHBOARD_DATABASE_URL"))?;

    let pool = roost_dashboard::db::create_pool(&SecretString::from(database_url)).await?;
    Ok(pool)
}
