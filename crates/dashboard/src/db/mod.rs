//! Database operations for the dashboard `PostgreSQL`.
//!
//! ## Tables
//!
//! - `flock` - Flock reference data (start date, initial head-count)
//! - `production_record` - Unified daily ledger rows, one per (flock, date)
//! - `egg_entry` - Narrow egg-collection projection (adds broken-egg count)
//! - `feed_entry` - Narrow feed-consumption projection (adds feed-type label)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/dashboard/migrations/` and run via:
//! ```bash
//! cargo run -p roost-cli -- migrate
//! ```

pub mod flocks;
pub mod production;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use flocks::FlockRepository;
pub use production::ProductionRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate (flock, date) key).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
