//! Database migration command.
//!
//! Migration files live in `crates/dashboard/migrations/` and are embedded
//! at compile time.

use super::CommandError;

/// Run dashboard database migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Running dashboard migrations...");
    sqlx::migrate!("../dashboard/migrations").run(&pool).await?;

    tracing::info!("Dashboard migrations complete!");
    Ok(())
}
