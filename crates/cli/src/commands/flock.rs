//! Flock management commands.

use chrono::NaiveDate;

use roost_dashboard::db::FlockRepository;
use roost_dashboard::db::flocks::CreateFlockInput;

use super::CommandError;

/// Create a new flock.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or the insert
/// fails.
pub async fn create(
    name: &str,
    start_date: NaiveDate,
    initial_count: i32,
) -> Result<(), CommandError> {
    let pool = super::connect().await?;
    let repository = FlockRepository::new(pool);

    let flock = repository
        .create(&CreateFlockInput {
            name: name.to_string(),
            start_date,
            initial_head_count: initial_count,
        })
        .await?;

    tracing::info!(
        flock_id = %flock.id,
        name = %flock.name,
        start_date = %flock.start_date,
        initial_head_count = flock.initial_head_count,
        "Flock created"
    );
    Ok(())
}
