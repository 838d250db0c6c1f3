//! Database operations for flocks.
//!
//! The ledger only ever reads flocks (through the `FlockRegistry` trait);
//! creation and listing exist for the CLI and the flock picker.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;

use roost_core::FlockId;
use roost_ledger::error::StoreError;
use roost_ledger::model::Flock;
use roost_ledger::store::FlockRegistry;

use super::RepositoryError;

/// Internal row type for flock queries.
#[derive(Debug, sqlx::FromRow)]
struct FlockRow {
    id: i32,
    name: String,
    start_date: NaiveDate,
    initial_head_count: i32,
}

impl From<FlockRow> for Flock {
    fn from(row: FlockRow) -> Self {
        Self {
            id: FlockId::new(row.id),
            name: row.name,
            start_date: row.start_date,
            initial_head_count: row.initial_head_count,
        }
    }
}

/// Input for creating a new flock.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFlockInput {
    /// Display name.
    pub name: String,
    /// Date the flock was placed.
    pub start_date: NaiveDate,
    /// Head-count the flock was placed with.
    pub initial_head_count: i32,
}

/// Repository for flock database operations.
#[derive(Clone)]
pub struct FlockRepository {
    pool: PgPool,
}

impl FlockRepository {
    /// Create a new flock repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new flock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &CreateFlockInput) -> Result<Flock, RepositoryError> {
        let row = sqlx::query_as::<_, FlockRow>(
            r"
            INSERT INTO flock (name, start_date, initial_head_count)
            VALUES ($1, $2, $3)
            RETURNING id, name, start_date, initial_head_count
            ",
        )
        .bind(&input.name)
        .bind(input.start_date)
        .bind(input.initial_head_count)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get a flock by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: FlockId) -> Result<Option<Flock>, RepositoryError> {
        let row = sqlx::query_as::<_, FlockRow>(
            r"
            SELECT id, name, start_date, initial_head_count
            FROM flock
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List all flocks, newest placement first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Flock>, RepositoryError> {
        let rows = sqlx::query_as::<_, FlockRow>(
            r"
            SELECT id, name, start_date, initial_head_count
            FROM flock
            ORDER BY start_date DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl FlockRegistry for FlockRepository {
    async fn get_flock(&self, flock_id: FlockId) -> Result<Option<Flock>, StoreError> {
        self.get(flock_id).await.map_err(StoreError::backend)
    }
}
