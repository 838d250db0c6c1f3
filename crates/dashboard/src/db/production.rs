//! Database operations for the production ledger and its projections.
//!
//! One repository implements all three storage traits: the unified
//! `production_record` table plus the `egg_entry` / `feed_entry`
//! projections, all keyed on (flock, date). The cascade commit path runs
//! inside a single transaction so an edited row and its re-chained
//! successors land together or not at all.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use roost_core::FlockId;
use roost_ledger::error::StoreError;
use roost_ledger::model::{
    EggCounts, EggProductionEntry, FeedUsageEntry, FlockAge, ProductionRecord,
};
use roost_ledger::store::{EggEntryStore, FeedEntryStore, LedgerStore};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for production record queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductionRecordRow {
    flock_id: i32,
    record_date: NaiveDate,
    age_days: i32,
    age_weeks: i32,
    head_count_start: i32,
    mortality: i32,
    head_count_remaining: i32,
    feed_kg: Decimal,
    eggs_morning: i32,
    eggs_midday: i32,
    eggs_evening: i32,
    medication: Option<String>,
    notes: Option<String>,
}

impl From<ProductionRecordRow> for ProductionRecord {
    fn from(row: ProductionRecordRow) -> Self {
        Self {
            flock_id: FlockId::new(row.flock_id),
            date: row.record_date,
            age: FlockAge::new(row.age_days, row.age_weeks),
            head_count_start: row.head_count_start,
            mortality: row.mortality,
            head_count_remaining: row.head_count_remaining,
            feed_kg: row.feed_kg,
            eggs: EggCounts::new(row.eggs_morning, row.eggs_midday, row.eggs_evening),
            medication: row.medication,
            notes: row.notes,
        }
    }
}

/// Internal row type for egg entry queries.
#[derive(Debug, sqlx::FromRow)]
struct EggEntryRow {
    flock_id: i32,
    entry_date: NaiveDate,
    eggs_morning: i32,
    eggs_midday: i32,
    eggs_evening: i32,
    broken: i32,
    notes: Option<String>,
}

impl From<EggEntryRow> for EggProductionEntry {
    fn from(row: EggEntryRow) -> Self {
        Self {
            flock_id: FlockId::new(row.flock_id),
            date: row.entry_date,
            eggs: EggCounts::new(row.eggs_morning, row.eggs_midday, row.eggs_evening),
            broken: row.broken,
            notes: row.notes,
        }
    }
}

/// Internal row type for feed entry queries.
#[derive(Debug, sqlx::FromRow)]
struct FeedEntryRow {
    flock_id: i32,
    entry_date: NaiveDate,
    feed_type: String,
    quantity_kg: Decimal,
}

impl From<FeedEntryRow> for FeedUsageEntry {
    fn from(row: FeedEntryRow) -> Self {
        Self {
            flock_id: FlockId::new(row.flock_id),
            date: row.entry_date,
            feed_type: row.feed_type,
            quantity_kg: row.quantity_kg,
        }
    }
}

const RECORD_COLUMNS: &str = r"
    flock_id, record_date, age_days, age_weeks, head_count_start, mortality,
    head_count_remaining, feed_kg, eggs_morning, eggs_midday, eggs_evening,
    medication, notes
";

const UPSERT_RECORD_SQL: &str = r"
    INSERT INTO production_record (
        flock_id, record_date, age_days, age_weeks, head_count_start,
        mortality, head_count_remaining, feed_kg, eggs_morning, eggs_midday,
        eggs_evening, egg_total, medication, notes
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
    ON CONFLICT (flock_id, record_date) DO UPDATE SET
        age_days = EXCLUDED.age_days,
        age_weeks = EXCLUDED.age_weeks,
        head_count_start = EXCLUDED.head_count_start,
        mortality = EXCLUDED.mortality,
        head_count_remaining = EXCLUDED.head_count_remaining,
        feed_kg = EXCLUDED.feed_kg,
        eggs_morning = EXCLUDED.eggs_morning,
        eggs_midday = EXCLUDED.eggs_midday,
        eggs_evening = EXCLUDED.eggs_evening,
        egg_total = EXCLUDED.egg_total,
        medication = EXCLUDED.medication,
        notes = EXCLUDED.notes,
        updated_at = now()
";

// =============================================================================
// Repository
// =============================================================================

/// Repository for production ledger database operations.
#[derive(Clone)]
pub struct ProductionRepository {
    pool: PgPool,
}

impl ProductionRepository {
    /// Create a new production repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert_record_in(
        tx: &mut Transaction<'_, Postgres>,
        record: &ProductionRecord,
    ) -> Result<(), StoreError> {
        sqlx::query(UPSERT_RECORD_SQL)
            .bind(record.flock_id.as_i32())
            .bind(record.date)
            .bind(record.age.days)
            .bind(record.age.weeks)
            .bind(record.head_count_start)
            .bind(record.mortality)
            .bind(record.head_count_remaining)
            .bind(record.feed_kg)
            .bind(record.eggs.morning)
            .bind(record.eggs.midday)
            .bind(record.eggs.evening)
            .bind(record.egg_total())
            .bind(record.medication.as_deref())
            .bind(record.notes.as_deref())
            .execute(&mut **tx)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for ProductionRepository {
    async fn upsert(&self, record: &ProductionRecord) -> Result<(), StoreError> {
        self.commit(record.flock_id, std::slice::from_ref(record), None)
            .await
    }

    async fn get(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<ProductionRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM production_record WHERE flock_id = $1 AND record_date = $2"
        );
        let row = sqlx::query_as::<_, ProductionRecordRow>(&sql)
            .bind(flock_id.as_i32())
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(row.map(Into::into))
    }

    async fn nearest_before(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<ProductionRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM production_record \
             WHERE flock_id = $1 AND record_date < $2 \
             ORDER BY record_date DESC LIMIT 1"
        );
        let row = sqlx::query_as::<_, ProductionRecordRow>(&sql)
            .bind(flock_id.as_i32())
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(row.map(Into::into))
    }

    async fn range_from(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Vec<ProductionRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM production_record \
             WHERE flock_id = $1 AND record_date >= $2 \
             ORDER BY record_date ASC"
        );
        let rows = sqlx::query_as::<_, ProductionRecordRow>(&sql)
            .bind(flock_id.as_i32())
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn range_between(
        &self,
        flock_id: FlockId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ProductionRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM production_record \
             WHERE flock_id = $1 AND record_date BETWEEN $2 AND $3 \
             ORDER BY record_date ASC"
        );
        let rows = sqlx::query_as::<_, ProductionRecordRow>(&sql)
            .bind(flock_id.as_i32())
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, flock_id: FlockId, date: NaiveDate) -> Result<bool, StoreError> {
        let result =
            sqlx::query("DELETE FROM production_record WHERE flock_id = $1 AND record_date = $2")
                .bind(flock_id.as_i32())
                .bind(date)
                .execute(&self.pool)
                .await
                .map_err(StoreError::backend)?;

        Ok(result.rows_affected() > 0)
    }

    async fn commit(
        &self,
        flock_id: FlockId,
        upserts: &[ProductionRecord],
        delete: Option<NaiveDate>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        if let Some(date) = delete {
            sqlx::query("DELETE FROM production_record WHERE flock_id = $1 AND record_date = $2")
                .bind(flock_id.as_i32())
                .bind(date)
                .execute(&mut *tx)
                .await
                .map_err(StoreError::backend)?;
        }
        for record in upserts {
            Self::upsert_record_in(&mut tx, record).await?;
        }

        tx.commit().await.map_err(StoreError::backend)?;
        Ok(())
    }
}

#[async_trait]
impl EggEntryStore for ProductionRepository {
    async fn upsert(&self, entry: &EggProductionEntry) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO egg_entry (
                flock_id, entry_date, eggs_morning, eggs_midday, eggs_evening,
                broken, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (flock_id, entry_date) DO UPDATE SET
                eggs_morning = EXCLUDED.eggs_morning,
                eggs_midday = EXCLUDED.eggs_midday,
                eggs_evening = EXCLUDED.eggs_evening,
                broken = EXCLUDED.broken,
                notes = EXCLUDED.notes,
                updated_at = now()
            ",
        )
        .bind(entry.flock_id.as_i32())
        .bind(entry.date)
        .bind(entry.eggs.morning)
        .bind(entry.eggs.midday)
        .bind(entry.eggs.evening)
        .bind(entry.broken)
        .bind(entry.notes.as_deref())
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn get(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<EggProductionEntry>, StoreError> {
        let row = sqlx::query_as::<_, EggEntryRow>(
            r"
            SELECT flock_id, entry_date, eggs_morning, eggs_midday,
                   eggs_evening, broken, notes
            FROM egg_entry
            WHERE flock_id = $1 AND entry_date = $2
            ",
        )
        .bind(flock_id.as_i32())
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, flock_id: FlockId, date: NaiveDate) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM egg_entry WHERE flock_id = $1 AND entry_date = $2")
            .bind(flock_id.as_i32())
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl FeedEntryStore for ProductionRepository {
    async fn upsert(&self, entry: &FeedUsageEntry) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO feed_entry (flock_id, entry_date, feed_type, quantity_kg)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (flock_id, entry_date) DO UPDATE SET
                feed_type = EXCLUDED.feed_type,
                quantity_kg = EXCLUDED.quantity_kg,
                updated_at = now()
            ",
        )
        .bind(entry.flock_id.as_i32())
        .bind(entry.date)
        .bind(&entry.feed_type)
        .bind(entry.quantity_kg)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn get(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<FeedUsageEntry>, StoreError> {
        let row = sqlx::query_as::<_, FeedEntryRow>(
            r"
            SELECT flock_id, entry_date, feed_type, quantity_kg
            FROM feed_entry
            WHERE flock_id = $1 AND entry_date = $2
            ",
        )
        .bind(flock_id.as_i32())
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, flock_id: FlockId, date: NaiveDate) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM feed_entry WHERE flock_id = $1 AND entry_date = $2")
            .bind(flock_id.as_i32())
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(result.rows_affected() > 0)
    }
}
