//! Storage seams for the production ledger.
//!
//! Any storage engine offering point lookup, nearest-prior lookup, ordered
//! range scan, and an atomic multi-row commit per flock can sit behind
//! these traits. The dashboard provides Postgres implementations; the
//! [`memory`] module provides an in-memory one for tests and tooling.

use async_trait::async_trait;
use chrono::NaiveDate;

use roost_core::FlockId;

use crate::error::StoreError;
use crate::model::{EggProductionEntry, FeedUsageEntry, Flock, ProductionRecord};

pub mod memory;

/// Read-only flock reference data.
///
/// Flock lifecycle is owned elsewhere; the ledger only ever reads the
/// start date and initial head-count.
#[async_trait]
pub trait FlockRegistry: Send + Sync {
    /// Fetch a flock by ID. `Ok(None)` when the identity is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the lookup itself fails.
    async fn get_flock(&self, flock_id: FlockId) -> Result<Option<Flock>, StoreError>;
}

/// Persistent keyed store of unified ledger rows.
///
/// One row per (flock, date). All operations are scoped to a single
/// flock's partition; different flocks never contend.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Insert or replace the row keyed on (flock, date).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    async fn upsert(&self, record: &ProductionRecord) -> Result<(), StoreError>;

    /// Point lookup.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the lookup fails.
    async fn get(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<ProductionRecord>, StoreError>;

    /// The latest row strictly before `date`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the lookup fails.
    async fn nearest_before(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<ProductionRecord>, StoreError>;

    /// All rows with date >= `date`, ascending by date.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the scan fails.
    async fn range_from(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Vec<ProductionRecord>, StoreError>;

    /// All rows with `from <= date <= to`, ascending by date.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the scan fails.
    async fn range_between(
        &self,
        flock_id: FlockId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ProductionRecord>, StoreError>;

    /// Remove the row keyed on (flock, date).
    ///
    /// # Returns
    ///
    /// `true` if a row existed, `false` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the delete fails.
    async fn delete(&self, flock_id: FlockId, date: NaiveDate) -> Result<bool, StoreError>;

    /// Apply a batch of upserts plus an optional delete as one atomic unit.
    ///
    /// This is the cascade commit path: an edited row and every downstream
    /// row it re-chains either all land or none do.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the commit fails; no partial state may
    /// remain.
    async fn commit(
        &self,
        flock_id: FlockId,
        upserts: &[ProductionRecord],
        delete: Option<NaiveDate>,
    ) -> Result<(), StoreError>;
}

/// Store for the narrow egg-collection projection.
#[async_trait]
pub trait EggEntryStore: Send + Sync {
    /// Insert or replace the entry keyed on (flock, date).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    async fn upsert(&self, entry: &EggProductionEntry) -> Result<(), StoreError>;

    /// Point lookup.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the lookup fails.
    async fn get(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<EggProductionEntry>, StoreError>;

    /// Remove the entry keyed on (flock, date). Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the delete fails.
    async fn delete(&self, flock_id: FlockId, date: NaiveDate) -> Result<bool, StoreError>;
}

/// Store for the narrow feed-consumption projection.
///
/// Doubles as the out-of-band home of the feed-type tag: the unified row
/// has no feed-type field, so redisplay reads come from here.
#[async_trait]
pub trait FeedEntryStore: Send + Sync {
    /// Insert or replace the entry keyed on (flock, date).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    async fn upsert(&self, entry: &FeedUsageEntry) -> Result<(), StoreError>;

    /// Point lookup.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the lookup fails.
    async fn get(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<FeedUsageEntry>, StoreError>;

    /// Remove the entry keyed on (flock, date). Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the delete fails.
    async fn delete(&self, flock_id: FlockId, date: NaiveDate) -> Result<bool, StoreError>;
}
