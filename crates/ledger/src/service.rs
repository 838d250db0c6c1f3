//! The ledger façade service.
//!
//! Three write entry points (unified record, egg entry, feed entry), a
//! delete, and range reads. Every write follows the same sequence:
//! resolve baseline → validate → plan forward recomputation → commit the
//! batch atomically → best-effort sync of the sibling projection(s).
//!
//! Writes to one flock are serialized on a per-flock mutex; writes to
//! different flocks proceed in parallel with no coordination.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{instrument, warn};

use roost_core::FlockId;

use crate::baseline;
use crate::error::{LedgerError, StoreError};
use crate::model::{
    EggEntryInput, EggProductionEntry, FeedEntryInput, FeedUsageEntry, Flock, ProductionRecord,
    ProductionRecordInput,
};
use crate::store::{EggEntryStore, FeedEntryStore, FlockRegistry, LedgerStore};
use crate::sync::{self, Projections};
use crate::validate::{self, RowChecks};

/// Per-flock write serialization.
///
/// Two concurrent edits to overlapping date ranges of one flock could
/// otherwise interleave their cascades and break the chain invariant.
#[derive(Default)]
struct FlockLocks {
    inner: StdMutex<HashMap<FlockId, Arc<Mutex<()>>>>,
}

impl FlockLocks {
    async fn acquire(&self, flock_id: FlockId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(map.entry(flock_id).or_default())
        };
        lock.lock_owned().await
    }
}

/// Façade service over the production ledger.
pub struct LedgerService {
    registry: Arc<dyn FlockRegistry>,
    store: Arc<dyn LedgerStore>,
    projections: Projections,
    locks: FlockLocks,
}

impl LedgerService {
    /// Create a service over the given registry and stores.
    #[must_use]
    pub fn new(
        registry: Arc<dyn FlockRegistry>,
        store: Arc<dyn LedgerStore>,
        eggs: Arc<dyn EggEntryStore>,
        feed: Arc<dyn FeedEntryStore>,
    ) -> Self {
        Self {
            registry,
            store,
            projections: Projections { eggs, feed },
            locks: FlockLocks::default(),
        }
    }

    /// Insert or update the unified daily record for (flock, date).
    ///
    /// The committed row plus every later row whose chained counts change
    /// land in one atomic batch; the narrow projections are then updated
    /// best-effort.
    ///
    /// # Errors
    ///
    /// `FlockNotFound`, any validation failure, `CascadeViolation`, or a
    /// store failure on the primary commit. Projection sync failures are
    /// logged, never returned.
    #[instrument(skip(self, input), fields(flock = %flock_id, date = %input.date))]
    pub async fn upsert_production_record(
        &self,
        flock_id: FlockId,
        input: ProductionRecordInput,
    ) -> Result<ProductionRecord, LedgerError> {
        let flock = self.flock(flock_id).await?;
        let _guard = self.locks.acquire(flock_id).await;

        let prior = self.store.nearest_before(flock_id, input.date).await?;
        // A manual start count only anchors the earliest row; with a prior
        // row present the chain value wins.
        let head_count_start = match (&prior, input.head_count_start) {
            (Some(row), _) => row.head_count_remaining,
            (None, Some(start)) => start,
            (None, None) => flock.initial_head_count,
        };

        validate::check_row(&RowChecks {
            flock: &flock,
            date: input.date,
            head_count_start,
            mortality: input.mortality,
            eggs: input.eggs,
            broken: None,
            feed_kg: input.feed_kg,
            age_established: input.manual_age.is_some(),
        })?;

        let record = sync::build_unified_row(&flock, &input, head_count_start)?;
        let batch = self.plan_batch(&record).await?;
        self.store.commit(flock_id, &batch, None).await?;

        if let Err(e) = self.projections.propagate_record(&record).await {
            warn!(error = %e, "sibling projection sync failed after ledger commit");
        }
        Ok(record)
    }

    /// Record or update an egg-collection entry.
    ///
    /// The egg projection row is the primary write; the implied unified
    /// ledger upsert (with its cascade) is synchronized best-effort after
    /// it. Validation and cascade planning still run up front, so every
    /// fatal failure is raised before anything is persisted.
    ///
    /// # Errors
    ///
    /// `FlockNotFound`, any validation failure, `CascadeViolation`, or a
    /// store failure on the egg projection write.
    #[instrument(skip(self, input), fields(flock = %flock_id, date = %input.date))]
    pub async fn upsert_egg_entry(
        &self,
        flock_id: FlockId,
        input: EggEntryInput,
    ) -> Result<ProductionRecord, LedgerError> {
        let flock = self.flock(flock_id).await?;
        let _guard = self.locks.acquire(flock_id).await;

        let existing = self.store.get(flock_id, input.date).await?;
        let head_count_start = match &existing {
            Some(row) => row.head_count_start,
            None => baseline::resolve_baseline(self.store.as_ref(), &flock, input.date).await?,
        };

        validate::check_row(&RowChecks {
            flock: &flock,
            date: input.date,
            head_count_start,
            mortality: existing.as_ref().map_or(0, |r| r.mortality),
            eggs: input.eggs,
            broken: input.broken,
            feed_kg: existing.as_ref().map_or(Decimal::ZERO, |r| r.feed_kg),
            age_established: existing.is_some(),
        })?;

        let record = sync::merge_egg_entry(&flock, &input, existing.as_ref(), head_count_start)?;
        let batch = self.plan_batch(&record).await?;

        let prior_entry = self.projections.eggs.get(flock_id, input.date).await?;
        let entry = EggProductionEntry {
            flock_id,
            date: input.date,
            eggs: input.eggs,
            broken: input
                .broken
                .or_else(|| prior_entry.as_ref().map(|e| e.broken))
                .unwrap_or(0),
            notes: input
                .notes
                .clone()
                .or_else(|| prior_entry.and_then(|e| e.notes)),
        };
        self.projections.eggs.upsert(&entry).await?;

        self.sync_ledger(flock_id, &batch).await;
        Ok(record)
    }

    /// Record or update a feed-consumption entry.
    ///
    /// The feed projection row (which carries the feed-type label) is the
    /// primary write; the implied unified ledger upsert is synchronized
    /// best-effort after it.
    ///
    /// # Errors
    ///
    /// `FlockNotFound`, any validation failure, `CascadeViolation`, or a
    /// store failure on the feed projection write.
    #[instrument(skip(self, input), fields(flock = %flock_id, date = %input.date))]
    pub async fn upsert_feed_entry(
        &self,
        flock_id: FlockId,
        input: FeedEntryInput,
    ) -> Result<ProductionRecord, LedgerError> {
        let flock = self.flock(flock_id).await?;
        let _guard = self.locks.acquire(flock_id).await;

        let existing = self.store.get(flock_id, input.date).await?;
        let head_count_start = match &existing {
            Some(row) => row.head_count_start,
            None => baseline::resolve_baseline(self.store.as_ref(), &flock, input.date).await?,
        };

        validate::check_row(&RowChecks {
            flock: &flock,
            date: input.date,
            head_count_start,
            mortality: existing.as_ref().map_or(0, |r| r.mortality),
            eggs: existing.as_ref().map_or_else(Default::default, |r| r.eggs),
            broken: None,
            feed_kg: input.quantity_kg,
            age_established: existing.is_some(),
        })?;

        let record = sync::merge_feed_entry(&flock, &input, existing.as_ref(), head_count_start)?;
        let batch = self.plan_batch(&record).await?;

        let entry = FeedUsageEntry {
            flock_id,
            date: input.date,
            feed_type: input.feed_type.clone(),
            quantity_kg: input.quantity_kg,
        };
        self.projections.feed.upsert(&entry).await?;

        self.sync_ledger(flock_id, &batch).await;
        Ok(record)
    }

    /// Delete the unified row for (flock, date) and re-chain later rows.
    ///
    /// The deleted date is treated as absent: later rows re-anchor on the
    /// next-earlier surviving row, or the flock's initial count. The
    /// narrow projections for the date are then removed best-effort.
    ///
    /// # Errors
    ///
    /// `FlockNotFound`, `RecordNotFound` when no row exists,
    /// `CascadeViolation` when a later row would go negative, or a store
    /// failure on the primary commit.
    #[instrument(skip(self), fields(flock = %flock_id, date = %date))]
    pub async fn delete_production_record(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<(), LedgerError> {
        let flock = self.flock(flock_id).await?;
        let _guard = self.locks.acquire(flock_id).await;

        if self.store.get(flock_id, date).await?.is_none() {
            return Err(LedgerError::RecordNotFound { flock_id, date });
        }

        let carried = baseline::resolve_baseline(self.store.as_ref(), &flock, date).await?;
        let later = self.rows_after(flock_id, date).await?;
        let updates = baseline::plan_forward(carried, &later)?;
        self.store.commit(flock_id, &updates, Some(date)).await?;

        if let Err(e) = self.projections.remove_for(flock_id, date).await {
            warn!(error = %e, "sibling projection cleanup failed after ledger delete");
        }
        Ok(())
    }

    /// All unified rows for the flock in `from..=to`, ascending by date.
    ///
    /// Read-only, no side effects.
    ///
    /// # Errors
    ///
    /// `FlockNotFound` or a store failure.
    pub async fn ledger_range(
        &self,
        flock_id: FlockId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ProductionRecord>, LedgerError> {
        self.flock(flock_id).await?;
        Ok(self.store.range_between(flock_id, from, to).await?)
    }

    /// The stored egg projection for (flock, date), for redisplay.
    ///
    /// # Errors
    ///
    /// Returns a store failure as `LedgerError::Store`.
    pub async fn egg_entry(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<EggProductionEntry>, LedgerError> {
        Ok(self.projections.eggs.get(flock_id, date).await?)
    }

    /// The stored feed projection for (flock, date), for redisplay.
    ///
    /// # Errors
    ///
    /// Returns a store failure as `LedgerError::Store`.
    pub async fn feed_entry(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<FeedUsageEntry>, LedgerError> {
        Ok(self.projections.feed.get(flock_id, date).await?)
    }

    async fn flock(&self, flock_id: FlockId) -> Result<Flock, LedgerError> {
        self.registry
            .get_flock(flock_id)
            .await?
            .ok_or(LedgerError::FlockNotFound(flock_id))
    }

    /// The atomic commit batch for a candidate row: the row itself plus
    /// every later row whose chained counts change.
    async fn plan_batch(
        &self,
        record: &ProductionRecord,
    ) -> Result<Vec<ProductionRecord>, LedgerError> {
        let later = self.rows_after(record.flock_id, record.date).await?;
        let mut batch = vec![record.clone()];
        batch.extend(baseline::plan_forward(record.head_count_remaining, &later)?);
        Ok(batch)
    }

    async fn rows_after(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Vec<ProductionRecord>, StoreError> {
        let mut rows = self.store.range_from(flock_id, date).await?;
        rows.retain(|r| r.date > date);
        Ok(rows)
    }

    /// Best-effort commit of the unified ledger batch after a narrow
    /// façade's primary write. Failures are logged, never propagated.
    async fn sync_ledger(&self, flock_id: FlockId, batch: &[ProductionRecord]) {
        if let Err(source) = self.store.commit(flock_id, batch, None).await {
            let e = LedgerError::SyncPropagationFailed {
                target: "production ledger",
                source,
            };
            warn!(error = %e, "unified ledger sync failed after projection commit");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::EggCounts;
    use crate::store::memory::MemoryStore;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn service_with_flock() -> LedgerService {
        let store = Arc::new(MemoryStore::new());
        store.insert_flock(Flock {
            id: FlockId::new(1),
            name: "Barn 1".to_string(),
            start_date: date(1),
            initial_head_count: 100,
        });
        LedgerService::new(
            Arc::clone(&store) as Arc<dyn FlockRegistry>,
            Arc::clone(&store) as Arc<dyn LedgerStore>,
            Arc::clone(&store) as Arc<dyn EggEntryStore>,
            store as Arc<dyn FeedEntryStore>,
        )
    }

    fn record_input(d: u32, mortality: i32) -> ProductionRecordInput {
        ProductionRecordInput {
            date: date(d),
            head_count_start: None,
            mortality,
            feed_kg: Decimal::ZERO,
            eggs: EggCounts::default(),
            medication: None,
            notes: None,
            manual_age: None,
        }
    }

    #[tokio::test]
    async fn test_baseline_resolves_from_prior_day() {
        let service = service_with_flock();
        let flock = FlockId::new(1);

        let day1 = service
            .upsert_production_record(flock, record_input(2, 5))
            .await
            .unwrap();
        assert_eq!(day1.head_count_start, 100);
        assert_eq!(day1.head_count_remaining, 95);

        let day2 = service
            .upsert_production_record(flock, record_input(3, 3))
            .await
            .unwrap();
        assert_eq!(day2.head_count_start, 95);
        assert_eq!(day2.head_count_remaining, 92);
    }

    #[tokio::test]
    async fn test_unknown_flock_is_fatal() {
        let service = service_with_flock();
        let err = service
            .upsert_production_record(FlockId::new(99), record_input(2, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::FlockNotFound(id) if id == FlockId::new(99)));
    }

    #[tokio::test]
    async fn test_manual_start_only_anchors_earliest_row() {
        let service = service_with_flock();
        let flock = FlockId::new(1);

        let mut input = record_input(2, 0);
        input.head_count_start = Some(120);
        let earliest = service
            .upsert_production_record(flock, input)
            .await
            .unwrap();
        assert_eq!(earliest.head_count_start, 120);

        // With a prior row present the chain value wins over the override.
        let mut input = record_input(3, 0);
        input.head_count_start = Some(999);
        let chained = service
            .upsert_production_record(flock, input)
            .await
            .unwrap();
        assert_eq!(chained.head_count_start, 120);
    }

    #[tokio::test]
    async fn test_delete_missing_row_is_not_found() {
        let service = service_with_flock();
        let err = service
            .delete_production_record(FlockId::new(1), date(9))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::RecordNotFound { .. }));
    }

    #[tokio::test]
    async fn test_range_read_is_ordered() {
        let service = service_with_flock();
        let flock = FlockId::new(1);
        for d in [6, 2, 4] {
            service
                .upsert_production_record(flock, record_input(d, 0))
                .await
                .unwrap();
        }
        let rows = service.ledger_range(flock, date(1), date(31)).await.unwrap();
        let dates: Vec<_> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2), date(4), date(6)]);
    }
}
