//! In-memory store implementing every ledger storage trait.
//!
//! Rows are held per flock in a date-ordered map, so nearest-prior lookup
//! and range scans never touch unrelated history. Used by the test suites
//! and by local tooling that has no database at hand.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use roost_core::FlockId;

use crate::error::StoreError;
use crate::model::{EggProductionEntry, FeedUsageEntry, Flock, ProductionRecord};
use crate::store::{EggEntryStore, FeedEntryStore, FlockRegistry, LedgerStore};

type DayMap<T> = BTreeMap<NaiveDate, T>;

#[derive(Debug, Default)]
struct Tables {
    flocks: HashMap<FlockId, Flock>,
    records: HashMap<FlockId, DayMap<ProductionRecord>>,
    egg_entries: HashMap<FlockId, DayMap<EggProductionEntry>>,
    feed_entries: HashMap<FlockId, DayMap<FeedUsageEntry>>,
}

/// In-memory registry + ledger + projection store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flock in the in-memory registry.
    pub fn insert_flock(&self, flock: Flock) {
        self.write().flocks.insert(flock.id, flock);
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl FlockRegistry for MemoryStore {
    async fn get_flock(&self, flock_id: FlockId) -> Result<Option<Flock>, StoreError> {
        Ok(self.read().flocks.get(&flock_id).cloned())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn upsert(&self, record: &ProductionRecord) -> Result<(), StoreError> {
        self.write()
            .records
            .entry(record.flock_id)
            .or_default()
            .insert(record.date, record.clone());
        Ok(())
    }

    async fn get(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<ProductionRecord>, StoreError> {
        Ok(self
            .read()
            .records
            .get(&flock_id)
            .and_then(|days| days.get(&date))
            .cloned())
    }

    async fn nearest_before(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<ProductionRecord>, StoreError> {
        Ok(self
            .read()
            .records
            .get(&flock_id)
            .and_then(|days| days.range(..date).next_back())
            .map(|(_, record)| record.clone()))
    }

    async fn range_from(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Vec<ProductionRecord>, StoreError> {
        Ok(self
            .read()
            .records
            .get(&flock_id)
            .map(|days| days.range(date..).map(|(_, r)| r.clone()).collect())
            .unwrap_or_default())
    }

    async fn range_between(
        &self,
        flock_id: FlockId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ProductionRecord>, StoreError> {
        Ok(self
            .read()
            .records
            .get(&flock_id)
            .map(|days| days.range(from..=to).map(|(_, r)| r.clone()).collect())
            .unwrap_or_default())
    }

    async fn delete(&self, flock_id: FlockId, date: NaiveDate) -> Result<bool, StoreError> {
        Ok(self
            .write()
            .records
            .get_mut(&flock_id)
            .is_some_and(|days| days.remove(&date).is_some()))
    }

    async fn commit(
        &self,
        flock_id: FlockId,
        upserts: &[ProductionRecord],
        delete: Option<NaiveDate>,
    ) -> Result<(), StoreError> {
        // Single write guard makes the whole batch atomic.
        let mut tables = self.write();
        let days = tables.records.entry(flock_id).or_default();
        if let Some(date) = delete {
            days.remove(&date);
        }
        for record in upserts {
            days.insert(record.date, record.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl EggEntryStore for MemoryStore {
    async fn upsert(&self, entry: &EggProductionEntry) -> Result<(), StoreError> {
        self.write()
            .egg_entries
            .entry(entry.flock_id)
            .or_default()
            .insert(entry.date, entry.clone());
        Ok(())
    }

    async fn get(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<EggProductionEntry>, StoreError> {
        Ok(self
            .read()
            .egg_entries
            .get(&flock_id)
            .and_then(|days| days.get(&date))
            .cloned())
    }

    async fn delete(&self, flock_id: FlockId, date: NaiveDate) -> Result<bool, StoreError> {
        Ok(self
            .write()
            .egg_entries
            .get_mut(&flock_id)
            .is_some_and(|days| days.remove(&date).is_some()))
    }
}

#[async_trait]
impl FeedEntryStore for MemoryStore {
    async fn upsert(&self, entry: &FeedUsageEntry) -> Result<(), StoreError> {
        self.write()
            .feed_entries
            .entry(entry.flock_id)
            .or_default()
            .insert(entry.date, entry.clone());
        Ok(())
    }

    async fn get(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<FeedUsageEntry>, StoreError> {
        Ok(self
            .read()
            .feed_entries
            .get(&flock_id)
            .and_then(|days| days.get(&date))
            .cloned())
    }

    async fn delete(&self, flock_id: FlockId, date: NaiveDate) -> Result<bool, StoreError> {
        Ok(self
            .write()
            .feed_entries
            .get_mut(&flock_id)
            .is_some_and(|days| days.remove(&date).is_some()))
    }
}
