//! Integration test support for Roost.
//!
//! Builds a [`LedgerService`] over the in-memory store so scenario tests
//! can drive the real write paths without a database. [`FlakyLedgerStore`]
//! wraps the store with switchable commit failures for exercising the
//! best-effort projection sync.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;

use roost_core::FlockId;
use roost_ledger::error::StoreError;
use roost_ledger::model::{Flock, ProductionRecord};
use roost_ledger::store::{EggEntryStore, FeedEntryStore, FlockRegistry, LedgerStore};
use roost_ledger::{LedgerService, MemoryStore};

/// The flock every test harness registers.
pub const TEST_FLOCK: FlockId = FlockId::new(1);

/// A ledger service over the in-memory store, with the store kept
/// reachable for direct inspection.
pub struct TestLedger {
    /// The shared backing store.
    pub store: Arc<MemoryStore>,
    /// The service under test.
    pub service: LedgerService,
}

impl TestLedger {
    /// Build a service with one registered flock.
    #[must_use]
    pub fn with_flock(start_date: NaiveDate, initial_head_count: i32) -> Self {
        let store = Arc::new(MemoryStore::new());
        store.insert_flock(Flock {
            id: TEST_FLOCK,
            name: "Test flock".to_string(),
            start_date,
            initial_head_count,
        });
        let service = LedgerService::new(
            Arc::clone(&store) as Arc<dyn FlockRegistry>,
            Arc::clone(&store) as Arc<dyn LedgerStore>,
            Arc::clone(&store) as Arc<dyn EggEntryStore>,
            Arc::clone(&store) as Arc<dyn FeedEntryStore>,
        );
        Self { store, service }
    }

    /// Build a service whose ledger store is wrapped in a
    /// [`FlakyLedgerStore`]; returns the wrapper for failure injection.
    #[must_use]
    pub fn with_flaky_ledger(
        start_date: NaiveDate,
        initial_head_count: i32,
    ) -> (Self, Arc<FlakyLedgerStore>) {
        let store = Arc::new(MemoryStore::new());
        store.insert_flock(Flock {
            id: TEST_FLOCK,
            name: "Test flock".to_string(),
            start_date,
            initial_head_count,
        });
        let flaky = Arc::new(FlakyLedgerStore::new(Arc::clone(&store)));
        let service = LedgerService::new(
            Arc::clone(&store) as Arc<dyn FlockRegistry>,
            Arc::clone(&flaky) as Arc<dyn LedgerStore>,
            Arc::clone(&store) as Arc<dyn EggEntryStore>,
            Arc::clone(&store) as Arc<dyn FeedEntryStore>,
        );
        (Self { store, service }, flaky)
    }
}

/// Ledger store wrapper whose batch commits can be made to fail, for
/// exercising the projection sync's failure isolation.
pub struct FlakyLedgerStore {
    inner: Arc<MemoryStore>,
    fail_commits: AtomicBool,
}

impl FlakyLedgerStore {
    /// Wrap an in-memory store; commits succeed until switched off.
    #[must_use]
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            fail_commits: AtomicBool::new(false),
        }
    }

    /// Switch commit failure injection on or off.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    fn injected_failure() -> StoreError {
        StoreError::backend(std::io::Error::other("injected commit failure"))
    }
}

#[async_trait]
impl LedgerStore for FlakyLedgerStore {
    async fn upsert(&self, record: &ProductionRecord) -> Result<(), StoreError> {
        LedgerStore::upsert(self.inner.as_ref(), record).await
    }

    async fn get(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<ProductionRecord>, StoreError> {
        LedgerStore::get(self.inner.as_ref(), flock_id, date).await
    }

    async fn nearest_before(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Option<ProductionRecord>, StoreError> {
        self.inner.nearest_before(flock_id, date).await
    }

    async fn range_from(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<Vec<ProductionRecord>, StoreError> {
        self.inner.range_from(flock_id, date).await
    }

    async fn range_between(
        &self,
        flock_id: FlockId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ProductionRecord>, StoreError> {
        self.inner.range_between(flock_id, from, to).await
    }

    async fn delete(&self, flock_id: FlockId, date: NaiveDate) -> Result<bool, StoreError> {
        LedgerStore::delete(self.inner.as_ref(), flock_id, date).await
    }

    async fn commit(
        &self,
        flock_id: FlockId,
        upserts: &[ProductionRecord],
        delete: Option<NaiveDate>,
    ) -> Result<(), StoreError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(Self::injected_failure());
        }
        self.inner.commit(flock_id, upserts, delete).await
    }
}
