//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use roost_ledger::LedgerService;
use roost_ledger::store::{EggEntryStore, FeedEntryStore, FlockRegistry, LedgerStore};

use crate::config::DashboardConfig;
use crate::db::{FlockRepository, ProductionRepository};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DashboardConfig,
    pool: PgPool,
    flocks: FlockRepository,
    ledger: LedgerService,
}

impl AppState {
    /// Build the state: repositories over the pool, and the ledger service
    /// over the repositories.
    #[must_use]
    pub fn new(config: DashboardConfig, pool: PgPool) -> Self {
        let flocks = FlockRepository::new(pool.clone());
        let production = Arc::new(ProductionRepository::new(pool.clone()));
        let ledger = LedgerService::new(
            Arc::new(flocks.clone()) as Arc<dyn FlockRegistry>,
            Arc::clone(&production) as Arc<dyn LedgerStore>,
            Arc::clone(&production) as Arc<dyn EggEntryStore>,
            production as Arc<dyn FeedEntryStore>,
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                flocks,
                ledger,
            }),
        }
    }

    /// Application configuration.
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// Database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Flock repository (reference data reads and CLI-style management).
    #[must_use]
    pub fn flocks(&self) -> &FlockRepository {
        &self.inner.flocks
    }

    /// The production ledger service.
    #[must_use]
    pub fn ledger(&self) -> &LedgerService {
        &self.inner.ledger
    }
}
