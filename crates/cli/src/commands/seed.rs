//! Seed the database with demo data.
//!
//! Creates one flock and a week of production records through the ledger
//! service, so every seeded row goes through the same validation and
//! chaining as real writes.

use std::sync::Arc;

use chrono::Duration;
use rust_decimal::Decimal;

use roost_ledger::LedgerService;
use roost_ledger::model::{EggCounts, FeedEntryInput, ProductionRecordInput};
use roost_ledger::store::{EggEntryStore, FeedEntryStore, FlockRegistry, LedgerStore};

use roost_dashboard::db::flocks::CreateFlockInput;
use roost_dashboard::db::{FlockRepository, ProductionRepository};

use super::CommandError;

const SEED_FLOCK_NAME: &str = "Demo layers";
const SEED_INITIAL_COUNT: i32 = 500;
const SEED_DAYS: i64 = 7;

/// Seed a demo flock with a week of production records.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or any write
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    let flocks = FlockRepository::new(pool.clone());
    let production = Arc::new(ProductionRepository::new(pool));
    let ledger = LedgerService::new(
        Arc::new(flocks.clone()) as Arc<dyn FlockRegistry>,
        Arc::clone(&production) as Arc<dyn LedgerStore>,
        Arc::clone(&production) as Arc<dyn EggEntryStore>,
        production as Arc<dyn FeedEntryStore>,
    );

    let start_date = chrono::Utc::now().date_naive() - Duration::days(SEED_DAYS);
    let flock = flocks
        .create(&CreateFlockInput {
            name: SEED_FLOCK_NAME.to_string(),
            start_date,
            initial_head_count: SEED_INITIAL_COUNT,
        })
        .await?;
    tracing::info!(flock_id = %flock.id, "Seed flock created");

    for day in 1..=SEED_DAYS {
        let date = start_date + Duration::days(day);
        let mortality = i32::from(day % 3 == 0);
        let eggs = EggCounts::new(180 + i32::try_from(day).unwrap_or(0) * 5, 140, 90);

        ledger
            .upsert_production_record(
                flock.id,
                ProductionRecordInput {
                    date,
                    head_count_start: None,
                    mortality,
                    feed_kg: Decimal::new(55, 0),
                    eggs,
                    medication: None,
                    notes: None,
                    manual_age: None,
                },
            )
            .await?;

        ledger
            .upsert_feed_entry(
                flock.id,
                FeedEntryInput {
                    date,
                    feed_type: "Layer Feed".to_string(),
                    quantity_kg: Decimal::new(55, 0),
                },
            )
            .await?;
    }

    tracing::info!(days = SEED_DAYS, "Seed data written");
    Ok(())
}
