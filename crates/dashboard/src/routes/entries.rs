//! Egg and feed entry route handlers.
//!
//! The narrow entry forms post here; each write lands in its own
//! projection and is synchronized into the unified ledger. The GET
//! handlers serve the redisplay detail (broken-egg count, feed-type
//! label) that the unified row does not store.

use axum::Json;
use axum::extract::{Path, State};
use chrono::NaiveDate;

use roost_core::FlockId;
use roost_ledger::model::{
    EggEntryInput, EggProductionEntry, FeedEntryInput, FeedUsageEntry, ProductionRecord,
};

use crate::error::AppError;
use crate::state::AppState;

/// Record or update an egg-collection entry.
pub async fn upsert_egg_entry(
    State(state): State<AppState>,
    Path(flock_id): Path<i32>,
    Json(input): Json<EggEntryInput>,
) -> Result<Json<ProductionRecord>, AppError> {
    let record = state
        .ledger()
        .upsert_egg_entry(FlockId::new(flock_id), input)
        .await?;
    Ok(Json(record))
}

/// The stored egg entry for (flock, date).
pub async fn get_egg_entry(
    State(state): State<AppState>,
    Path((flock_id, date)): Path<(i32, NaiveDate)>,
) -> Result<Json<EggProductionEntry>, AppError> {
    state
        .ledger()
        .egg_entry(FlockId::new(flock_id), date)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no egg entry for flock {flock_id} on {date}")))
}

/// Record or update a feed-consumption entry.
pub async fn upsert_feed_entry(
    State(state): State<AppState>,
    Path(flock_id): Path<i32>,
    Json(input): Json<FeedEntryInput>,
) -> Result<Json<ProductionRecord>, AppError> {
    let record = state
        .ledger()
        .upsert_feed_entry(FlockId::new(flock_id), input)
        .await?;
    Ok(Json(record))
}

/// The stored feed entry for (flock, date).
pub async fn get_feed_entry(
    State(state): State<AppState>,
    Path((flock_id, date)): Path<(i32, NaiveDate)>,
) -> Result<Json<FeedUsageEntry>, AppError> {
    state
        .ledger()
        .feed_entry(FlockId::new(flock_id), date)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("no feed entry for flock {flock_id} on {date}")))
}
