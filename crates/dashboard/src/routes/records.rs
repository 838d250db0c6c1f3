//! Unified production record route handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;

use roost_core::FlockId;
use roost_ledger::model::{ProductionRecord, ProductionRecordInput};

use crate::error::AppError;
use crate::state::AppState;

/// Query parameters for the ledger range read.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Insert or update the unified daily record for a flock.
pub async fn upsert_record(
    State(state): State<AppState>,
    Path(flock_id): Path<i32>,
    Json(input): Json<ProductionRecordInput>,
) -> Result<Json<ProductionRecord>, AppError> {
    let record = state
        .ledger()
        .upsert_production_record(FlockId::new(flock_id), input)
        .await?;
    Ok(Json(record))
}

/// Ledger rows for a flock between two dates, ascending.
pub async fn list_records(
    State(state): State<AppState>,
    Path(flock_id): Path<i32>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<ProductionRecord>>, AppError> {
    if range.from > range.to {
        return Err(AppError::BadRequest(format!(
            "from ({}) is after to ({})",
            range.from, range.to
        )));
    }
    let records = state
        .ledger()
        .ledger_range(FlockId::new(flock_id), range.from, range.to)
        .await?;
    Ok(Json(records))
}

/// Delete the record for (flock, date), re-chaining later rows.
pub async fn delete_record(
    State(state): State<AppState>,
    Path((flock_id, date)): Path<(i32, NaiveDate)>,
) -> Result<StatusCode, AppError> {
    state
        .ledger()
        .delete_production_record(FlockId::new(flock_id), date)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
