//! Flock reference data route handlers.
//!
//! Read-only: flock lifecycle is managed through the CLI, not the ledger
//! API.

use axum::Json;
use axum::extract::State;

use roost_ledger::model::Flock;

use crate::error::AppError;
use crate::state::AppState;

/// List all flocks for the flock picker.
pub async fn list_flocks(State(state): State<AppState>) -> Result<Json<Vec<Flock>>, AppError> {
    let flocks = state.flocks().list().await?;
    Ok(Json(flocks))
}
