//! Route definitions for the dashboard API.

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

pub mod entries;
pub mod flocks;
pub mod records;

/// All API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/flocks", get(flocks::list_flocks))
        .route(
            "/api/flocks/{flock_id}/records",
            post(records::upsert_record).get(records::list_records),
        )
        .route(
            "/api/flocks/{flock_id}/records/{date}",
            axum::routing::delete(records::delete_record),
        )
        .route(
            "/api/flocks/{flock_id}/egg-entries",
            post(entries::upsert_egg_entry),
        )
        .route(
            "/api/flocks/{flock_id}/egg-entries/{date}",
            get(entries::get_egg_entry),
        )
        .route(
            "/api/flocks/{flock_id}/feed-entries",
            post(entries::upsert_feed_entry),
        )
        .route(
            "/api/flocks/{flock_id}/feed-entries/{date}",
            get(entries::get_feed_entry),
        )
}
