//! Roost production ledger.
//!
//! A per-flock, date-ordered sequence of daily records tracking a derived
//! running head-count ("birds remaining"), kept consistent across three
//! overlapping write paths: the unified daily record, the narrower egg-count
//! entry, and the feed-consumption entry.
//!
//! # Architecture
//!
//! - [`model`] - Domain entities: flocks, ledger rows, narrow projections
//! - [`age`] - Pure flock-age calculation from calendar dates
//! - [`store`] - Storage traits ([`LedgerStore`], [`FlockRegistry`], the
//!   narrow projection stores) plus the in-memory implementation
//! - [`service`] - [`LedgerService`], the write façades and range reads
//! - [`error`] - Typed failure taxonomy
//!
//! Writes to one flock are serialized; writes to different flocks proceed
//! in parallel. Every write validates and plans its forward recomputation
//! before anything is persisted, and the whole batch commits atomically.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod age;
pub mod error;
pub mod model;
pub mod service;
pub mod store;

mod baseline;
mod sync;
mod validate;

pub use error::{LedgerError, StoreError};
pub use model::{
    EggCounts, EggEntryInput, EggProductionEntry, FeedEntryInput, FeedUsageEntry, Flock, FlockAge,
    ProductionRecord, ProductionRecordInput,
};
pub use service::LedgerService;
pub use store::memory::MemoryStore;
pub use store::{EggEntryStore, FeedEntryStore, FlockRegistry, LedgerStore};
