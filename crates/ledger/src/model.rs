//! Production ledger domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use roost_core::FlockId;

/// A flock as the ledger sees it: read-only reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flock {
    /// Unique flock ID.
    pub id: FlockId,
    /// Display name (e.g., "Barn 2 layers").
    pub name: String,
    /// Date the flock was placed.
    pub start_date: NaiveDate,
    /// Head-count the flock was placed with.
    pub initial_head_count: i32,
}

/// Age of a flock on a given record date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlockAge {
    /// Whole days since placement.
    pub days: i32,
    /// Whole weeks since placement (`days / 7`).
    pub weeks: i32,
}

impl FlockAge {
    /// Create an age from explicit day and week counts.
    #[must_use]
    pub const fn new(days: i32, weeks: i32) -> Self {
        Self { days, weeks }
    }
}

/// Egg counts for the three collection slots of one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EggCounts {
    /// Eggs collected in the morning round.
    pub morning: i32,
    /// Eggs collected in the midday round.
    pub midday: i32,
    /// Eggs collected in the evening round.
    pub evening: i32,
}

impl EggCounts {
    /// Create egg counts for the three slots.
    #[must_use]
    pub const fn new(morning: i32, midday: i32, evening: i32) -> Self {
        Self {
            morning,
            midday,
            evening,
        }
    }

    /// Total eggs for the day. Always derived from the slots, never
    /// authored independently.
    #[must_use]
    pub const fn total(&self) -> i32 {
        self.morning + self.midday + self.evening
    }
}

/// The unified daily ledger row for one flock on one date.
///
/// At most one row exists per (flock, date). `head_count_remaining` is
/// always `head_count_start - mortality` and feeds the next chronological
/// row's `head_count_start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    /// Flock this row belongs to.
    pub flock_id: FlockId,
    /// Calendar date of the record.
    pub date: NaiveDate,
    /// Flock age on that date.
    pub age: FlockAge,
    /// Birds alive at the start of the day.
    pub head_count_start: i32,
    /// Deaths recorded that day.
    pub mortality: i32,
    /// Birds alive at the end of the day.
    pub head_count_remaining: i32,
    /// Feed consumed that day, in kilograms.
    pub feed_kg: Decimal,
    /// Egg counts per collection slot.
    pub eggs: EggCounts,
    /// Medication administered, free text.
    pub medication: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl ProductionRecord {
    /// Total eggs for the day, derived from the three slots.
    #[must_use]
    pub const fn egg_total(&self) -> i32 {
        self.eggs.total()
    }
}

/// Narrow egg-collection projection of a ledger row.
///
/// Carries the broken-egg count, which the unified row does not store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EggProductionEntry {
    /// Flock this entry belongs to.
    pub flock_id: FlockId,
    /// Calendar date of the entry.
    pub date: NaiveDate,
    /// Egg counts per collection slot.
    pub eggs: EggCounts,
    /// Eggs broken during collection.
    pub broken: i32,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Narrow feed-consumption projection of a ledger row.
///
/// Carries the feed-type label, which the unified row does not store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedUsageEntry {
    /// Flock this entry belongs to.
    pub flock_id: FlockId,
    /// Calendar date of the entry.
    pub date: NaiveDate,
    /// Feed type label (e.g., "Layer Feed").
    pub feed_type: String,
    /// Quantity consumed, in kilograms.
    pub quantity_kg: Decimal,
}

/// Input for upserting a unified production record.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductionRecordInput {
    /// Calendar date of the record.
    pub date: NaiveDate,
    /// Manual start-count override. Honored only for the earliest row of a
    /// flock, where it replaces the initial-head-count default; later rows
    /// always chain from the prior day's remainder.
    pub head_count_start: Option<i32>,
    /// Deaths recorded that day.
    pub mortality: i32,
    /// Feed consumed that day, in kilograms.
    #[serde(default)]
    pub feed_kg: Decimal,
    /// Egg counts per collection slot.
    #[serde(default)]
    pub eggs: EggCounts,
    /// Medication administered, free text.
    pub medication: Option<String>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Manual age override, stored as-is and bypassing the age calculator.
    pub manual_age: Option<FlockAge>,
}

/// Input for upserting an egg-collection entry.
#[derive(Debug, Clone, Deserialize)]
pub struct EggEntryInput {
    /// Calendar date of the entry.
    pub date: NaiveDate,
    /// Egg counts per collection slot.
    pub eggs: EggCounts,
    /// Eggs broken during collection. `None` preserves the stored count.
    pub broken: Option<i32>,
    /// Free-text notes. `None` preserves the stored notes.
    pub notes: Option<String>,
}

/// Input for upserting a feed-consumption entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEntryInput {
    /// Calendar date of the entry.
    pub date: NaiveDate,
    /// Feed type label.
    pub feed_type: String,
    /// Quantity consumed, in kilograms.
    pub quantity_kg: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_egg_total_sums_slots() {
        let eggs = EggCounts::new(120, 80, 45);
        assert_eq!(eggs.total(), 245);
    }

    #[test]
    fn test_egg_counts_default_is_zero() {
        assert_eq!(EggCounts::default().total(), 0);
    }
}
