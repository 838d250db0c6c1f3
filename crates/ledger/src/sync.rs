//! Cross-entity synchronization between the unified ledger row and the
//! narrow egg/feed projections.
//!
//! The builders translate a narrow write into the unified row it implies;
//! [`Projections`] pushes a committed unified row back out so the narrow
//! views can redisplay it. All three façades share this one core, so the
//! invariants are enforced identically regardless of entry point.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use roost_core::FlockId;

use crate::age;
use crate::error::{LedgerError, StoreError};
use crate::model::{
    EggEntryInput, EggProductionEntry, FeedEntryInput, Flock, ProductionRecord,
    ProductionRecordInput,
};
use crate::store::{EggEntryStore, FeedEntryStore};

/// Build the unified row a full-record upsert commits.
///
/// `head_count_start` is the already-resolved baseline (or honored manual
/// override for a flock's earliest row).
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAge`] when no manual age was supplied and
/// the date precedes the flock's start.
pub(crate) fn build_unified_row(
    flock: &Flock,
    input: &ProductionRecordInput,
    head_count_start: i32,
) -> Result<ProductionRecord, LedgerError> {
    let age = match input.manual_age {
        Some(age) => age,
        None => age::age_on(flock.start_date, input.date)?,
    };
    Ok(ProductionRecord {
        flock_id: flock.id,
        date: input.date,
        age,
        head_count_start,
        mortality: input.mortality,
        head_count_remaining: head_count_start - input.mortality,
        feed_kg: input.feed_kg,
        eggs: input.eggs,
        medication: input.medication.clone(),
        notes: input.notes.clone(),
    })
}

/// Translate an egg-entry write into the unified row it implies.
///
/// On an existing row only the egg fields (and notes, when supplied)
/// change; a fresh row gets ledger defaults: the resolved baseline, zero
/// mortality, zero feed.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAge`] when a fresh row's date precedes
/// the flock's start.
pub(crate) fn merge_egg_entry(
    flock: &Flock,
    input: &EggEntryInput,
    existing: Option<&ProductionRecord>,
    baseline: i32,
) -> Result<ProductionRecord, LedgerError> {
    existing.map_or_else(
        || {
            Ok(ProductionRecord {
                flock_id: flock.id,
                date: input.date,
                age: age::age_on(flock.start_date, input.date)?,
                head_count_start: baseline,
                mortality: 0,
                head_count_remaining: baseline,
                feed_kg: Decimal::ZERO,
                eggs: input.eggs,
                medication: None,
                notes: input.notes.clone(),
            })
        },
        |row| {
            let mut updated = row.clone();
            updated.eggs = input.eggs;
            if let Some(notes) = &input.notes {
                updated.notes = Some(notes.clone());
            }
            Ok(updated)
        },
    )
}

/// Translate a feed-entry write into the unified row it implies.
///
/// Mirror of [`merge_egg_entry`] for the feed field; the feed-type label
/// never enters the unified row and stays in the feed projection.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAge`] when a fresh row's date precedes
/// the flock's start.
pub(crate) fn merge_feed_entry(
    flock: &Flock,
    input: &FeedEntryInput,
    existing: Option<&ProductionRecord>,
    baseline: i32,
) -> Result<ProductionRecord, LedgerError> {
    existing.map_or_else(
        || {
            Ok(ProductionRecord {
                flock_id: flock.id,
                date: input.date,
                age: age::age_on(flock.start_date, input.date)?,
                head_count_start: baseline,
                mortality: 0,
                head_count_remaining: baseline,
                feed_kg: input.quantity_kg,
                eggs: crate::model::EggCounts::default(),
                medication: None,
                notes: None,
            })
        },
        |row| {
            let mut updated = row.clone();
            updated.feed_kg = input.quantity_kg;
            Ok(updated)
        },
    )
}

/// Handles to the narrow projection stores, plus the unified→narrow
/// propagation used after a full-record commit.
pub(crate) struct Projections {
    pub(crate) eggs: Arc<dyn EggEntryStore>,
    pub(crate) feed: Arc<dyn FeedEntryStore>,
}

impl Projections {
    /// Push a committed unified row out to the narrow projections.
    ///
    /// The egg projection is upserted (preserving its broken-egg count);
    /// the feed projection is only updated when an entry already exists,
    /// since a feed-type label cannot be invented here.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SyncPropagationFailed`] on any store
    /// failure; callers log it and keep the primary write.
    pub(crate) async fn propagate_record(
        &self,
        record: &ProductionRecord,
    ) -> Result<(), LedgerError> {
        let existing = self
            .eggs
            .get(record.flock_id, record.date)
            .await
            .map_err(sync_err("egg projection"))?;
        let entry = EggProductionEntry {
            flock_id: record.flock_id,
            date: record.date,
            eggs: record.eggs,
            broken: existing.as_ref().map_or(0, |e| e.broken),
            notes: record
                .notes
                .clone()
                .or_else(|| existing.and_then(|e| e.notes)),
        };
        self.eggs
            .upsert(&entry)
            .await
            .map_err(sync_err("egg projection"))?;

        if let Some(mut entry) = self
            .feed
            .get(record.flock_id, record.date)
            .await
            .map_err(sync_err("feed projection"))?
        {
            entry.quantity_kg = record.feed_kg;
            self.feed
                .upsert(&entry)
                .await
                .map_err(sync_err("feed projection"))?;
        }
        Ok(())
    }

    /// Drop both narrow projections for a deleted (flock, date).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::SyncPropagationFailed`] on any store
    /// failure; callers log it and keep the primary delete.
    pub(crate) async fn remove_for(
        &self,
        flock_id: FlockId,
        date: NaiveDate,
    ) -> Result<(), LedgerError> {
        self.eggs
            .delete(flock_id, date)
            .await
            .map_err(sync_err("egg projection"))?;
        self.feed
            .delete(flock_id, date)
            .await
            .map_err(sync_err("feed projection"))?;
        Ok(())
    }
}

fn sync_err(target: &'static str) -> impl FnOnce(StoreError) -> LedgerError {
    move |source| LedgerError::SyncPropagationFailed { target, source }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::{EggCounts, FlockAge};

    fn flock() -> Flock {
        Flock {
            id: FlockId::new(1),
            name: "Barn 1".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            initial_head_count: 100,
        }
    }

    fn existing_row() -> ProductionRecord {
        ProductionRecord {
            flock_id: FlockId::new(1),
            date: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
            age: FlockAge::new(4, 0),
            head_count_start: 97,
            mortality: 2,
            head_count_remaining: 95,
            feed_kg: Decimal::new(18, 0),
            eggs: EggCounts::new(30, 20, 10),
            medication: Some("vitamin mix".to_string()),
            notes: Some("existing".to_string()),
        }
    }

    #[test]
    fn test_merge_egg_entry_touches_only_egg_fields() {
        let flock = flock();
        let row = existing_row();
        let input = EggEntryInput {
            date: row.date,
            eggs: EggCounts::new(40, 25, 15),
            broken: Some(3),
            notes: None,
        };
        let merged = merge_egg_entry(&flock, &input, Some(&row), 97).unwrap();
        assert_eq!(merged.eggs, EggCounts::new(40, 25, 15));
        // Everything else is untouched, including notes when none supplied.
        assert_eq!(merged.mortality, row.mortality);
        assert_eq!(merged.head_count_start, row.head_count_start);
        assert_eq!(merged.feed_kg, row.feed_kg);
        assert_eq!(merged.age, row.age);
        assert_eq!(merged.notes, row.notes);
        assert_eq!(merged.medication, row.medication);
    }

    #[test]
    fn test_merge_egg_entry_defaults_fresh_row() {
        let flock = flock();
        let input = EggEntryInput {
            date: NaiveDate::from_ymd_opt(2026, 3, 8).unwrap(),
            eggs: EggCounts::new(12, 10, 8),
            broken: None,
            notes: Some("first collection".to_string()),
        };
        let merged = merge_egg_entry(&flock, &input, None, 95).unwrap();
        assert_eq!(merged.head_count_start, 95);
        assert_eq!(merged.mortality, 0);
        assert_eq!(merged.head_count_remaining, 95);
        assert_eq!(merged.feed_kg, Decimal::ZERO);
        assert_eq!(merged.age.days, 7);
        assert_eq!(merged.notes.as_deref(), Some("first collection"));
    }

    #[test]
    fn test_merge_feed_entry_touches_only_feed_field() {
        let flock = flock();
        let row = existing_row();
        let input = FeedEntryInput {
            date: row.date,
            feed_type: "Layer Feed".to_string(),
            quantity_kg: Decimal::new(25, 0),
        };
        let merged = merge_feed_entry(&flock, &input, Some(&row), 97).unwrap();
        assert_eq!(merged.feed_kg, Decimal::new(25, 0));
        assert_eq!(merged.eggs, row.eggs);
        assert_eq!(merged.mortality, row.mortality);
        assert_eq!(merged.notes, row.notes);
    }

    #[test]
    fn test_build_unified_row_derives_remainder_and_age() {
        let flock = flock();
        let input = ProductionRecordInput {
            date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            head_count_start: None,
            mortality: 4,
            feed_kg: Decimal::new(20, 0),
            eggs: EggCounts::new(50, 30, 20),
            medication: None,
            notes: None,
            manual_age: None,
        };
        let row = build_unified_row(&flock, &input, 90).unwrap();
        assert_eq!(row.head_count_remaining, 86);
        assert_eq!(row.age.days, 14);
        assert_eq!(row.age.weeks, 2);
    }

    #[test]
    fn test_build_unified_row_honors_manual_age() {
        let flock = flock();
        let input = ProductionRecordInput {
            date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            head_count_start: None,
            mortality: 0,
            feed_kg: Decimal::ZERO,
            eggs: EggCounts::default(),
            medication: None,
            notes: None,
            manual_age: Some(FlockAge::new(140, 20)),
        };
        let row = build_unified_row(&flock, &input, 90).unwrap();
        assert_eq!(row.age, FlockAge::new(140, 20));
    }
}
