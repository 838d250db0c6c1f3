//! Cross-projection scenarios: egg and feed entries against the unified
//! ledger, redisplay reads, and failure isolation of the sibling sync.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;

use roost_integration_tests::{TEST_FLOCK, TestLedger};
use roost_ledger::model::{EggCounts, EggEntryInput, FeedEntryInput, ProductionRecordInput};
use roost_ledger::store::{EggEntryStore, FeedEntryStore, LedgerStore};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn record_input(d: u32, mortality: i32) -> ProductionRecordInput {
    ProductionRecordInput {
        date: date(d),
        head_count_start: None,
        mortality,
        feed_kg: Decimal::new(18, 0),
        eggs: EggCounts::new(30, 20, 10),
        medication: Some("vitamin mix".to_string()),
        notes: Some("routine day".to_string()),
        manual_age: None,
    }
}

fn egg_input(d: u32, eggs: EggCounts) -> EggEntryInput {
    EggEntryInput {
        date: date(d),
        eggs,
        broken: Some(2),
        notes: None,
    }
}

fn feed_input(d: u32, kg: i64) -> FeedEntryInput {
    FeedEntryInput {
        date: date(d),
        feed_type: "Layer Feed".to_string(),
        quantity_kg: Decimal::new(kg, 0),
    }
}

// =============================================================================
// Egg Entries
// =============================================================================

/// An egg entry against an existing unified row changes egg fields only.
#[tokio::test]
async fn test_egg_entry_leaves_other_fields_untouched() {
    let harness = TestLedger::with_flock(date(1), 100);
    harness
        .service
        .upsert_production_record(TEST_FLOCK, record_input(5, 3))
        .await
        .unwrap();

    let updated = harness
        .service
        .upsert_egg_entry(TEST_FLOCK, egg_input(5, EggCounts::new(44, 33, 22)))
        .await
        .unwrap();

    assert_eq!(updated.eggs, EggCounts::new(44, 33, 22));
    assert_eq!(updated.egg_total(), 99);
    assert_eq!(updated.mortality, 3);
    assert_eq!(updated.head_count_start, 100);
    assert_eq!(updated.feed_kg, Decimal::new(18, 0));
    assert_eq!(updated.age.days, 4);
    assert_eq!(updated.medication.as_deref(), Some("vitamin mix"));
    assert_eq!(updated.notes.as_deref(), Some("routine day"));
}

/// An egg entry with no unified row creates one with ledger defaults.
#[tokio::test]
async fn test_egg_entry_creates_row_with_defaults() {
    let harness = TestLedger::with_flock(date(1), 100);
    harness
        .service
        .upsert_production_record(TEST_FLOCK, record_input(2, 10))
        .await
        .unwrap();

    let created = harness
        .service
        .upsert_egg_entry(TEST_FLOCK, egg_input(6, EggCounts::new(12, 10, 8)))
        .await
        .unwrap();

    assert_eq!(created.head_count_start, 90);
    assert_eq!(created.mortality, 0);
    assert_eq!(created.head_count_remaining, 90);
    assert_eq!(created.feed_kg, Decimal::ZERO);
    assert_eq!(created.egg_total(), 30);

    // The unified row is really in the ledger.
    let stored = LedgerStore::get(harness.store.as_ref(), TEST_FLOCK, date(6))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, created);
}

/// The broken-egg count lives in the projection and survives redisplay.
#[tokio::test]
async fn test_egg_entry_redisplay_carries_broken_count() {
    let harness = TestLedger::with_flock(date(1), 100);
    harness
        .service
        .upsert_egg_entry(TEST_FLOCK, egg_input(4, EggCounts::new(10, 9, 8)))
        .await
        .unwrap();

    let entry = harness
        .service
        .egg_entry(TEST_FLOCK, date(4))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.broken, 2);
    assert_eq!(entry.eggs, EggCounts::new(10, 9, 8));

    // Omitting `broken` on a later write preserves the stored count.
    harness
        .service
        .upsert_egg_entry(
            TEST_FLOCK,
            EggEntryInput {
                date: date(4),
                eggs: EggCounts::new(11, 9, 8),
                broken: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    let entry = harness
        .service
        .egg_entry(TEST_FLOCK, date(4))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.broken, 2);
    assert_eq!(entry.eggs, EggCounts::new(11, 9, 8));
}

// =============================================================================
// Feed Entries
// =============================================================================

/// Feed entry before any unified record exists: the unified row appears
/// with the resolved baseline, zero mortality, and the feed quantity.
#[tokio::test]
async fn test_feed_entry_creates_row_with_resolved_baseline() {
    let harness = TestLedger::with_flock(date(1), 100);
    harness
        .service
        .upsert_production_record(
            TEST_FLOCK,
            ProductionRecordInput {
                date: date(3),
                head_count_start: None,
                mortality: 8,
                feed_kg: Decimal::ZERO,
                eggs: EggCounts::default(),
                medication: None,
                notes: None,
                manual_age: None,
            },
        )
        .await
        .unwrap();

    let created = harness
        .service
        .upsert_feed_entry(TEST_FLOCK, feed_input(4, 20))
        .await
        .unwrap();

    assert_eq!(created.head_count_start, 92);
    assert_eq!(created.mortality, 0);
    assert_eq!(created.feed_kg, Decimal::new(20, 0));

    // The feed-type label is redisplayable from the projection.
    let entry = harness
        .service
        .feed_entry(TEST_FLOCK, date(4))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.feed_type, "Layer Feed");
    assert_eq!(entry.quantity_kg, Decimal::new(20, 0));
}

/// A feed entry against an existing unified row only changes the feed
/// field.
#[tokio::test]
async fn test_feed_entry_leaves_other_fields_untouched() {
    let harness = TestLedger::with_flock(date(1), 100);
    harness
        .service
        .upsert_production_record(TEST_FLOCK, record_input(5, 3))
        .await
        .unwrap();

    let updated = harness
        .service
        .upsert_feed_entry(TEST_FLOCK, feed_input(5, 25))
        .await
        .unwrap();

    assert_eq!(updated.feed_kg, Decimal::new(25, 0));
    assert_eq!(updated.mortality, 3);
    assert_eq!(updated.eggs, EggCounts::new(30, 20, 10));
    assert_eq!(updated.notes.as_deref(), Some("routine day"));
}

// =============================================================================
// Unified → Narrow Propagation
// =============================================================================

/// A unified record write refreshes the narrow projections.
#[tokio::test]
async fn test_unified_write_propagates_to_projections() {
    let harness = TestLedger::with_flock(date(1), 100);
    harness
        .service
        .upsert_feed_entry(TEST_FLOCK, feed_input(5, 20))
        .await
        .unwrap();

    harness
        .service
        .upsert_production_record(TEST_FLOCK, record_input(5, 1))
        .await
        .unwrap();

    let egg_entry = harness
        .service
        .egg_entry(TEST_FLOCK, date(5))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(egg_entry.eggs, EggCounts::new(30, 20, 10));

    // The feed projection keeps its label but tracks the new quantity.
    let feed_entry = harness
        .service
        .feed_entry(TEST_FLOCK, date(5))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(feed_entry.feed_type, "Layer Feed");
    assert_eq!(feed_entry.quantity_kg, Decimal::new(18, 0));
}

/// Deleting a ledger row removes the narrow projections with it.
#[tokio::test]
async fn test_delete_removes_projections() {
    let harness = TestLedger::with_flock(date(1), 100);
    harness
        .service
        .upsert_egg_entry(TEST_FLOCK, egg_input(5, EggCounts::new(9, 9, 9)))
        .await
        .unwrap();
    harness
        .service
        .upsert_feed_entry(TEST_FLOCK, feed_input(5, 20))
        .await
        .unwrap();

    harness
        .service
        .delete_production_record(TEST_FLOCK, date(5))
        .await
        .unwrap();

    assert!(
        EggEntryStore::get(harness.store.as_ref(), TEST_FLOCK, date(5))
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        FeedEntryStore::get(harness.store.as_ref(), TEST_FLOCK, date(5))
            .await
            .unwrap()
            .is_none()
    );
}

// =============================================================================
// Failure Isolation
// =============================================================================

/// When the unified-ledger sync fails after an egg entry committed, the
/// entry write still succeeds and the projection row is kept.
#[tokio::test]
async fn test_egg_entry_survives_ledger_sync_failure() {
    let (harness, flaky) = TestLedger::with_flaky_ledger(date(1), 100);
    flaky.fail_commits(true);

    let record = harness
        .service
        .upsert_egg_entry(TEST_FLOCK, egg_input(5, EggCounts::new(7, 6, 5)))
        .await
        .unwrap();
    assert_eq!(record.egg_total(), 18);

    // The primary projection write landed...
    let entry = harness
        .service
        .egg_entry(TEST_FLOCK, date(5))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.eggs, EggCounts::new(7, 6, 5));

    // ...while the unified ledger was left behind (transiently inconsistent).
    assert!(
        LedgerStore::get(harness.store.as_ref(), TEST_FLOCK, date(5))
            .await
            .unwrap()
            .is_none()
    );

    // Once the store recovers, the next write converges the views again.
    flaky.fail_commits(false);
    harness
        .service
        .upsert_egg_entry(TEST_FLOCK, egg_input(5, EggCounts::new(7, 6, 5)))
        .await
        .unwrap();
    assert!(
        LedgerStore::get(harness.store.as_ref(), TEST_FLOCK, date(5))
            .await
            .unwrap()
            .is_some()
    );
}

/// Validation failures are still fatal on the narrow façades: nothing is
/// written anywhere, regardless of sync policy.
#[tokio::test]
async fn test_invalid_egg_entry_writes_nothing() {
    let harness = TestLedger::with_flock(date(1), 100);

    let err = harness
        .service
        .upsert_egg_entry(
            TEST_FLOCK,
            EggEntryInput {
                date: date(5),
                eggs: EggCounts::new(-1, 0, 0),
                broken: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        roost_ledger::LedgerError::NegativeEggCount { .. }
    ));

    assert!(
        EggEntryStore::get(harness.store.as_ref(), TEST_FLOCK, date(5))
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        LedgerStore::get(harness.store.as_ref(), TEST_FLOCK, date(5))
            .await
            .unwrap()
            .is_none()
    );
}
