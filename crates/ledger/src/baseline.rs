//! Running head-count baseline resolution and forward recomputation.

use chrono::NaiveDate;

use crate::error::{LedgerError, StoreError};
use crate::model::{Flock, ProductionRecord};
use crate::store::LedgerStore;

/// Head-count a (flock, date) starts from: the nearest earlier row's
/// remainder, or the flock's initial count when no earlier row exists.
///
/// # Errors
///
/// Returns [`StoreError`] if the nearest-prior lookup fails.
pub(crate) async fn resolve_baseline(
    store: &dyn LedgerStore,
    flock: &Flock,
    date: NaiveDate,
) -> Result<i32, StoreError> {
    Ok(store
        .nearest_before(flock.id, date)
        .await?
        .map_or(flock.initial_head_count, |row| row.head_count_remaining))
}

/// Plan the forward recomputation that follows an edit or delete.
///
/// `later_rows` must be the flock's rows strictly after the pivot date,
/// ascending. `carried_remaining` is the remainder flowing out of the
/// pivot (the edited row's remainder, or the pre-pivot baseline after a
/// delete). Returns only the rows whose values change; the walk stops at
/// the first row whose stored start count already equals the carried
/// remainder, since from there the chain is provably unchanged.
///
/// # Errors
///
/// Returns [`LedgerError::CascadeViolation`] naming the first date whose
/// remainder would go negative. Nothing is mutated here either way;
/// callers commit the returned batch atomically or not at all.
pub(crate) fn plan_forward(
    mut carried_remaining: i32,
    later_rows: &[ProductionRecord],
) -> Result<Vec<ProductionRecord>, LedgerError> {
    let mut changed = Vec::new();
    for row in later_rows {
        if row.head_count_start == carried_remaining {
            break;
        }
        if row.mortality > carried_remaining {
            return Err(LedgerError::CascadeViolation { date: row.date });
        }
        let mut updated = row.clone();
        updated.head_count_start = carried_remaining;
        updated.head_count_remaining = carried_remaining - row.mortality;
        carried_remaining = updated.head_count_remaining;
        changed.push(updated);
    }
    Ok(changed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use roost_core::FlockId;

    use super::*;
    use crate::model::{EggCounts, FlockAge};
    use crate::store::LedgerStore as _;
    use crate::store::memory::MemoryStore;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn flock() -> Flock {
        Flock {
            id: FlockId::new(1),
            name: "Barn 1".to_string(),
            start_date: date(1),
            initial_head_count: 100,
        }
    }

    fn row(d: u32, start: i32, mortality: i32) -> ProductionRecord {
        ProductionRecord {
            flock_id: FlockId::new(1),
            date: date(d),
            age: FlockAge::new(i32::try_from(d).unwrap() - 1, 0),
            head_count_start: start,
            mortality,
            head_count_remaining: start - mortality,
            feed_kg: Decimal::ZERO,
            eggs: EggCounts::default(),
            medication: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_baseline_defaults_to_initial_count() {
        let store = MemoryStore::new();
        let baseline = resolve_baseline(&store, &flock(), date(5)).await.unwrap();
        assert_eq!(baseline, 100);
    }

    #[tokio::test]
    async fn test_baseline_uses_nearest_prior_remainder() {
        let store = MemoryStore::new();
        store.upsert(&row(2, 100, 5)).await.unwrap();
        store.upsert(&row(4, 95, 3)).await.unwrap();

        let baseline = resolve_baseline(&store, &flock(), date(9)).await.unwrap();
        assert_eq!(baseline, 92);

        // A row on the target date itself must not count as "prior".
        let baseline = resolve_baseline(&store, &flock(), date(4)).await.unwrap();
        assert_eq!(baseline, 95);
    }

    #[test]
    fn test_plan_forward_rechains_every_later_row() {
        let later = vec![row(2, 95, 3), row(3, 92, 2)];
        let changed = plan_forward(90, &later).unwrap();
        assert_eq!(changed.len(), 2);
        assert_eq!(changed[0].head_count_start, 90);
        assert_eq!(changed[0].head_count_remaining, 87);
        assert_eq!(changed[1].head_count_start, 87);
        assert_eq!(changed[1].head_count_remaining, 85);
    }

    #[test]
    fn test_plan_forward_stops_when_chain_relinks() {
        // First row already starts from the carried remainder, so nothing
        // downstream can change.
        let later = vec![row(2, 95, 3), row(3, 92, 2)];
        let changed = plan_forward(95, &later).unwrap();
        assert!(changed.is_empty());
    }

    #[test]
    fn test_plan_forward_rejects_negative_remainder() {
        let later = vec![row(2, 95, 3), row(3, 92, 90)];
        let err = plan_forward(90, &later).unwrap_err();
        match err {
            LedgerError::CascadeViolation { date: d } => assert_eq!(d, date(3)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_plan_forward_empty_input() {
        assert!(plan_forward(50, &[]).unwrap().is_empty());
    }
}
