//! Pre-commit invariant checks for ledger writes.
//!
//! Every façade funnels its candidate row through [`check_row`] before
//! anything is persisted. Checks run in a fixed order and the first
//! violation short-circuits.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::age;
use crate::error::LedgerError;
use crate::model::{EggCounts, Flock};

/// Everything the gate needs to know about a candidate row write.
pub(crate) struct RowChecks<'a> {
    pub flock: &'a Flock,
    pub date: NaiveDate,
    pub head_count_start: i32,
    pub mortality: i32,
    pub eggs: EggCounts,
    pub broken: Option<i32>,
    pub feed_kg: Decimal,
    /// Age was supplied manually or is already established on the stored
    /// row; skip the calendar check.
    pub age_established: bool,
}

/// Run the pre-commit checks in order: mortality bounds, age sign, egg
/// counts, feed quantity.
///
/// # Errors
///
/// Returns the first violated invariant as a typed [`LedgerError`].
pub(crate) fn check_row(checks: &RowChecks<'_>) -> Result<(), LedgerError> {
    if checks.mortality < 0 || checks.mortality > checks.head_count_start {
        return Err(LedgerError::MortalityOutOfRange {
            mortality: checks.mortality,
            available: checks.head_count_start,
        });
    }
    if !checks.age_established {
        age::age_on(checks.flock.start_date, checks.date)?;
    }
    check_eggs(checks.eggs)?;
    if let Some(broken) = checks.broken
        && broken < 0
    {
        return Err(LedgerError::NegativeEggCount {
            slot: "broken",
            count: broken,
        });
    }
    if checks.feed_kg < Decimal::ZERO {
        return Err(LedgerError::NegativeFeedQuantity {
            quantity_kg: checks.feed_kg,
        });
    }
    Ok(())
}

/// Reject negative counts in any collection slot.
pub(crate) fn check_eggs(eggs: EggCounts) -> Result<(), LedgerError> {
    let slots = [
        ("morning", eggs.morning),
        ("midday", eggs.midday),
        ("evening", eggs.evening),
    ];
    for (slot, count) in slots {
        if count < 0 {
            return Err(LedgerError::NegativeEggCount { slot, count });
        }
    }
    Ok(())
}
