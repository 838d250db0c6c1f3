//! Flock age calculation.
//!
//! Pure calendar arithmetic: no I/O, deterministic, and the only failure
//! mode is a record date earlier than the flock's start date.

use chrono::NaiveDate;

use crate::error::LedgerError;
use crate::model::FlockAge;

const DAYS_PER_WEEK: i32 = 7;

/// Compute a flock's age on `date`.
///
/// Day zero is the start date itself; weeks are whole weeks elapsed.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidAge`] when `date` precedes `start_date`.
pub fn age_on(start_date: NaiveDate, date: NaiveDate) -> Result<FlockAge, LedgerError> {
    let days = (date - start_date).num_days();
    if days < 0 {
        return Err(LedgerError::InvalidAge { date, start_date });
    }
    // NaiveDate's full range stays comfortably inside i32 days.
    let days = i32::try_from(days).unwrap_or(i32::MAX);
    Ok(FlockAge::new(days, days / DAYS_PER_WEEK))
}
