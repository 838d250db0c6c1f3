//! Typed failure taxonomy for ledger operations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use roost_core::FlockId;

/// Errors from the storage backends behind the ledger's store traits.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store failed (connection, transaction, constraint).
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl StoreError {
    /// Wrap an arbitrary backend error.
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Errors surfaced by the ledger façades.
///
/// Everything except [`LedgerError::SyncPropagationFailed`] is fatal to the
/// write in progress and is raised before any row is persisted.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Record date precedes the flock's start date.
    #[error("record date {date} precedes flock start date {start_date}")]
    InvalidAge {
        /// The offending record date.
        date: NaiveDate,
        /// The flock's start date.
        start_date: NaiveDate,
    },

    /// Mortality is negative or exceeds the birds available that day.
    #[error("mortality ({mortality}) exceeds birds remaining ({available}) as of the prior record")]
    MortalityOutOfRange {
        /// The submitted mortality.
        mortality: i32,
        /// Birds available at the start of that day.
        available: i32,
    },

    /// An egg count is negative.
    #[error("egg count for {slot} is negative ({count})")]
    NegativeEggCount {
        /// Which collection slot was negative.
        slot: &'static str,
        /// The offending count.
        count: i32,
    },

    /// Feed quantity is negative.
    #[error("feed quantity ({quantity_kg} kg) is negative")]
    NegativeFeedQuantity {
        /// The offending quantity.
        quantity_kg: Decimal,
    },

    /// Recomputing later rows would drive a remainder below zero.
    /// Nothing is changed, including the edit that triggered the cascade.
    #[error("edit would drive birds remaining below zero on {date}")]
    CascadeViolation {
        /// First downstream date that would go negative.
        date: NaiveDate,
    },

    /// The flock is unknown to the registry.
    #[error("flock {0} not found")]
    FlockNotFound(FlockId),

    /// No ledger row exists for the given flock and date.
    #[error("no production record for flock {flock_id} on {date}")]
    RecordNotFound {
        /// Flock the lookup targeted.
        flock_id: FlockId,
        /// Date the lookup targeted.
        date: NaiveDate,
    },

    /// Propagation into a sibling projection failed after the primary
    /// write committed. Never fatal: the service logs it and reports the
    /// primary write as successful.
    #[error("failed to propagate write into the {target}: {source}")]
    SyncPropagationFailed {
        /// Which projection the propagation targeted.
        target: &'static str,
        /// The underlying store failure.
        #[source]
        source: StoreError,
    },

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mortality_message_carries_numbers() {
        let err = LedgerError::MortalityOutOfRange {
            mortality: 12,
            available: 9,
        };
        assert_eq!(
            err.to_string(),
            "mortality (12) exceeds birds remaining (9) as of the prior record"
        );
    }

    #[test]
    fn test_cascade_violation_names_date() {
        let date = NaiveDate::from_ymd_opt(2026, 4, 2).expect("valid date");
        let err = LedgerError::CascadeViolation { date };
        assert!(err.to_string().contains("2026-04-02"));
    }

    #[test]
    fn test_flock_not_found_display() {
        let err = LedgerError::FlockNotFound(FlockId::new(9));
        assert_eq!(err.to_string(), "flock 9 not found");
    }
}
