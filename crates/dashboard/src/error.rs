//! Unified error handling for the dashboard.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use roost_ledger::LedgerError;

use crate::db::RepositoryError;

/// Application-level error type for the dashboard.
#[derive(Debug, Error)]
pub enum AppError {
    /// Production ledger operation failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Ledger(err) => match err {
                LedgerError::InvalidAge { .. }
                | LedgerError::MortalityOutOfRange { .. }
                | LedgerError::NegativeEggCount { .. }
                | LedgerError::NegativeFeedQuantity { .. }
                | LedgerError::CascadeViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                LedgerError::FlockNotFound(_) | LedgerError::RecordNotFound { .. } => {
                    StatusCode::NOT_FOUND
                }
                LedgerError::SyncPropagationFailed { .. } | LedgerError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Dashboard request error"
            );
        }

        // Don't expose internal error details to clients; validation and
        // not-found messages are surfaced verbatim so the UI can show them.
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            match &self {
                Self::Ledger(err) => err.to_string(),
                other => other.to_string(),
            }
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use roost_core::FlockId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_validation_failures_are_unprocessable() {
        assert_eq!(
            get_status(AppError::Ledger(LedgerError::MortalityOutOfRange {
                mortality: 12,
                available: 9
            })),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        let date = NaiveDate::from_ymd_opt(2026, 4, 2).expect("valid date");
        assert_eq!(
            get_status(AppError::Ledger(LedgerError::CascadeViolation { date })),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_missing_entities_are_not_found() {
        assert_eq!(
            get_status(AppError::Ledger(LedgerError::FlockNotFound(FlockId::new(
                3
            )))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::NotFound("egg entry".to_string())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_mortality_message_surfaced_verbatim() {
        let err = AppError::Ledger(LedgerError::MortalityOutOfRange {
            mortality: 12,
            available: 9,
        });
        assert_eq!(
            err.to_string(),
            "Ledger error: mortality (12) exceeds birds remaining (9) as of the prior record"
        );
    }

    #[test]
    fn test_bad_request_status() {
        assert_eq!(
            get_status(AppError::BadRequest("invalid input".to_string())),
            StatusCode::BAD_REQUEST
        );
    }
}
