//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Request conflicts with current state (overlap, illegal transition)
    Conflict(ApiError),
    /// Internal server error
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Conflict(error) => (StatusCode::CONFLICT, error),
            AppError::Internal(msg) => {
                // Internal detail stays in the log, not in the response.
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("INTERNAL_ERROR", "Internal server error"),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(msg) => AppError::BadRequest(msg),
            LedgerError::NotFound(msg) => AppError::NotFound(msg),
            LedgerError::ServiceUnavailable(msg) => {
                AppError::Conflict(ApiError::new("SERVICE_UNAVAILABLE", msg))
            }
            LedgerError::SlotConflict { conflicting } => AppError::Conflict(
                ApiError::new(
                    "SLOT_CONFLICT",
                    "Requested window overlaps an existing reservation",
                )
                .with_details(conflicting.to_string()),
            ),
            LedgerError::InvalidStateTransition { state, action } => AppError::Conflict(
                ApiError::new(
                    "INVALID_STATE",
                    format!("Cannot {} a {} reservation", action, state),
                ),
            ),
            LedgerError::Busy => AppError::Conflict(ApiError::new(
                "BUSY",
                "Provider is busy handling another booking; retry later",
            )),
            LedgerError::Repository(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<crate::db::repository::RepositoryError> for AppError {
    fn from(err: crate::db::repository::RepositoryError) -> Self {
        if err.is_not_found() {
            AppError::NotFound(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ReservationId, ReservationState};

    #[test]
    fn test_slot_conflict_maps_to_conflict() {
        let id = ReservationId::generate();
        let err = AppError::from(LedgerError::SlotConflict { conflicting: id });
        match err {
            AppError::Conflict(api) => {
                assert_eq!(api.code, "SLOT_CONFLICT");
                assert_eq!(api.details.as_deref(), Some(id.to_string().as_str()));
            }
            other => panic!("unexpected mapping: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_transition_maps_to_conflict() {
        let err = AppError::from(LedgerError::InvalidStateTransition {
            state: ReservationState::Cancelled,
            action: "confirm",
        });
        assert!(matches!(err, AppError::Conflict(ref api) if api.code == "INVALID_STATE"));
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let err = AppError::from(LedgerError::NotFound("nope".into()));
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
