use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::StoreError;

/// Why a swipe request was rejected before touching storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    MissingFields,
    InvalidAction,
    CannotSwipeSelf,
}

impl InvalidReason {
    pub fn code(&self) -> &'static str {
        match self {
            InvalidReason::MissingFields => "missing_fields",
            InvalidReason::InvalidAction => "invalid_action",
            InvalidReason::CannotSwipeSelf => "cannot_swipe_self",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            InvalidReason::MissingFields => "target_user_id and action are required",
            InvalidReason::InvalidAction => "action must be one of: like, pass",
            InvalidReason::CannotSwipeSelf => "cannot swipe self",
        };
        f.write_str(message)
    }
}

/// Errors surfaced by the swipe engine
#[derive(Debug, Error)]
pub enum SwipeError {
    #[error("Invalid request: {0}")]
    InvalidRequest(InvalidReason),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Transaction failed: {0}")]
    TransactionFailure(String),
}

impl SwipeError {
    pub fn code(&self) -> &'static str {
        match self {
            SwipeError::InvalidRequest(reason) => reason.code(),
            SwipeError::StorageUnavailable(_) => "storage_unavailable",
            SwipeError::TransactionFailure(_) => "transaction_failure",
        }
    }

    /// Storage failures leave nothing behind, so the identical request can be sent again
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SwipeError::InvalidRequest(_))
    }
}

impl From<InvalidReason> for SwipeError {
    fn from(reason: InvalidReason) -> Self {
        SwipeError::InvalidRequest(reason)
    }
}

impl From<StoreError> for SwipeError {
    fn from(err: StoreError) -> Self {
        if err.is_unavailable() {
            SwipeError::StorageUnavailable(err.to_string())
        } else {
            SwipeError::TransactionFailure(err.to_string())
        }
    }
}

impl ResponseError for SwipeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SwipeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SwipeError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SwipeError::TransactionFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Storage details stay in the logs
        let message = match self {
            SwipeError::InvalidRequest(reason) => reason.to_string(),
            SwipeError::StorageUnavailable(_) => "storage is temporarily unavailable, retry later".to_string(),
            SwipeError::TransactionFailure(_) => "swipe was not recorded, retry later".to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.code(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SwipeError::from(InvalidReason::CannotSwipeSelf).code(), "cannot_swipe_self");
        assert_eq!(SwipeError::StorageUnavailable("down".into()).code(), "storage_unavailable");
        assert_eq!(SwipeError::TransactionFailure("boom".into()).code(), "transaction_failure");
    }

    #[test]
    fn test_store_error_classification() {
        let err: SwipeError = StoreError::Sqlx(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, SwipeError::StorageUnavailable(_)));

        let err: SwipeError = StoreError::Sqlx(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, SwipeError::TransactionFailure(_)));
    }

    #[test]
    fn test_retryable() {
        assert!(!SwipeError::from(InvalidReason::MissingFields).is_retryable());
        assert!(SwipeError::StorageUnavailable("x".into()).is_retryable());
        assert!(SwipeError::TransactionFailure("x".into()).is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(SwipeError::from(InvalidReason::InvalidAction).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(SwipeError::StorageUnavailable("x".into()).status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
