//! Uniform error-to-response mapping for all handlers.
//!
//! Handlers return `Result<_, ApiError>`; the HTTP status is decided here and
//! nowhere else.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use super::types::MessageResponse;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("User already exists")]
    Conflict,
    #[error("Invalid email or password")]
    AuthFailure,
    #[error("Not authorized, no valid session")]
    Unauthenticated,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("User not found")]
    NotFound,
    #[error("Invalid user data: {0}")]
    Persistence(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    /// Map a store failure that happened while writing (create/save).
    ///
    /// Backend failures surface as 400 with the driver message attached.
    pub(crate) fn persistence(err: StoreError) -> Self {
        match err {
            StoreError::Backend(message) => Self::Persistence(message),
            other => Self::from(other),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict | Self::Persistence(_) => StatusCode::BAD_REQUEST,
            Self::AuthFailure | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Read-path mapping: backend failures are internal errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(message) => Self::Validation(message.to_string()),
            StoreError::Conflict => Self::Conflict,
            StoreError::NotFound => Self::NotFound,
            StoreError::Backend(message) => Self::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(detail) => {
                error!("Failed to handle user request: {detail}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(MessageResponse { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::validation("x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Conflict.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::AuthFailure.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Forbidden("Cannot delete admin user").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::internal("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn persistence_keeps_backend_message_on_writes() {
        let err = ApiError::persistence(StoreError::Backend("connection reset".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid user data: connection reset");

        let err = ApiError::persistence(StoreError::Conflict);
        assert!(matches!(err, ApiError::Conflict));
    }

    #[test]
    fn backend_failure_on_reads_is_internal() {
        let err = ApiError::from(StoreError::Backend("timeout".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
