/// Error handling for the API server
///
/// One unified error type maps every failure to an HTTP response in the
/// service's `{ message, data }` envelope. Handlers return
/// `Result<T, ApiError>`; conversions from the shared crate's store and
/// integrity errors keep `?` working throughout.
///
/// Status mapping:
///
/// | Variant                   | Status |
/// |---------------------------|--------|
/// | `Validation`              | 400    |
/// | `InvalidId`               | 400    |
/// | `DuplicateEmail`          | 400    |
/// | `AssignmentTargetNotFound`| 400    |
/// | `NotFound`                | 404    |
/// | `Store`                   | 500    |
///
/// Store failures are logged with their detail and answered with a generic
/// message; internals are never leaked to clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use taskboard_shared::integrity::IntegrityError;
use taskboard_shared::store::query::QueryError;
use taskboard_shared::store::StoreError;

use crate::response::Envelope;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Required fields missing or malformed query parameters (400)
    #[error("{0}")]
    Validation(String),

    /// Malformed document id in the request path (400)
    #[error("{0}")]
    InvalidId(String),

    /// Resource does not exist (404)
    #[error("{0}")]
    NotFound(String),

    /// Email already used by another user (400)
    #[error("Email already exists")]
    DuplicateEmail,

    /// Referenced assignee does not exist (400)
    #[error("Assigned user not found")]
    AssignmentTargetNotFound,

    /// Unexpected backend failure (500)
    #[error("Server error")]
    Store(#[source] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InvalidId(_)
            | ApiError::DuplicateEmail
            | ApiError::AssignmentTargetNotFound => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Store(ref source) = self {
            // Log the detail, answer with the generic message
            tracing::error!(error = %source, "store operation failed");
        }

        let status = self.status();
        let body = Json(Envelope::new(self.to_string(), Value::Null));
        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            // the store's unique index on email is the same conflict the
            // handlers pre-check for
            StoreError::UniqueViolation("email") => ApiError::DuplicateEmail,
            other => ApiError::Store(other),
        }
    }
}

impl From<IntegrityError> for ApiError {
    fn from(err: IntegrityError) -> Self {
        match err {
            IntegrityError::TargetNotFound(_) => ApiError::AssignmentTargetNotFound,
            IntegrityError::Store(err) => err.into(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Store(StoreError::Encoding(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("Name and email are required".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidId("Invalid user ID".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("User not found".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::AssignmentTargetNotFound.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_email_unique_violation_becomes_duplicate_email() {
        let err: ApiError = StoreError::UniqueViolation("email").into();
        assert!(matches!(err, ApiError::DuplicateEmail));
    }

    #[test]
    fn test_integrity_target_not_found_maps_to_400_variant() {
        let err: ApiError = IntegrityError::TargetNotFound(uuid::Uuid::new_v4()).into();
        assert!(matches!(err, ApiError::AssignmentTargetNotFound));
        assert_eq!(err.to_string(), "Assigned user not found");
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::NotFound("Task not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
