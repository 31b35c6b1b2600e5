//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tally                                  │
//! │                                                                         │
//! │  Handler: Result<T, ApiError>                                          │
//! │       │                                                                 │
//! │       ├── bad JSON / bad path ─── JsonRejection ──────────┐            │
//! │       ├── ValidationError / CoreError ────────────────────┤            │
//! │       ├── DbError::NotFound / UniqueViolation ────────────┤            │
//! │       └── any other DbError ── error!(detail) ────────────┤            │
//! │                                                           ▼            │
//! │                                                       ApiError          │
//! │                                                           │            │
//! │                                    status from code + JSON body         │
//! │                                                                         │
//! │  { "code": "NOT_FOUND", "message": "Product not found: Z" }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal failures never leak their detail to the caller: the cause is
//! logged and the body carries a generic message.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tally_core::{CoreError, ValidationError};
use tally_db::DbError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Error returned from HTTP handlers.
///
/// ## Serialization
/// This is what the client receives when a request fails:
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "items must be a list of product codes"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Resource not found (404)
    NotFound,

    /// Duplicate code or discount quantity (409)
    Conflict,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    /// Creates an internal error with the generic message.
    pub fn internal() -> Self {
        ApiError::new(ErrorCode::Internal, INTERNAL_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::conflict(format!("{} '{}' already exists", field, value))
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ApiError::internal()
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AmountOverflow { .. } => {
                // Only reachable with catalog rows that bypassed validation
                tracing::error!(error = %err, "Pricing overflowed");
                ApiError::internal()
            }
            CoreError::DuplicateDiscountQuantity { .. } => ApiError::conflict(err.to_string()),
            CoreError::BasketTooLarge { .. } => ApiError::validation(err.to_string()),
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

/// Converts validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Malformed or mistyped JSON bodies are client errors.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(format!("Invalid path: {}", rejection.body_text()))
    }
}

/// Result type for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_response_shape() {
        let (status, body) = body_json(ApiError::not_found("Product", "Z")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "Product not found: Z");
    }

    #[test]
    fn test_db_error_mapping() {
        assert_eq!(
            ApiError::from(DbError::not_found("Product", "Z")).status(),
            StatusCode::NOT_FOUND
        );

        let err = ApiError::from(DbError::duplicate("code", "A"));
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "code 'A' already exists");

        let err = ApiError::from(DbError::QueryFailed("no such table: products".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, INTERNAL_MESSAGE);
    }

    #[test]
    fn test_core_error_mapping() {
        let err = ApiError::from(CoreError::DuplicateDiscountQuantity {
            code: "A".to_string(),
            quantity: 3,
        });
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err = ApiError::from(CoreError::BasketTooLarge { max: 10_000 });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(CoreError::AmountOverflow {
            code: "A".to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, INTERNAL_MESSAGE);

        let err = ApiError::from(CoreError::Validation(ValidationError::WrongType {
            field: "items".to_string(),
            expected: "a list of product codes".to_string(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "items must be a list of product codes");
    }
}
