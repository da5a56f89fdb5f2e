//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Server                             │
//! │                                                                         │
//! │  Handler: Result<T, ApiError>                                          │
//! │         │                                                               │
//! │         ├── CoreError (ledger rule) ──┐                                 │
//! │         │                             ▼                                 │
//! │         ├── DbError (storage) ─────► ApiError { code, message }        │
//! │         │                             │                                 │
//! │         │                             ▼                                 │
//! │         │             JSON routes:  400/500 + {"error": message}        │
//! │         │             Admin routes: flash message + 303 to /admin       │
//! │         ▼                                                               │
//! │  Success ─────────────────────────────────────────────────────────────► │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Customer-facing messages are the machine's own wording, e.g.
//! `Insufficient quantity. Only 3 available`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use ts_rs::TS;
use vend_core::CoreError;
use vend_db::DbError;

/// Shown for every purchase form that doesn't parse.
pub const INVALID_PURCHASE_INPUT: &str = "Please enter valid product ID and quantity";

/// Shown for an unknown product id.
pub const INVALID_PRODUCT_ID: &str = "Invalid product ID";

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// {
///   "error": "Insufficient funds. Required: Rs 30.00",
///   "code": "INSUFFICIENT_FUNDS"
/// }
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    #[serde(rename = "error")]
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown product (400)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Not an accepted note or coin (400)
    InvalidDenomination,

    /// Insufficient stock (400)
    InsufficientStock,

    /// Balance doesn't cover the purchase (400)
    InsufficientFunds,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound
            | ErrorCode::ValidationError
            | ErrorCode::InvalidDenomination
            | ErrorCode::InsufficientStock
            | ErrorCode::InsufficientFunds => StatusCode::BAD_REQUEST,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
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

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Same message whether the ledger check or the guarded UPDATE caught it.
    pub fn insufficient_stock(available: i64) -> Self {
        ApiError::new(
            ErrorCode::InsufficientStock,
            format!("Insufficient quantity. Only {} available", available),
        )
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
            }
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::InsufficientStock { available, .. } => ApiError::insufficient_stock(available),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Serialization(e) => {
                tracing::error!("Stored breakdown unreadable: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(_) => ApiError::new(ErrorCode::NotFound, INVALID_PRODUCT_ID),
            CoreError::InsufficientStock { available, .. } => {
                ApiError::insufficient_stock(available)
            }
            CoreError::InsufficientFunds { required, .. } => ApiError::new(
                ErrorCode::InsufficientFunds,
                format!("Insufficient funds. Required: {}", required),
            ),
            CoreError::InvalidDenomination(amount) => ApiError::new(
                ErrorCode::InvalidDenomination,
                format!("{} is not an accepted note or coin", amount),
            ),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use vend_core::Money;

    #[test]
    fn test_core_errors_use_machine_wording() {
        let err: ApiError = CoreError::InsufficientStock {
            product: "m&m".to_string(),
            available: 3,
            requested: 5,
        }
        .into();
        assert_eq!(err.message, "Insufficient quantity. Only 3 available");
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = CoreError::InsufficientFunds {
            required: Money::from_rupees(30),
            available: Money::from_rupees(20),
        }
        .into();
        assert_eq!(err.message, "Insufficient funds. Required: Rs 30.00");

        let err: ApiError = CoreError::ProductNotFound(42).into();
        assert_eq!(err.message, INVALID_PRODUCT_ID);
    }

    #[test]
    fn test_db_errors_hide_details() {
        let err: ApiError = DbError::QueryFailed("near SELECT: syntax error".to_string()).into();

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");
        assert_eq!(err.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_json_shape() {
        let err = ApiError::validation("amount is required");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["error"], "amount is required");
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }
}
