//! # Error Types
//!
//! Domain-specific error types for vend-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vend-core errors (this file)                                          │
//! │  ├── CoreError        - Ledger rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vend-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  vend-server errors (in app)                                           │
//! │  └── ApiError         - What the browser sees (JSON / flash)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Browser                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger rule violations.
///
/// Every variant leaves the session ledger untouched: operations return the
/// error before producing a new state.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id doesn't exist in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Asked for more units than the machine holds.
    ///
    /// ## User Workflow
    /// ```text
    /// Purchase (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "sando", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Insufficient quantity. Only 3 available"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Balance doesn't cover price × quantity.
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Money, available: Money },

    /// Inserted amount is not a note or coin the machine accepts.
    #[error("{0} is not an accepted note or coin")]
    InvalidDenomination(Money),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when form input doesn't meet requirements.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Amount above the machine's ceiling.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: Money },

    /// Amount can't be paid out with the machine's coins.
    #[error("{field} must be a multiple of {step}")]
    NotMultipleOf { field: String, step: Money },

    /// Invalid format (e.g., non-numeric input).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "sando".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for sando: available 3, requested 5"
        );

        let err = CoreError::InsufficientFunds {
            required: Money::from_rupees(30),
            available: Money::from_rupees(20),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: required Rs 30.00, available Rs 20.00"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::NotMultipleOf {
            field: "price".to_string(),
            step: Money::from_cents(5),
        };
        assert_eq!(err.to_string(), "price must be a multiple of Rs 0.05");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
