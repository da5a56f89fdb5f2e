//! # Validation Module
//!
//! Input validation and exact parsing of form fields.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Browser form                                                 │
//! │  └── number inputs, required attributes                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Raw strings from the form body                                    │
//! │  └── THIS MODULE: exact parsing + business rule validation             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / CHECK constraints                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vend_core::validation::{parse_money, validate_quantity};
//! use vend_core::Money;
//!
//! assert_eq!(parse_money("amount", "0.5").unwrap(), Money::from_cents(50));
//! assert!(validate_quantity(5).is_ok());
//! ```

use crate::denomination::Denomination;
use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest product name the catalog stores.
pub const MAX_NAME_LEN: usize = 100;

/// Longest category string the catalog stores.
pub const MAX_CATEGORY_LEN: usize = 50;

/// Highest unit price the catalog accepts.
///
/// `MAX_PRICE × MAX_ITEM_QUANTITY` stays far inside `i64` paisa.
pub const MAX_PRICE: Money = Money::from_rupees(100_000);

// =============================================================================
// Parsers
// =============================================================================

/// Parses a decimal rupee string into exact paisa.
///
/// ## Rules
/// - Optional leading `+`/`-`, digits, optional `.` and up to two digits
/// - `"20"`, `"20.0"`, `"0.5"`, `"0.50"` are all accepted
/// - No floating point is involved at any step
///
/// ## Example
/// ```rust
/// use vend_core::validation::parse_money;
///
/// assert_eq!(parse_money("price", "12.5").unwrap().cents(), 1250);
/// assert!(parse_money("price", "1.234").is_err());
/// assert!(parse_money("price", "abc").is_err());
/// ```
pub fn parse_money(field: &str, input: &str) -> ValidationResult<Money> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let (negative, unsigned) = match input.as_bytes()[0] {
        b'-' => (true, &input[1..]),
        b'+' => (false, &input[1..]),
        _ => (false, input),
    };

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (unsigned, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("must be a number"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid("must be a number"));
    }
    if fraction.len() > 2 {
        return Err(invalid("at most two decimal places"));
    }

    let rupees: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("amount is too large"))?
    };
    let paisa: i64 = match fraction.len() {
        0 => 0,
        1 => i64::from(fraction.as_bytes()[0] - b'0') * 10,
        _ => fraction.parse().map_err(|_| invalid("must be a number"))?,
    };

    let cents = rupees
        .checked_mul(100)
        .and_then(|c| c.checked_add(paisa))
        .ok_or_else(|| invalid("amount is too large"))?;

    Ok(Money::from_cents(if negative { -cents } else { cents }))
}

/// Parses a whole number field.
pub fn parse_integer(field: &str, input: &str) -> ValidationResult<i64> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    input.parse().map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a whole number".to_string(),
    })
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 100 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates and normalizes a category (trimmed, lower-case).
///
/// Categories are open strings, but must be short and printable.
///
/// ## Example
/// ```rust
/// use vend_core::validation::normalize_category;
///
/// assert_eq!(normalize_category(" Drink ").unwrap(), "drink");
/// assert!(normalize_category("").is_err());
/// ```
pub fn normalize_category(category: &str) -> ValidationResult<String> {
    let category = category.trim();

    if category.is_empty() {
        return Err(ValidationError::Required {
            field: "type".to_string(),
        });
    }

    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(ValidationError::TooLong {
            field: "type".to_string(),
            max: MAX_CATEGORY_LEN,
        });
    }

    if !category
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "type".to_string(),
            reason: "must contain only letters, numbers, spaces, hyphens, and underscores"
                .to_string(),
        });
    }

    Ok(category.to_lowercase())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a purchase quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock level set by the administrator.
///
/// ## Rules
/// - Zero is allowed (sold out)
/// - Negative is never allowed
pub fn validate_stock_level(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a product price.
///
/// ## Rules
/// - Must be positive and at most [`MAX_PRICE`]
/// - Must be a multiple of the smallest coin, so any balance left after a
///   purchase can be paid out exactly
///
/// ## Example
/// ```rust
/// use vend_core::validation::validate_price;
/// use vend_core::Money;
///
/// assert!(validate_price(Money::from_cents(1550)).is_ok());
/// assert!(validate_price(Money::from_cents(1299)).is_err());
/// assert!(validate_price(Money::zero()).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    if price > MAX_PRICE {
        return Err(ValidationError::TooLarge {
            field: "price".to_string(),
            max: MAX_PRICE,
        });
    }

    let step = Denomination::SMALLEST.value();
    if price.cents() % step.cents() != 0 {
        return Err(ValidationError::NotMultipleOf {
            field: "price".to_string(),
            step,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
