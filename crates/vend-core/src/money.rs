//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Greedy change with floats:                                             │
//! │    0.30 - 0.25 = 0.04999999999999999  → the 0.05 coin is skipped! ❌    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paisa                                            │
//! │    30 paisa - 25 paisa = 5 paisa  → exactly one 0.05 coin ✅            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vend_core::money::Money;
//!
//! // Create from paisa (preferred)
//! let price = Money::from_cents(1550); // Rs 15.50
//!
//! // Or from whole rupees
//! let note = Money::from_rupees(50);
//!
//! let total = price + note;
//! assert_eq!(total.cents(), 6550);
//! assert_eq!(total.to_string(), "Rs 65.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (paisa).
///
/// ## Design Decisions
/// - **i64 (signed)**: differences such as "balance minus cost" may go
///   negative before they are checked
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for session storage
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Denomination.value() ──► SessionState.inserted_money                   │
/// │                                     │                                   │
/// │  Product.price() × qty ──► PurchaseLine.line_total ──► balance -= cost  │
/// │                                     │                                   │
/// │                                     ▼                                   │
/// │                            make_change(balance)                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paisa (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use vend_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Rs 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the value in paisa.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    ///
    /// ## Example
    /// ```rust
    /// use vend_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).rupees(), 10);
    /// assert_eq!(Money::from_cents(-550).rupees(), -5);
    /// ```
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paisa portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value as fractional rupees.
    ///
    /// ## Note
    /// Display/JSON edge only. Never feed the result back into arithmetic.
    #[inline]
    pub fn as_rupees_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// Returns `None` when the product doesn't fit in an `i64`.
    ///
    /// ## Example
    /// ```rust
    /// use vend_core::money::Money;
    ///
    /// let unit_price = Money::from_rupees(15);
    /// assert_eq!(unit_price.multiply_quantity(3), Some(Money::from_rupees(45)));
    /// assert_eq!(Money::from_cents(i64::MAX).multiply_quantity(2), None);
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// How many whole `unit`s fit into this amount, and what is left over.
    ///
    /// This is the single step of the greedy change algorithm.
    ///
    /// ## Example
    /// ```rust
    /// use vend_core::money::Money;
    ///
    /// let (count, rest) = Money::from_rupees(55).split_by(Money::from_rupees(50));
    /// assert_eq!(count, 1);
    /// assert_eq!(rest, Money::from_rupees(5));
    /// ```
    #[inline]
    pub const fn split_by(&self, unit: Money) -> (i64, Money) {
        (self.0 / unit.0, Money(self.0 % unit.0))
    }

    /// Formats the amount without the currency prefix: `12.50`.
    pub fn decimal(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.rupees().abs(), self.cents_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money the way the machine's display does: `Rs 12.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}Rs {}.{:02}",
            sign,
            self.rupees().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_rupees() {
        assert_eq!(Money::from_rupees(50).cents(), 5000);
        assert_eq!(Money::from_rupees(0), Money::zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "Rs 10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "Rs 5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-Rs 5.50");
        assert_eq!(format!("{}", Money::from_cents(5)), "Rs 0.05");
        assert_eq!(Money::from_cents(5550).decimal(), "55.50");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_split_by() {
        let (count, rest) = Money::from_cents(30).split_by(Money::from_cents(25));
        assert_eq!(count, 1);
        assert_eq!(rest, Money::from_cents(5));

        let (count, rest) = Money::from_cents(4).split_by(Money::from_cents(5));
        assert_eq!(count, 0);
        assert_eq!(rest, Money::from_cents(4));
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert!((Money::from_cents(5550).as_rupees_f64() - 55.5).abs() < f64::EPSILON);
    }
}
