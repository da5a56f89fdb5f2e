//! # Change Calculator
//!
//! Greedy breakdown of an amount into notes and coins.
//!
//! ## Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  make_change(Rs 55.75)                                                  │
//! │                                                                         │
//! │  remaining = 5575 paisa                                                 │
//! │    Rs 100  → 0          (skip)                                          │
//! │    Rs 50   → 1  ✓       remaining = 575                                 │
//! │    Rs 25   → 0          (skip)                                          │
//! │    Rs 20   → 0          (skip)                                          │
//! │    Rs 10   → 0          (skip)                                          │
//! │    Rs 5    → 1  ✓       remaining = 75                                  │
//! │    Rs 1    → 0          (skip)                                          │
//! │    Rs 0.50 → 1  ✓       remaining = 25                                  │
//! │    Rs 0.25 → 1  ✓       remaining = 0                                   │
//! │    ...                                                                  │
//! │                                                                         │
//! │  Result: {50: 1, 5: 1, 0.50: 1, 0.25: 1}                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Greedy is optimal here only because the denomination set is canonical.
//! All arithmetic is integer paisa, so there is no rounding step.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::denomination::{Denomination, DenominationCounts};
use crate::money::Money;

/// Result of breaking an amount into denominations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChangeBreakdown {
    /// Pieces to dispense, largest first. Zero counts are omitted.
    pub counts: DenominationCounts,

    /// Amount that no denomination could cover.
    ///
    /// Always zero for multiples of the smallest coin.
    pub remainder: Money,
}

impl ChangeBreakdown {
    /// Value actually dispensed (excludes the remainder).
    pub fn total(&self) -> Money {
        self.counts.total()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Whether the whole amount was dispensed.
    pub fn is_exact(&self) -> bool {
        self.remainder.is_zero()
    }

    pub fn notes(&self) -> DenominationCounts {
        self.counts.notes()
    }

    pub fn coins(&self) -> DenominationCounts {
        self.counts.coins()
    }

    /// Human-readable breakdown shown to the customer.
    ///
    /// ```text
    /// Change breakdown:
    /// Notes: Rs 50: 1 note(s), Rs 5: 1 note(s)
    /// Coins: Rs 0.50: 1 coin(s)
    /// ```
    pub fn message(&self) -> String {
        let mut message = String::from("Change breakdown:\n");

        let notes: Vec<String> = self
            .notes()
            .iter()
            .map(|(d, c)| format!("{}: {} note(s)", d, c))
            .collect();
        let coins: Vec<String> = self
            .coins()
            .iter()
            .map(|(d, c)| format!("{}: {} coin(s)", d, c))
            .collect();

        if !notes.is_empty() {
            message.push_str("Notes: ");
            message.push_str(&notes.join(", "));
            message.push('\n');
        }
        if !coins.is_empty() {
            message.push_str("Coins: ");
            message.push_str(&coins.join(", "));
        }

        message
    }
}

/// Breaks `amount` into the fewest pieces using the greedy strategy.
///
/// ## Edge Cases
/// - zero → empty breakdown
/// - negative → empty breakdown, the whole amount reported as remainder
/// - not a multiple of Rs 0.05 → the residue is reported as remainder
///
/// ## Example
/// ```rust
/// use vend_core::change::make_change;
/// use vend_core::{Denomination, Money};
///
/// let change = make_change(Money::from_rupees(55));
/// assert_eq!(change.counts.get(Denomination::Rs50), 1);
/// assert_eq!(change.counts.get(Denomination::Rs5), 1);
/// assert!(change.is_exact());
/// ```
pub fn make_change(amount: Money) -> ChangeBreakdown {
    if !amount.is_positive() {
        return ChangeBreakdown {
            counts: DenominationCounts::new(),
            remainder: amount,
        };
    }

    let mut counts = DenominationCounts::new();
    let mut remaining = amount;

    for denomination in Denomination::ALL {
        let (count, rest) = remaining.split_by(denomination.value());
        if count > 0 {
            // count <= amount / 5 paisa, far below u32::MAX for any real balance
            counts.add(denomination, u32::try_from(count).unwrap_or(u32::MAX));
            remaining = rest;
        }
    }

    ChangeBreakdown {
        counts,
        remainder: remaining,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_gives_empty_breakdown() {
        let change = make_change(Money::zero());
        assert!(change.is_empty());
        assert!(change.is_exact());
        assert_eq!(change.total(), Money::zero());
    }

    #[test]
    fn test_fifty_five_is_fifty_plus_five() {
        let change = make_change(Money::from_rupees(55));

        let entries: Vec<_> = change.counts.iter().collect();
        assert_eq!(entries, vec![(Denomination::Rs50, 1), (Denomination::Rs5, 1)]);
    }

    #[test]
    fn test_float_trap_amount_is_exact() {
        // 0.30 - 0.25 is 0.04999... in binary floating point
        let change = make_change(Money::from_cents(30));

        assert_eq!(change.counts.get(Denomination::Paisa25), 1);
        assert_eq!(change.counts.get(Denomination::Paisa5), 1);
        assert!(change.is_exact());
    }

    #[test]
    fn test_uses_every_denomination_once() {
        let amount: Money = Denomination::ALL.iter().map(|d| d.value()).sum();
        let change = make_change(amount);

        for denomination in Denomination::ALL {
            assert_eq!(change.counts.get(denomination), 1, "{denomination}");
        }
    }

    #[test]
    fn test_sum_matches_amount_for_all_multiples_of_smallest_coin() {
        for paisa in (0..=50_000).step_by(5) {
            let amount = Money::from_cents(paisa);
            let change = make_change(amount);
            assert_eq!(change.total(), amount, "amount {amount}");
            assert!(change.is_exact());
        }
    }

    #[test]
    fn test_unpayable_residue_is_reported() {
        let change = make_change(Money::from_cents(1003));

        assert_eq!(change.counts.get(Denomination::Rs10), 1);
        assert_eq!(change.remainder, Money::from_cents(3));
        assert!(!change.is_exact());
    }

    #[test]
    fn test_negative_amount() {
        let change = make_change(Money::from_cents(-500));
        assert!(change.is_empty());
        assert_eq!(change.remainder, Money::from_cents(-500));
    }

    #[test]
    fn test_message_notes_and_coins() {
        let change = make_change(Money::from_cents(5575));
        assert_eq!(
            change.message(),
            "Change breakdown:\n\
             Notes: Rs 50: 1 note(s), Rs 5: 1 note(s)\n\
             Coins: Rs 0.50: 1 coin(s), Rs 0.25: 1 coin(s)"
        );
    }

    #[test]
    fn test_message_coins_only() {
        let change = make_change(Money::from_cents(10));
        assert_eq!(change.message(), "Change breakdown:\nCoins: Rs 0.10: 1 coin(s)");
    }
}
