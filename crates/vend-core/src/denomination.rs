//! # Denomination Table
//!
//! The fixed set of notes and coins the machine accepts and dispenses.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  NOTES  (value >= Rs 1)           COINS  (value < Rs 1)                 │
//! │  ──────────────────────           ─────────────────────                 │
//! │  100   50   25   20   10   5   1  0.50   0.25   0.10   0.05            │
//! │  ◄──────────────── strictly descending ───────────────────►            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The enum declaration order IS the descending value order, so the derived
//! `Ord` sorts largest first and every `BTreeMap<Denomination, _>` iterates
//! in display order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

/// A currency unit recognized by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Denomination {
    #[serde(rename = "100")]
    Rs100,
    #[serde(rename = "50")]
    Rs50,
    #[serde(rename = "25")]
    Rs25,
    #[serde(rename = "20")]
    Rs20,
    #[serde(rename = "10")]
    Rs10,
    #[serde(rename = "5")]
    Rs5,
    #[serde(rename = "1")]
    Rs1,
    #[serde(rename = "0.50")]
    Paisa50,
    #[serde(rename = "0.25")]
    Paisa25,
    #[serde(rename = "0.10")]
    Paisa10,
    #[serde(rename = "0.05")]
    Paisa5,
}

impl Denomination {
    /// Every denomination, largest first.
    pub const ALL: [Denomination; 11] = [
        Denomination::Rs100,
        Denomination::Rs50,
        Denomination::Rs25,
        Denomination::Rs20,
        Denomination::Rs10,
        Denomination::Rs5,
        Denomination::Rs1,
        Denomination::Paisa50,
        Denomination::Paisa25,
        Denomination::Paisa10,
        Denomination::Paisa5,
    ];

    /// The smallest coin. Every payable amount is a multiple of it.
    pub const SMALLEST: Denomination = Denomination::Paisa5;

    /// Face value.
    pub const fn value(self) -> Money {
        let paisa = match self {
            Denomination::Rs100 => 10_000,
            Denomination::Rs50 => 5_000,
            Denomination::Rs25 => 2_500,
            Denomination::Rs20 => 2_000,
            Denomination::Rs10 => 1_000,
            Denomination::Rs5 => 500,
            Denomination::Rs1 => 100,
            Denomination::Paisa50 => 50,
            Denomination::Paisa25 => 25,
            Denomination::Paisa10 => 10,
            Denomination::Paisa5 => 5,
        };
        Money::from_cents(paisa)
    }

    /// Notes are everything worth at least one rupee.
    pub const fn is_note(self) -> bool {
        self.value().cents() >= 100
    }

    pub const fn is_coin(self) -> bool {
        !self.is_note()
    }

    /// Looks up the denomination with exactly this face value.
    pub fn from_value(value: Money) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.value() == value)
    }

    /// Iterator over the notes, largest first.
    pub fn notes() -> impl Iterator<Item = Denomination> {
        Self::ALL.into_iter().filter(|d| d.is_note())
    }

    /// Iterator over the coins, largest first.
    pub fn coins() -> impl Iterator<Item = Denomination> {
        Self::ALL.into_iter().filter(|d| d.is_coin())
    }
}

impl TryFrom<Money> for Denomination {
    type Error = CoreError;

    fn try_from(value: Money) -> Result<Self, Self::Error> {
        Denomination::from_value(value).ok_or(CoreError::InvalidDenomination(value))
    }
}

/// `Rs 50` for notes, `Rs 0.50` for coins.
impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value();
        if self.is_note() {
            write!(f, "Rs {}", value.rupees())
        } else {
            write!(f, "{}", value)
        }
    }
}

// =============================================================================
// Denomination Counts
// =============================================================================

/// Count of pieces per denomination.
///
/// Zero counts are never stored, so the serialized form only lists
/// denominations that actually appear: `{"50": 1, "5": 1}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DenominationCounts(BTreeMap<Denomination, u32>);

impl DenominationCounts {
    pub fn new() -> Self {
        DenominationCounts(BTreeMap::new())
    }

    /// Adds `count` pieces of `denomination`.
    pub fn add(&mut self, denomination: Denomination, count: u32) {
        if count == 0 {
            return;
        }
        *self.0.entry(denomination).or_insert(0) += count;
    }

    /// Number of pieces held for `denomination` (zero when absent).
    pub fn get(&self, denomination: Denomination) -> u32 {
        self.0.get(&denomination).copied().unwrap_or(0)
    }

    /// Non-zero entries, largest denomination first.
    pub fn iter(&self) -> impl Iterator<Item = (Denomination, u32)> + '_ {
        self.0.iter().map(|(d, c)| (*d, *c))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of `value × count` over all entries.
    pub fn total(&self) -> Money {
        // Rs 100 x u32::MAX is far below i64::MAX
        self.iter()
            .map(|(d, c)| Money::from_cents(d.value().cents() * i64::from(c)))
            .sum()
    }

    /// Only the note entries.
    pub fn notes(&self) -> DenominationCounts {
        self.iter().filter(|(d, _)| d.is_note()).collect()
    }

    /// Only the coin entries.
    pub fn coins(&self) -> DenominationCounts {
        self.iter().filter(|(d, _)| d.is_coin()).collect()
    }
}

impl FromIterator<(Denomination, u32)> for DenominationCounts {
    fn from_iter<I: IntoIterator<Item = (Denomination, u32)>>(iter: I) -> Self {
        let mut counts = DenominationCounts::new();
        for (denomination, count) in iter {
            counts.add(denomination, count);
        }
        counts
    }
}

/// `Rs 50 x1, Rs 0.50 x2`, or `-` when empty.
impl fmt::Display for DenominationCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        let parts: Vec<String> = self.iter().map(|(d, c)| format!("{} x{}", d, c)).collect();
        write!(f, "{}", parts.join(", "))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_strictly_descending() {
        for pair in Denomination::ALL.windows(2) {
            assert!(pair[0].value() > pair[1].value());
            assert!(pair[0] < pair[1], "Ord must follow declaration order");
        }
    }

    #[test]
    fn test_notes_and_coins_split_at_one_rupee() {
        let notes: Vec<_> = Denomination::notes().collect();
        let coins: Vec<_> = Denomination::coins().collect();

        assert_eq!(notes.len(), 7);
        assert_eq!(coins.len(), 4);
        assert!(Denomination::Rs1.is_note());
        assert!(Denomination::Paisa50.is_coin());
    }

    #[test]
    fn test_from_value() {
        assert_eq!(
            Denomination::from_value(Money::from_cents(50)),
            Some(Denomination::Paisa50)
        );
        assert_eq!(Denomination::from_value(Money::from_rupees(30)), None);

        let err = Denomination::try_from(Money::from_rupees(3)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDenomination(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Denomination::Rs100.to_string(), "Rs 100");
        assert_eq!(Denomination::Paisa5.to_string(), "Rs 0.05");
    }

    #[test]
    fn test_counts_skip_zero_and_total() {
        let mut counts = DenominationCounts::new();
        counts.add(Denomination::Rs20, 2);
        counts.add(Denomination::Paisa25, 0);
        counts.add(Denomination::Paisa50, 1);

        assert_eq!(counts.get(Denomination::Paisa25), 0);
        assert_eq!(counts.total(), Money::from_cents(4050));
        assert_eq!(counts.notes().total(), Money::from_rupees(40));
        assert_eq!(counts.coins().total(), Money::from_cents(50));
        assert_eq!(counts.to_string(), "Rs 20 x2, Rs 0.50 x1");
    }

    #[test]
    fn test_counts_serialize_as_string_keyed_map() {
        let counts: DenominationCounts =
            vec![(Denomination::Rs5, 1), (Denomination::Rs50, 1)].into_iter().collect();

        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"50":1,"5":1}"#);

        let back: DenominationCounts = serde_json::from_str(&json).unwrap();
        assert_eq!(back, counts);
    }
}
