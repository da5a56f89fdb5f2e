//! # Session Ledger
//!
//! Per-customer running balance, inserted-denomination counters and the
//! purchases made since the last change-out.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            insert(d)                      insert(d) / purchase(p, n)    │
//! │   ┌──────┐ ─────────────────────► ┌────────┐ ◄──────┐                  │
//! │   │ Idle │                        │ Active │ ───────┘                  │
//! │   └──────┘ ◄───────────────────── └────────┘                           │
//! │      ▲        return_change()                                           │
//! │      │                                                                  │
//! │      └── return_change() on Idle: no-op, nothing logged                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Value Semantics
//! Operations borrow the current state and hand back a NEW state. A failed
//! operation returns an error and the caller still holds the original, so
//! there is never a half-applied transition. Whoever hosts the session
//! (the HTTP layer) stores the returned value.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::change::{make_change, ChangeBreakdown};
use crate::denomination::{Denomination, DenominationCounts};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::transaction::TransactionLogEntry;
use crate::types::{Product, PurchaseLine};
use crate::validation::validate_quantity;

/// Observable ledger phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LedgerPhase {
    /// No balance and no pending purchases.
    Idle,
    /// Money inserted or purchases waiting to be logged.
    Active,
}

/// The ledger for one customer session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionState {
    /// Remaining balance. Never negative.
    pub inserted_money: Money,

    /// Pieces inserted since the last change-out.
    pub denomination_counts: DenominationCounts,

    /// Purchases since the last change-out, in order.
    pub current_purchases: Vec<PurchaseLine>,
}

/// Result of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    /// Ledger after paying for the line.
    pub state: SessionState,
    /// The line that was appended.
    pub line: PurchaseLine,
    /// Stock left in the machine after this purchase.
    pub remaining_stock: i64,
}

/// Result of `return_change`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Always the empty ledger.
    pub state: SessionState,
    pub outcome: SettlementOutcome,
}

/// What happened at change-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// A positive balance was paid out.
    ChangeReturned {
        amount: Money,
        breakdown: ChangeBreakdown,
        entry: TransactionLogEntry,
    },
    /// Balance was exactly spent; the purchases are still logged.
    PurchasesLogged { entry: TransactionLogEntry },
    /// Idle ledger. Nothing to log.
    NothingToReturn,
}

impl SettlementOutcome {
    /// The entry to append to the transaction log, if any.
    pub fn log_entry(&self) -> Option<&TransactionLogEntry> {
        match self {
            SettlementOutcome::ChangeReturned { entry, .. } => Some(entry),
            SettlementOutcome::PurchasesLogged { entry } => Some(entry),
            SettlementOutcome::NothingToReturn => None,
        }
    }
}

impl SessionState {
    /// Fresh, idle ledger.
    pub fn new() -> Self {
        SessionState::default()
    }

    pub fn phase(&self) -> LedgerPhase {
        if self.inserted_money.is_positive() || !self.current_purchases.is_empty() {
            LedgerPhase::Active
        } else {
            LedgerPhase::Idle
        }
    }

    /// Sum of every piece inserted since the last change-out.
    ///
    /// Equals `inserted_money` until the first purchase.
    pub fn total_inserted(&self) -> Money {
        self.denomination_counts.total()
    }

    /// Accepts one note or coin.
    pub fn insert(&self, denomination: Denomination) -> SessionState {
        let mut next = self.clone();
        next.inserted_money += denomination.value();
        next.denomination_counts.add(denomination, 1);
        next
    }

    /// Accepts an arbitrary amount only if it is exactly one denomination.
    ///
    /// ## Errors
    /// `CoreError::InvalidDenomination` for anything else, e.g. Rs 30 or
    /// Rs 0.03. Balance and counters therefore always move together.
    pub fn insert_amount(&self, amount: Money) -> CoreResult<SessionState> {
        let denomination = Denomination::try_from(amount)?;
        Ok(self.insert(denomination))
    }

    /// Buys `quantity` units of `product` from the balance.
    ///
    /// ## Checks (in order)
    /// 1. quantity within 1..=999
    /// 2. product holds at least `quantity` units
    /// 3. price × quantity fits in `Money`
    /// 4. balance covers price × quantity
    ///
    /// Stock is NOT written here; the caller persists
    /// `remaining_stock` (see `vend-db`'s guarded decrement).
    pub fn purchase(&self, product: &Product, quantity: i64) -> CoreResult<Purchase> {
        validate_quantity(quantity)?;

        if !product.can_supply(quantity) {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.quantity,
                requested: quantity,
            });
        }

        let line = PurchaseLine::from_product(product, quantity).ok_or_else(|| {
            ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: i64::MAX / product.price_cents.max(1),
            }
        })?;

        if self.inserted_money < line.line_total {
            return Err(CoreError::InsufficientFunds {
                required: line.line_total,
                available: self.inserted_money,
            });
        }

        let mut state = self.clone();
        state.inserted_money -= line.line_total;
        state.current_purchases.push(line.clone());

        Ok(Purchase {
            state,
            line,
            remaining_stock: product.quantity - quantity,
        })
    }

    /// Settles the session and resets the ledger.
    ///
    /// ## Outcomes
    /// ```text
    /// balance > 0                → ChangeReturned  (log entry with change)
    /// balance = 0, purchases     → PurchasesLogged (log entry, no change)
    /// balance = 0, no purchases  → NothingToReturn (no log entry)
    /// ```
    pub fn return_change(&self, at: NaiveDateTime) -> Settlement {
        let outcome = if self.inserted_money.is_positive() {
            let breakdown = make_change(self.inserted_money);
            let entry = TransactionLogEntry::record(self, &breakdown, at);
            SettlementOutcome::ChangeReturned {
                amount: self.inserted_money,
                breakdown,
                entry,
            }
        } else if !self.current_purchases.is_empty() {
            let entry = TransactionLogEntry::record(self, &ChangeBreakdown::default(), at);
            SettlementOutcome::PurchasesLogged { entry }
        } else {
            SettlementOutcome::NothingToReturn
        };

        Settlement {
            state: SessionState::new(),
            outcome,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CATEGORY_CAKE;
    use chrono::NaiveDate;

    fn product(id: i64, price_rupees: i64, quantity: i64) -> Product {
        Product {
            id,
            name: format!("product-{}", id),
            category: CATEGORY_CAKE.to_string(),
            price_cents: price_rupees * 100,
            quantity,
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .unwrap()
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = SessionState::new();
        assert_eq!(session.phase(), LedgerPhase::Idle);
        assert!(session.inserted_money.is_zero());
        assert!(session.denomination_counts.is_empty());
    }

    #[test]
    fn test_insert_keeps_balance_and_counters_in_sync() {
        let session = SessionState::new()
            .insert(Denomination::Rs50)
            .insert(Denomination::Rs20)
            .insert(Denomination::Paisa25);

        assert_eq!(session.phase(), LedgerPhase::Active);
        assert_eq!(session.inserted_money, Money::from_cents(7025));
        assert_eq!(session.inserted_money, session.total_inserted());
        assert_eq!(session.denomination_counts.get(Denomination::Rs50), 1);
    }

    #[test]
    fn test_insert_amount_rejects_non_denominations() {
        let session = SessionState::new();

        let err = session.insert_amount(Money::from_rupees(30)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDenomination(_)));

        let next = session.insert_amount(Money::from_cents(50)).unwrap();
        assert_eq!(next.denomination_counts.get(Denomination::Paisa50), 1);
    }

    #[test]
    fn test_scenario_insert_purchase_return() {
        let session = SessionState::new()
            .insert(Denomination::Rs50)
            .insert(Denomination::Rs20);
        assert_eq!(session.inserted_money, Money::from_rupees(70));

        let sando = product(1, 15, 10);
        let purchase = session.purchase(&sando, 1).unwrap();
        assert_eq!(purchase.state.inserted_money, Money::from_rupees(55));
        assert_eq!(purchase.remaining_stock, 9);
        assert_eq!(purchase.line.line_total, Money::from_rupees(15));

        let settlement = purchase.state.return_change(at());
        assert_eq!(settlement.state, SessionState::new());

        match settlement.outcome {
            SettlementOutcome::ChangeReturned {
                amount,
                breakdown,
                entry,
            } => {
                assert_eq!(amount, Money::from_rupees(55));
                let entries: Vec<_> = breakdown.counts.iter().collect();
                assert_eq!(entries, vec![(Denomination::Rs50, 1), (Denomination::Rs5, 1)]);
                assert_eq!(entry.total_inserted, Money::from_rupees(70));
                assert_eq!(entry.change_amount, Money::from_rupees(55));
                assert_eq!(entry.products_purchased, "1x product-1");
            }
            other => panic!("expected ChangeReturned, got {:?}", other),
        }
    }

    #[test]
    fn test_purchase_insufficient_stock_leaves_state() {
        let session = SessionState::new().insert(Denomination::Rs100);
        let before = session.clone();

        let err = session.purchase(&product(3, 30, 5), 6).unwrap_err();

        assert!(matches!(
            err,
            CoreError::InsufficientStock { available: 5, requested: 6, .. }
        ));
        assert_eq!(session, before);
    }

    #[test]
    fn test_purchase_insufficient_funds() {
        let session = SessionState::new().insert(Denomination::Rs20);

        let err = session.purchase(&product(3, 30, 5), 1).unwrap_err();

        match err {
            CoreError::InsufficientFunds { required, available } => {
                assert_eq!(required, Money::from_rupees(30));
                assert_eq!(available, Money::from_rupees(20));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_purchase_rejects_non_positive_quantity() {
        let session = SessionState::new().insert(Denomination::Rs100);
        assert!(matches!(
            session.purchase(&product(1, 15, 10), 0),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_purchase_line_total_overflow_is_rejected() {
        let session = SessionState::new().insert(Denomination::Rs100);
        let before = session.clone();
        let mut pricey = product(9, 1, 10);
        pricey.price_cents = 5_000_000_000_000_000_000;

        let err = session.purchase(&pricey, 2).unwrap_err();

        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { max: 1, .. })
        ));
        assert_eq!(session, before);
    }

    #[test]
    fn test_exact_spend_never_goes_negative_and_is_logged() {
        let session = SessionState::new().insert(Denomination::Rs20);
        let purchase = session.purchase(&product(2, 20, 8), 1).unwrap();

        assert!(purchase.state.inserted_money.is_zero());
        assert_eq!(purchase.state.phase(), LedgerPhase::Active);

        let settlement = purchase.state.return_change(at());
        let entry = settlement.outcome.log_entry().cloned().unwrap();
        assert!(matches!(settlement.outcome, SettlementOutcome::PurchasesLogged { .. }));
        assert!(entry.change_notes.is_empty());
        assert!(entry.change_coins.is_empty());
        assert_eq!(entry.total_inserted, Money::from_rupees(20));
    }

    #[test]
    fn test_return_change_on_idle_is_noop() {
        let settlement = SessionState::new().return_change(at());

        assert_eq!(settlement.outcome, SettlementOutcome::NothingToReturn);
        assert!(settlement.outcome.log_entry().is_none());
        assert_eq!(settlement.state.phase(), LedgerPhase::Idle);
    }

    #[test]
    fn test_session_round_trips_through_json() {
        let session = SessionState::new()
            .insert(Denomination::Rs10)
            .purchase(&product(1, 5, 2), 1)
            .unwrap()
            .state;

        let json = serde_json::to_string(&session).unwrap();
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
        assert_eq!(back.current_purchases[0].line_total, Money::from_rupees(5));
    }
}
