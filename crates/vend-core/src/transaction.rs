//! # Transaction Log Entries
//!
//! The immutable record written when a customer session is settled.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  2026-10-17 14:03:11                                                    │
//! │  inserted  notes: {50: 1, 20: 1}      coins: {}                         │
//! │  change    notes: {50: 1, 5: 1}       coins: {}                         │
//! │  total inserted: Rs 70.00             change: Rs 55.00                  │
//! │  purchased: 1x sando                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::change::ChangeBreakdown;
use crate::denomination::DenominationCounts;
use crate::ledger::SessionState;
use crate::money::Money;

/// Date column format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time column format.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// One settled customer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionLogEntry {
    /// Assigned by the store on append; `None` before that.
    pub id: Option<i64>,
    pub date: String,
    pub time: String,
    pub inserted_notes: DenominationCounts,
    pub inserted_coins: DenominationCounts,
    pub change_notes: DenominationCounts,
    pub change_coins: DenominationCounts,
    /// Sum of every note and coin inserted during the session.
    pub total_inserted: Money,
    /// Balance returned to the customer.
    pub change_amount: Money,
    /// `1x sando, 2x water`; empty when nothing was bought.
    pub products_purchased: String,
}

impl TransactionLogEntry {
    /// Builds the log entry for settling `session` with `change` at `at`.
    pub fn record(session: &SessionState, change: &ChangeBreakdown, at: NaiveDateTime) -> Self {
        let products_purchased = session
            .current_purchases
            .iter()
            .map(|line| line.summary())
            .collect::<Vec<_>>()
            .join(", ");

        TransactionLogEntry {
            id: None,
            date: at.format(DATE_FORMAT).to_string(),
            time: at.format(TIME_FORMAT).to_string(),
            inserted_notes: session.denomination_counts.notes(),
            inserted_coins: session.denomination_counts.coins(),
            change_notes: change.notes(),
            change_coins: change.coins(),
            total_inserted: session.total_inserted(),
            change_amount: session.inserted_money,
            products_purchased,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
