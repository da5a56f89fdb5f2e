//! # vend-core: Pure Business Logic for the Vending Machine
//!
//! This crate holds the session ledger, the denomination catalogue and the
//! change-making algorithm as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Vending Machine Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Browser (HTML forms)                         │   │
//! │  │    Insert money ──► Purchase ──► Return change ──► Admin       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vend-server (axum)                           │   │
//! │  │    routes, cookie sessions, page rendering                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vend-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌──────────┐  ┌───────────┐  │   │
//! │  │   │   money   │  │denomination│  │  change  │  │  ledger   │  │   │
//! │  │   │   Money   │  │ 11 pieces  │  │  greedy  │  │ Session-  │  │   │
//! │  │   │  (paisa)  │  │  counters  │  │ breakdown│  │  State    │  │   │
//! │  │   └───────────┘  └────────────┘  └──────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    vend-db (Database Layer)                     │   │
//! │  │        SQLite products, transaction log, migrations             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (paisa, no floating point)
//! - [`denomination`] - The 11 accepted notes and coins, and per-piece counters
//! - [`change`] - Greedy change-making
//! - [`ledger`] - Per-session balance, insert / purchase / return-change
//! - [`transaction`] - Log entries written at change-out
//! - [`types`] - Catalog types (Product, PurchaseLine)
//! - [`error`] - Domain error types
//! - [`validation`] - Form parsing and business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use vend_core::{make_change, Denomination, Money};
//!
//! let change = make_change(Money::from_rupees(55));
//! let pieces: Vec<_> = change.counts.iter().collect();
//!
//! assert_eq!(pieces, vec![(Denomination::Rs50, 1), (Denomination::Rs5, 1)]);
//! assert!(change.is_exact());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod change;
pub mod denomination;
pub mod error;
pub mod ledger;
pub mod money;
pub mod transaction;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use change::{make_change, ChangeBreakdown};
pub use denomination::{Denomination, DenominationCounts};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{LedgerPhase, Purchase, SessionState, Settlement, SettlementOutcome};
pub use money::Money;
pub use transaction::TransactionLogEntry;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single product per purchase.
///
/// Guards against typing 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Number of transaction log rows shown on the admin page.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
