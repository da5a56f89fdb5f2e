//! # Domain Types
//!
//! Catalog and purchase types shared by every layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    Product      │   │   NewProduct    │   │   PurchaseLine      │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id (i64)       │   │  name           │   │  product_id         │   │
//! │  │  name           │   │  category       │   │  name (snapshot)    │   │
//! │  │  category       │   │  price_cents    │   │  quantity           │   │
//! │  │  price_cents    │   │  quantity       │   │  unit_price         │   │
//! │  │  quantity       │   └─────────────────┘   │  line_total         │   │
//! │  └─────────────────┘                         └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Product ids are small stable integers (the customer types them into the
//! purchase form), not UUIDs.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Category rendered in the first section of the customer page.
pub const CATEGORY_CAKE: &str = "cake";

/// Category rendered in the second section of the customer page.
pub const CATEGORY_DRINK: &str = "drink";

// =============================================================================
// Product
// =============================================================================

/// A product stocked in the machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Stable id shown on the customer page.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Open category string; `cake` and `drink` are the rendered sections.
    pub category: String,

    /// Price in paisa.
    pub price_cents: i64,

    /// Units currently in the machine. Never negative.
    pub quantity: i64,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if the machine holds at least `quantity` units.
    #[inline]
    pub fn can_supply(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

/// A product that hasn't been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub quantity: i64,
}

impl NewProduct {
    /// Attaches an id, producing a full product.
    pub fn with_id(self, id: i64) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            price_cents: self.price_cents,
            quantity: self.quantity,
        }
    }
}

// =============================================================================
// Purchase Line
// =============================================================================

/// One purchase made during the current session.
/// Uses snapshot pattern to freeze product data at time of purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseLine {
    pub product_id: i64,
    /// Product name at time of purchase (frozen).
    pub name: String,
    pub quantity: i64,
    /// Unit price at time of purchase (frozen).
    pub unit_price: Money,
    /// unit_price × quantity.
    pub line_total: Money,
}

impl PurchaseLine {
    /// Snapshots `product` for a purchase of `quantity` units.
    ///
    /// `None` if the line total overflows.
    pub fn from_product(product: &Product, quantity: i64) -> Option<Self> {
        let unit_price = product.price();
        Some(PurchaseLine {
            product_id: product.id,
            name: product.name.clone(),
            quantity,
            unit_price,
            line_total: unit_price.multiply_quantity(quantity)?,
        })
    }

    /// `2x sando`, as it appears in the transaction log.
    pub fn summary(&self) -> String {
        format!("{}x {}", self.quantity, self.name)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
