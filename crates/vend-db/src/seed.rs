//! # Default Catalog
//!
//! The six products a fresh machine is stocked with.

use tracing::{debug, info};

use crate::error::DbResult;
use crate::pool::Database;
use vend_core::{Product, CATEGORY_CAKE, CATEGORY_DRINK};

/// (id, name, category, price in rupees, quantity)
const DEFAULT_CATALOG: &[(i64, &str, &str, i64, i64)] = &[
    (1, "sando", CATEGORY_CAKE, 15, 10),
    (2, "lays", CATEGORY_CAKE, 20, 8),
    (3, "m&m", CATEGORY_CAKE, 30, 5),
    (4, "Coca Cola", CATEGORY_DRINK, 50, 15),
    (5, "Sprite", CATEGORY_DRINK, 45, 12),
    (6, "water", CATEGORY_DRINK, 25, 10),
];

/// The default catalog as products.
pub fn default_products() -> Vec<Product> {
    DEFAULT_CATALOG
        .iter()
        .map(|&(id, name, category, rupees, quantity)| Product {
            id,
            name: name.to_string(),
            category: category.to_string(),
            price_cents: rupees * 100,
            quantity,
        })
        .collect()
}

/// Stocks an empty products table with the default catalog.
///
/// ## Returns
/// Number of products inserted; 0 when the table already had rows.
pub async fn seed_default_products(db: &Database) -> DbResult<usize> {
    let existing = db.products().count().await?;
    if existing > 0 {
        debug!(existing, "Products table not empty, skipping seed");
        return Ok(0);
    }

    let products = default_products();
    for product in &products {
        db.products().insert_with_id(product).await?;
    }

    info!(count = products.len(), "Seeded default products");
    Ok(products.len())
}
