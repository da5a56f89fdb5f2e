//! # Product Repository
//!
//! Database operations for the machine's catalog.
//!
//! ## Key Operations
//! - Listing by category for the customer page
//! - CRUD for the admin page
//! - Guarded stock decrement for purchases
//!
//! ## Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: read, check in Rust, write absolute value               │
//! │     SELECT quantity ...;  UPDATE products SET quantity = 0 ...     │
//! │     Two sessions both read 1 and both sell the last unit.          │
//! │                                                                     │
//! │  ✅ CORRECT: one conditional statement                             │
//! │     UPDATE products SET quantity = quantity - ?2                   │
//! │     WHERE id = ?1 AND quantity >= ?2                               │
//! │     Exactly one session matches; the other sees zero rows.         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vend_core::{NewProduct, Product};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let drinks = repo.list_by_category("drink").await?;
/// let remaining = repo.decrement_stock(4, 2).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price_cents, quantity
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists the products of one category, ordered by id.
    pub async fn list_by_category(&self, category: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price_cents, quantity
            FROM products
            WHERE category = ?1
            ORDER BY id
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        debug!(category = %category, count = products.len(), "Listed products");
        Ok(products)
    }

    /// Lists every product, ordered by id.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category, price_cents, quantity
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product and returns its assigned id.
    ///
    /// Ids follow `max(id) + 1`.
    pub async fn insert(&self, product: &NewProduct) -> DbResult<i64> {
        debug!(name = %product.name, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (name, category, price_cents, quantity)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.quantity)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Inserts a product with a caller-chosen id (catalog seeding).
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - id already taken
    pub async fn insert_with_id(&self, product: &Product) -> DbResult<()> {
        debug!(id = product.id, name = %product.name, "Inserting product with id");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, price_cents, quantity)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.quantity)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, product.id),
            other => other,
        })?;

        Ok(())
    }

    /// Overwrites name, category, price and quantity of an existing product.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                price_cents = ?4,
                quantity = ?5
            WHERE id = ?1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product.id));
        }

        Ok(())
    }

    /// Deletes a product.
    ///
    /// Logged transactions keep their own copy of the product name, so
    /// nothing else references the row.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Removes `quantity` units from stock and returns what is left.
    ///
    /// ## Returns
    /// * `Ok(remaining)` - Units left after the sale
    /// * `Err(DbError::InsufficientStock)` - Fewer than `quantity` units left
    /// * `Err(DbError::NotFound)` - Product was deleted
    pub async fn decrement_stock(&self, id: i64, quantity: i64) -> DbResult<i64> {
        debug!(id, quantity, "Decrementing stock");

        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET quantity = quantity - ?2
            WHERE id = ?1 AND quantity >= ?2
            RETURNING quantity
            "#,
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(remaining) = remaining {
            return Ok(remaining);
        }

        match self.get_by_id(id).await? {
            Some(product) => Err(DbError::InsufficientStock {
                product_id: id,
                available: product.quantity,
                requested: quantity,
            }),
            None => Err(DbError::not_found("Product", id)),
        }
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::seed::seed_default_products;
    use crate::DbError;
    use vend_core::{NewProduct, CATEGORY_CAKE, CATEGORY_DRINK};

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_default_products(&db).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_list_by_category_is_ordered() {
        let db = seeded().await;

        let cakes = db.products().list_by_category(CATEGORY_CAKE).await.unwrap();
        let ids: Vec<i64> = cakes.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let drinks = db.products().list_by_category(CATEGORY_DRINK).await.unwrap();
        assert_eq!(drinks.len(), 3);
        assert_eq!(drinks[0].name, "Coca Cola");
    }

    #[tokio::test]
    async fn test_insert_assigns_next_id() {
        let db = seeded().await;

        let id = db
            .products()
            .insert(&NewProduct {
                name: "juice".to_string(),
                category: CATEGORY_DRINK.to_string(),
                price_cents: 3500,
                quantity: 4,
            })
            .await
            .unwrap();

        assert_eq!(id, 7);
        let product = db.products().get_by_id(7).await.unwrap().unwrap();
        assert_eq!(product.name, "juice");
        assert_eq!(db.products().count().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_insert_with_taken_id_is_duplicate() {
        let db = seeded().await;
        let sando = db.products().get_by_id(1).await.unwrap().unwrap();

        let err = db.products().insert_with_id(&sando).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = seeded().await;
        let mut lays = db.products().get_by_id(2).await.unwrap().unwrap();
        lays.price_cents = 2500;
        lays.quantity = 20;

        db.products().update(&lays).await.unwrap();
        assert_eq!(db.products().get_by_id(2).await.unwrap(), Some(lays.clone()));

        db.products().delete(2).await.unwrap();
        assert!(db.products().get_by_id(2).await.unwrap().is_none());

        assert!(matches!(
            db.products().update(&lays).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            db.products().delete(2).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_decrement_stock_never_goes_negative() {
        let db = seeded().await;

        // m&m starts with 5
        assert_eq!(db.products().decrement_stock(3, 4).await.unwrap(), 1);

        let err = db.products().decrement_stock(3, 2).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::InsufficientStock {
                product_id: 3,
                available: 1,
                requested: 2
            }
        ));

        assert_eq!(db.products().decrement_stock(3, 1).await.unwrap(), 0);
        assert_eq!(db.products().get_by_id(3).await.unwrap().unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_decrement_stock_unknown_product() {
        let db = seeded().await;

        assert!(matches!(
            db.products().decrement_stock(99, 1).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
