//! # Admin Routes
//!
//! Inventory CRUD and the transaction log.
//!
//! Every mutating route answers `303 See Other` to `/admin` and leaves a
//! flash message in the session for the next page render.

use axum::extract::{Form, Path, State};
use axum::response::{Html, Redirect};
use axum::Extension;
use serde::Deserialize;
use tracing::{info, warn};
use vend_core::validation::{
    normalize_category, parse_integer, parse_money, validate_price, validate_product_name,
    validate_stock_level,
};
use vend_core::{NewProduct, ValidationError};
use vend_db::DbError;

use crate::error::ApiError;
use crate::pages;
use crate::session::{SessionData, SessionId};
use crate::AppState;

/// Flash shown for any admin form that doesn't validate.
pub const INVALID_FIELDS: &str = "Please enter valid values for all fields";

const PRODUCT_NOT_FOUND: &str = "Product not found!";

// =============================================================================
// Forms
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateProductForm {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub category: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub quantity: String,
}

#[derive(Debug, Deserialize)]
pub struct AddProductForm {
    #[serde(default)]
    pub new_name: String,
    #[serde(default)]
    pub new_type: String,
    #[serde(default)]
    pub new_price: String,
    #[serde(default)]
    pub new_quantity: String,
}

/// Parses and validates the editable product fields.
fn parse_product_fields(
    name: &str,
    category: &str,
    price: &str,
    quantity: &str,
) -> Result<NewProduct, ValidationError> {
    validate_product_name(name)?;
    let category = normalize_category(category)?;
    let price = parse_money("price", price)?;
    validate_price(price)?;
    let quantity = parse_integer("quantity", quantity)?;
    validate_stock_level(quantity)?;

    Ok(NewProduct {
        name: name.trim().to_string(),
        category,
        price_cents: price.cents(),
        quantity,
    })
}

/// Flashes a storage failure without leaking its details.
fn flash_db_error(session: &mut SessionData, err: DbError) {
    let api_error = ApiError::from(err);
    session.flash_error(api_error.message);
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /admin`
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Html<String>, ApiError> {
    let transactions = state
        .db
        .transactions()
        .list_recent(state.history_limit)
        .await?;
    let products = state.db.products().list_all().await?;

    let flashes = match state.sessions.existing(session_id).await {
        Some(mut session) => session.take_flashes(),
        None => Vec::new(),
    };

    Ok(Html(pages::render_admin(&products, &transactions, &flashes)))
}

/// `POST /admin/update_product`
pub async fn update_product(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Form(form): Form<UpdateProductForm>,
) -> Redirect {
    let mut session = state.sessions.lock(session_id).await;

    let parsed = parse_integer("product_id", &form.product_id).and_then(|id| {
        parse_product_fields(&form.name, &form.category, &form.price, &form.quantity)
            .map(|fields| fields.with_id(id))
    });

    let product = match parsed {
        Ok(product) => product,
        Err(e) => {
            warn!(error = %e, "Rejected product update");
            session.flash_error(INVALID_FIELDS);
            return Redirect::to("/admin");
        }
    };

    match state.db.products().update(&product).await {
        Ok(()) => {
            info!(id = product.id, name = %product.name, "Product updated");
            session.flash_success("Product updated successfully!");
        }
        Err(DbError::NotFound { .. }) => session.flash_error(PRODUCT_NOT_FOUND),
        Err(e) => flash_db_error(&mut session, e),
    }

    Redirect::to("/admin")
}

/// `POST /admin/add_product`
pub async fn add_product(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Form(form): Form<AddProductForm>,
) -> Redirect {
    let mut session = state.sessions.lock(session_id).await;

    let product = match parse_product_fields(
        &form.new_name,
        &form.new_type,
        &form.new_price,
        &form.new_quantity,
    ) {
        Ok(product) => product,
        Err(e) => {
            warn!(error = %e, "Rejected new product");
            session.flash_error(INVALID_FIELDS);
            return Redirect::to("/admin");
        }
    };

    match state.db.products().insert(&product).await {
        Ok(id) => {
            info!(id, name = %product.name, "Product added");
            session.flash_success(format!("Product added successfully with ID: {}", id));
        }
        Err(e) => flash_db_error(&mut session, e),
    }

    Redirect::to("/admin")
}

/// `GET /admin/delete_product/{id}`
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Path(id): Path<i64>,
) -> Redirect {
    let mut session = state.sessions.lock(session_id).await;

    match state.db.products().delete(id).await {
        Ok(()) => {
            info!(id, "Product deleted");
            session.flash_success("Product deleted successfully!");
        }
        Err(DbError::NotFound { .. }) => session.flash_error(PRODUCT_NOT_FOUND),
        Err(e) => flash_db_error(&mut session, e),
    }

    Redirect::to("/admin")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_fields() {
        let product = parse_product_fields(" juice ", "Drink", "35.5", "4").unwrap();

        assert_eq!(product.name, "juice");
        assert_eq!(product.category, "drink");
        assert_eq!(product.price_cents, 3550);
        assert_eq!(product.quantity, 4);
    }

    #[test]
    fn test_parse_product_fields_rejects_bad_input() {
        assert!(parse_product_fields("", "drink", "10", "1").is_err());
        assert!(parse_product_fields("juice", "drink", "ten", "1").is_err());
        assert!(parse_product_fields("juice", "drink", "10.03", "1").is_err());
        assert!(parse_product_fields("juice", "drink", "0", "1").is_err());
        assert!(parse_product_fields("juice", "drink", "10", "-1").is_err());
        assert!(parse_product_fields("juice", "drink", "10", "1.5").is_err());
        assert!(parse_product_fields("juice", "drink", "50000000000000000", "1").is_err());
    }
}
