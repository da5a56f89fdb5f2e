//! # Customer Routes
//!
//! The machine itself: show the catalog, take money, sell, pay out change.
//!
//! ## Purchase Flow
//! ```text
//! POST /purchase {product_id, quantity}
//!      │
//!      ├── parse fields ─────────────── fail ──► 400 "Please enter valid ..."
//!      ├── lock session
//!      ├── load product ─────────────── none ──► 400 "Invalid product ID"
//!      ├── ledger.purchase() ────────── stock / funds ──► 400
//!      ├── decrement_stock() (guarded) ─ lost race ──► 400, ledger untouched
//!      └── store new ledger ──► 200 {success, inserted_money, remaining_quantity}
//! ```

use axum::extract::{Form, State};
use axum::response::{Html, IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;
use vend_core::validation::{parse_integer, parse_money};
use vend_core::{
    CoreError, Money, Product, Purchase, SettlementOutcome, CATEGORY_CAKE, CATEGORY_DRINK,
};
use vend_db::{Database, DbError};

use crate::error::{ApiError, INVALID_PURCHASE_INPUT};
use crate::pages;
use crate::session::{SessionData, SessionId};
use crate::AppState;

/// Shown when change-out had nothing to pay back.
pub const THANK_YOU: &str = "Thank you for your purchase!";

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct InsertMoneyForm {
    #[serde(default)]
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseForm {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub quantity: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct InsertMoneyResponse {
    /// Balance in rupees.
    pub inserted_money: f64,
    pub message: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct PurchaseResponse {
    pub success: String,
    /// Balance in rupees.
    pub inserted_money: f64,
    pub remaining_quantity: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ChangeReturnedResponse {
    pub success: String,
    pub change_breakdown: String,
    pub inserted_money: f64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct InfoResponse {
    pub info: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /`
pub async fn index(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Html<String>, ApiError> {
    let balance = state
        .sessions
        .existing(session_id)
        .await
        .map(|session| session.ledger.inserted_money)
        .unwrap_or(Money::zero());

    let products = state.db.products();
    let cakes = products.list_by_category(CATEGORY_CAKE).await?;
    let drinks = products.list_by_category(CATEGORY_DRINK).await?;

    Ok(Html(pages::render_index(&cakes, &drinks, balance)))
}

/// `POST /insert_money`
///
/// Accepts exactly one note or coin per request.
pub async fn insert_money(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Form(form): Form<InsertMoneyForm>,
) -> Result<Json<InsertMoneyResponse>, ApiError> {
    let amount = parse_money("amount", &form.amount).map_err(CoreError::from)?;

    let mut session = state.sessions.lock(session_id).await;
    let ledger = session.ledger.insert_amount(amount).map_err(|e| {
        warn!(amount = %amount, "Rejected insert");
        e
    })?;
    session.ledger = ledger;

    debug!(amount = %amount, balance = %session.ledger.inserted_money, "Money inserted");

    Ok(Json(InsertMoneyResponse {
        inserted_money: session.ledger.inserted_money.as_rupees_f64(),
        message: format!("Inserted: {}", amount),
    }))
}

/// `POST /purchase`
pub async fn purchase(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Form(form): Form<PurchaseForm>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    let (product_id, quantity) = match (
        parse_integer("product_id", &form.product_id),
        parse_integer("quantity", &form.quantity),
    ) {
        (Ok(id), Ok(qty)) => (id, qty),
        _ => return Err(ApiError::validation(INVALID_PURCHASE_INPUT)),
    };

    let mut session = state.sessions.lock(session_id).await;

    let product = state
        .db
        .products()
        .get_by_id(product_id)
        .await?
        .ok_or(CoreError::ProductNotFound(product_id))?;

    let (purchase, remaining) =
        charge_and_dispense(&state.db, &mut session, &product, quantity).await?;

    info!(
        product_id,
        quantity,
        total = %purchase.line.line_total,
        remaining,
        "Purchase completed"
    );

    Ok(Json(PurchaseResponse {
        success: format!(
            "Purchase successful! Purchased {} x {}. Remaining balance: {}",
            quantity, product.name, session.ledger.inserted_money
        ),
        inserted_money: session.ledger.inserted_money.as_rupees_f64(),
        remaining_quantity: remaining,
    }))
}

/// Charges the ledger for `quantity` units of `product` and takes the stock.
///
/// `product` is a snapshot and may already be stale. The guarded decrement
/// has the final word; on any error the ledger is left untouched.
async fn charge_and_dispense(
    db: &Database,
    session: &mut SessionData,
    product: &Product,
    quantity: i64,
) -> Result<(Purchase, i64), ApiError> {
    let purchase = session
        .ledger
        .purchase(product, quantity)
        .map_err(|e| match e {
            CoreError::Validation(_) => ApiError::validation(INVALID_PURCHASE_INPUT),
            other => {
                warn!(product_id = product.id, quantity, error = %other, "Purchase rejected");
                ApiError::from(other)
            }
        })?;

    let remaining = db
        .products()
        .decrement_stock(product.id, quantity)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => ApiError::from(CoreError::ProductNotFound(product.id)),
            other => {
                warn!(product_id = product.id, quantity, error = %other, "Stock changed under purchase");
                ApiError::from(other)
            }
        })?;

    session.ledger = purchase.state.clone();
    Ok((purchase, remaining))
}

/// `POST /return_change`
///
/// The ledger is only reset once the log entry is stored.
pub async fn return_change(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Response, ApiError> {
    let Some(mut session) = state.sessions.existing(session_id).await else {
        return Ok(Json(InfoResponse {
            info: THANK_YOU.to_string(),
        })
        .into_response());
    };

    let settlement = session.ledger.return_change(Local::now().naive_local());

    if let Some(entry) = settlement.outcome.log_entry() {
        let id = state.db.transactions().append(entry).await?;
        info!(
            transaction_id = id,
            total_inserted = %entry.total_inserted,
            change = %entry.change_amount,
            "Session settled"
        );
    }

    session.ledger = settlement.state;

    let response = match settlement.outcome {
        SettlementOutcome::ChangeReturned {
            amount, breakdown, ..
        } => {
            if !breakdown.is_exact() {
                warn!(remainder = %breakdown.remainder, "Change could not be paid exactly");
            }
            Json(ChangeReturnedResponse {
                success: format!("Change returned: {}", amount),
                change_breakdown: breakdown.message(),
                inserted_money: 0.0,
            })
            .into_response()
        }
        SettlementOutcome::PurchasesLogged { .. } | SettlementOutcome::NothingToReturn => {
            Json(InfoResponse {
                info: THANK_YOU.to_string(),
            })
            .into_response()
        }
    };

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, INVALID_PRODUCT_ID};
    use axum::http::StatusCode;
    use vend_core::Denomination;
    use vend_db::{seed_default_products, DbConfig};

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_default_products(&db).await.unwrap();
        db
    }

    fn session_with(denomination: Denomination) -> SessionData {
        let mut session = SessionData::default();
        session.ledger = session.ledger.insert(denomination);
        session
    }

    #[tokio::test]
    async fn test_stale_snapshot_loses_to_guarded_decrement() {
        let db = seeded().await;
        let stale = db.products().get_by_id(3).await.unwrap().unwrap();

        // Another session empties the shelf after our snapshot was taken
        let mut drained = stale.clone();
        drained.quantity = 0;
        db.products().update(&drained).await.unwrap();

        let mut session = session_with(Denomination::Rs100);
        let before = session.ledger.clone();

        let err = charge_and_dispense(&db, &mut session, &stale, 1)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Insufficient quantity. Only 0 available");
        assert_eq!(session.ledger, before);

        let product = db.products().get_by_id(3).await.unwrap().unwrap();
        assert_eq!(product.quantity, 0);
    }

    #[tokio::test]
    async fn test_two_sessions_race_for_last_unit() {
        let db = seeded().await;
        let mut last = db.products().get_by_id(2).await.unwrap().unwrap();
        last.quantity = 1;
        db.products().update(&last).await.unwrap();

        // Both sessions passed the ledger check on the same snapshot
        let mut alice = session_with(Denomination::Rs50);
        let mut bob = session_with(Denomination::Rs50);
        let bob_before = bob.ledger.clone();

        let (purchase, remaining) = charge_and_dispense(&db, &mut alice, &last, 1)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
        assert_eq!(alice.ledger, purchase.state);
        assert_eq!(alice.ledger.inserted_money, Money::from_rupees(30));

        let err = charge_and_dispense(&db, &mut bob, &last, 1)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(bob.ledger, bob_before);

        let product = db.products().get_by_id(2).await.unwrap().unwrap();
        assert_eq!(product.quantity, 0);
    }

    #[tokio::test]
    async fn test_product_deleted_under_purchase() {
        let db = seeded().await;
        let snapshot = db.products().get_by_id(1).await.unwrap().unwrap();
        db.products().delete(1).await.unwrap();

        let mut session = session_with(Denomination::Rs20);
        let before = session.ledger.clone();

        let err = charge_and_dispense(&db, &mut session, &snapshot, 1)
            .await
            .unwrap_err();

        assert_eq!(err.message, INVALID_PRODUCT_ID);
        assert_eq!(session.ledger, before);
    }

    #[test]
    fn test_lost_stock_race_reads_like_stock_check() {
        let err = ApiError::from(DbError::InsufficientStock {
            product_id: 3,
            available: 0,
            requested: 1,
        });
        assert_eq!(err.message, "Insufficient quantity. Only 0 available");

        let err = ApiError::from(CoreError::ProductNotFound(9));
        assert_eq!(err.message, INVALID_PRODUCT_ID);
    }
}
