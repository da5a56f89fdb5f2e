//! # vend-server: HTTP Front End for the Vending Machine
//!
//! Wires the pure ledger (`vend-core`) and storage (`vend-db`) to the web.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Browser ──► TraceLayer ──► session_layer ──► customer / admin routes  │
//! │                    │                                 │                  │
//! │                    └──────► system routes            ▼                  │
//! │                              (no session)     SessionStore (memory)     │
//! │                                                      │                  │
//! │                                                      ▼                  │
//! │                                          vend-core ledger operations    │
//! │                                                      │                  │
//! │                                                      ▼                  │
//! │                                          vend-db (SQLite)               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod pages;
pub mod routes;
pub mod session;

use std::time::Duration;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use vend_core::DEFAULT_HISTORY_LIMIT;
use vend_db::Database;

use crate::routes::{admin, customer, system};
use crate::session::SessionStore;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionStore,
    /// Rows shown in the admin transaction table.
    pub history_limit: i64,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState {
            db,
            sessions: SessionStore::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Overrides the admin history length.
    pub fn with_history_limit(mut self, limit: i64) -> Self {
        self.history_limit = limit;
        self
    }

    /// Replaces the session store with one using `timeout`.
    pub fn with_session_idle_timeout(mut self, timeout: Duration) -> Self {
        self.sessions = SessionStore::with_idle_timeout(timeout);
        self
    }
}

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/", get(customer::index))
        .route("/insert_money", post(customer::insert_money))
        .route("/purchase", post(customer::purchase))
        .route("/return_change", post(customer::return_change))
        .route("/admin", get(admin::dashboard))
        .route("/admin/update_product", post(admin::update_product))
        .route("/admin/add_product", post(admin::add_product))
        .route("/admin/delete_product/{id}", get(admin::delete_product))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::session_layer,
        ));

    let system_routes = Router::new()
        .route("/health", get(system::health))
        .route("/database_info", get(system::database_info));

    session_routes
        .merge(system_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
