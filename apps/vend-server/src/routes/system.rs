//! # System Routes
//!
//! Liveness and database diagnostics. These routes sit outside the session
//! layer, so health checks never create sessions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct HealthResponse {
    pub status: String,
    pub database: bool,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct DatabaseInfoResponse {
    pub database: String,
    pub database_path: String,
    pub total_products: i64,
    pub total_transactions: i64,
    pub migrations_applied: usize,
    pub migrations_total: usize,
    pub database_connected: bool,
}

/// `GET /health`: 200 when the database answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;

    let (status, label) = if database {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            database,
        }),
    )
}

/// `GET /database_info`
pub async fn database_info(
    State(state): State<AppState>,
) -> Result<Json<DatabaseInfoResponse>, ApiError> {
    let total_products = state.db.products().count().await?;
    let total_transactions = state.db.transactions().count().await?;
    let (migrations_total, migrations_applied) = state.db.migration_status().await?;

    Ok(Json(DatabaseInfoResponse {
        database: "SQLite".to_string(),
        database_path: state.db.database_path().display().to_string(),
        total_products,
        total_transactions,
        migrations_applied,
        migrations_total,
        database_connected: state.db.health_check().await,
    }))
}
