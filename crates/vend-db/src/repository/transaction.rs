//! # Transaction Log Repository
//!
//! Append-only storage for settled customer sessions.
//!
//! ## Row Layout
//! ```text
//! ┌────┬────────────┬──────────┬────────────────┬─────┬──────────────────────┐
//! │ id │ date       │ time     │ inserted_notes │ ... │ products_purchased   │
//! ├────┼────────────┼──────────┼────────────────┼─────┼──────────────────────┤
//! │ 12 │ 2026-10-17 │ 14:03:11 │ {"50":1,"20":1}│     │ 1x sando             │
//! └────┴────────────┴──────────┴────────────────┴─────┴──────────────────────┘
//! ```
//!
//! Breakdown columns hold the JSON form of `DenominationCounts`.
//! Rows are never updated or deleted.

use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use vend_core::{DenominationCounts, Money, TransactionLogEntry};

/// Raw `transaction_logs` row.
#[derive(Debug, FromRow)]
struct TransactionLogRow {
    id: i64,
    date: String,
    time: String,
    inserted_notes: String,
    inserted_coins: String,
    change_notes: String,
    change_coins: String,
    total_inserted_cents: i64,
    change_amount_cents: i64,
    products_purchased: String,
}

fn parse_counts(column: &str) -> DbResult<DenominationCounts> {
    Ok(serde_json::from_str(column)?)
}

impl TryFrom<TransactionLogRow> for TransactionLogEntry {
    type Error = DbError;

    fn try_from(row: TransactionLogRow) -> DbResult<Self> {
        Ok(TransactionLogEntry {
            id: Some(row.id),
            date: row.date,
            time: row.time,
            inserted_notes: parse_counts(&row.inserted_notes)?,
            inserted_coins: parse_counts(&row.inserted_coins)?,
            change_notes: parse_counts(&row.change_notes)?,
            change_coins: parse_counts(&row.change_coins)?,
            total_inserted: Money::from_cents(row.total_inserted_cents),
            change_amount: Money::from_cents(row.change_amount_cents),
            products_purchased: row.products_purchased,
        })
    }
}

/// Repository for transaction log operations.
#[derive(Debug, Clone)]
pub struct TransactionLogRepository {
    pool: SqlitePool,
}

impl TransactionLogRepository {
    /// Creates a new TransactionLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionLogRepository { pool }
    }

    /// Appends an entry and returns its id. `entry.id` is ignored.
    pub async fn append(&self, entry: &TransactionLogEntry) -> DbResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO transaction_logs (
                date, time,
                inserted_notes, inserted_coins,
                change_notes, change_coins,
                total_inserted_cents, change_amount_cents,
                products_purchased
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&entry.date)
        .bind(&entry.time)
        .bind(serde_json::to_string(&entry.inserted_notes)?)
        .bind(serde_json::to_string(&entry.inserted_coins)?)
        .bind(serde_json::to_string(&entry.change_notes)?)
        .bind(serde_json::to_string(&entry.change_coins)?)
        .bind(entry.total_inserted.cents())
        .bind(entry.change_amount.cents())
        .bind(&entry.products_purchased)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, "Transaction logged");
        Ok(id)
    }

    /// Returns up to `limit` entries, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<TransactionLogEntry>> {
        let rows = sqlx::query_as::<_, TransactionLogRow>(
            r#"
            SELECT
                id, date, time,
                inserted_notes, inserted_coins,
                change_notes, change_coins,
                total_inserted_cents, change_amount_cents,
                products_purchased
            FROM transaction_logs
            ORDER BY date DESC, time DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TransactionLogEntry::try_from).collect()
    }

    /// Counts logged transactions (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transaction_logs")
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
    use crate::DbError;
    use chrono::{NaiveDate, NaiveDateTime};
    use vend_core::{Denomination, Money, Product, SessionState, CATEGORY_CAKE};

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .and_then(|d| d.and_hms_opt(hour, min, 0))
            .unwrap()
    }

    fn sando() -> Product {
        Product {
            id: 1,
            name: "sando".to_string(),
            category: CATEGORY_CAKE.to_string(),
            price_cents: 1500,
            quantity: 10,
        }
    }

    #[tokio::test]
    async fn test_append_and_read_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let session = SessionState::new()
            .insert(Denomination::Rs50)
            .insert(Denomination::Rs20)
            .insert(Denomination::Paisa50);
        let session = session.purchase(&sando(), 1).unwrap().state;
        let settlement = session.return_change(at(14, 3));
        let entry = settlement.outcome.log_entry().cloned().unwrap();

        let id = db.transactions().append(&entry).await.unwrap();
        let logged = db.transactions().list_recent(50).await.unwrap();

        assert_eq!(logged.len(), 1);
        let back = &logged[0];
        assert_eq!(back.id, Some(id));
        assert_eq!(back.date, "2026-10-17");
        assert_eq!(back.time, "14:03:00");
        assert_eq!(back.inserted_notes, entry.inserted_notes);
        assert_eq!(back.inserted_coins.get(Denomination::Paisa50), 1);
        assert_eq!(back.change_notes.get(Denomination::Rs50), 1);
        assert_eq!(back.change_notes.get(Denomination::Rs5), 1);
        assert_eq!(back.change_coins.get(Denomination::Paisa50), 1);
        assert_eq!(back.total_inserted, Money::from_cents(7050));
        assert_eq!(back.change_amount, Money::from_cents(5550));
        assert_eq!(back.products_purchased, "1x sando");
    }

    #[tokio::test]
    async fn test_list_recent_is_newest_first_and_limited() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        for (hour, min) in [(9, 0), (11, 30), (10, 15)] {
            let session = SessionState::new().insert(Denomination::Rs10);
            let entry = session
                .return_change(at(hour, min))
                .outcome
                .log_entry()
                .cloned()
                .unwrap();
            db.transactions().append(&entry).await.unwrap();
        }

        let recent = db.transactions().list_recent(2).await.unwrap();
        let times: Vec<&str> = recent.iter().map(|e| e.time.as_str()).collect();
        assert_eq!(times, vec!["11:30:00", "10:15:00"]);
        assert_eq!(db.transactions().count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_corrupt_breakdown_is_serialization_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        sqlx::query(
            "INSERT INTO transaction_logs (date, time, inserted_notes) VALUES ('2026-10-17', '08:00:00', 'not json')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        assert!(matches!(
            db.transactions().list_recent(10).await,
            Err(DbError::Serialization(_))
        ));
    }
}
