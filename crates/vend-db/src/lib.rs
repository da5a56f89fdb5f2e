//! # vend-db: Database Layer for the Vending Machine
//!
//! This crate provides database access for the vending machine server.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vending Machine Data Flow                        │
//! │                                                                         │
//! │  HTTP handler (POST /purchase)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vend-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo    │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │◄───│ TransactionLog │    │  _schema.sql │  │   │
//! │  │   │               │    │  Repo          │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                     vending_machine.db                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Product and transaction log repositories
//! - [`seed`] - Default catalog
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vend_db::{seed_default_products, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("vending_machine.db")).await?;
//! seed_default_products(&db).await?;
//!
//! let drinks = db.products().list_by_category("drink").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use seed::{default_products, seed_default_products};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::transaction::TransactionLogRepository;
