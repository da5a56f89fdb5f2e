//! # Repository Module
//!
//! Database repository implementations for the vending machine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().decrement_stock(1, 2)                           │
//! │       ▼                                                                 │
//! │  ProductRepository              TransactionLogRepository               │
//! │  ├── get_by_id                  ├── append                             │
//! │  ├── list_by_category           ├── list_recent                        │
//! │  ├── insert / update / delete   └── count                              │
//! │  └── decrement_stock                                                   │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog CRUD and stock
//! - [`TransactionLogRepository`](transaction::TransactionLogRepository) - Append-only log

pub mod product;
pub mod transaction;
