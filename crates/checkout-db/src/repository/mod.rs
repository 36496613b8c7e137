//! # Repository Module
//!
//! Each repository wraps a clone of the pool and owns the SQL for one area.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Kiosk service                                                          │
//! │       │                                                                 │
//! │       ├── db.products()                                                 │
//! │       │     ProductRepository                                           │
//! │       │     ├── get_by_barcode / get_by_id                              │
//! │       │     ├── upsert / load_catalog                                   │
//! │       │     └── list / count                                            │
//! │       │                                                                 │
//! │       └── db.transactions()                                             │
//! │             TransactionRepository                                       │
//! │             ├── commit                                                  │
//! │             ├── find_by_exit_code / get_by_id                           │
//! │             └── recent / sales_stats                                    │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │                 SQLite Database                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are runtime-checked (`sqlx::query` / `query_as`) and rows are
//! mapped through private `FromRow` structs, so amounts are converted from
//! `REAL` to [`checkout_core::Money`] in exactly one place per table.

pub mod product;
pub mod transaction;
