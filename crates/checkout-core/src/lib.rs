//! # checkout-core: Pure Business Logic for the Self-Checkout Kiosk
//!
//! This crate contains all checkout business logic as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Self-Checkout Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   kiosk (CLI / interactive shell)               │   │
//! │  │    scan ──► cart ──► pay (UTR) ──► invoice + exit QR ──► verify │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ checkout-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌────────┐  │   │
//! │  │   │  money  │ │  cart   │ │  ledger  │ │ invoice │ │  exit  │  │   │
//! │  │   │ Money   │ │ Cart    │ │ ids      │ │ Invoice │ │ Pass   │  │   │
//! │  │   │ TaxRate │ │ Session │ │ NewTxn   │ │ text    │ │ Input  │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └─────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        checkout-db (SQLite)      checkout-render (QR, PDF)      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Transaction, TaxRate, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Session-scoped cart aggregate
//! - [`ledger`] - Transaction identifiers and the pending transaction
//! - [`exit`] - Exit-pass payload and exit-code input parsing
//! - [`invoice`] - Invoice view model and monospace text layout
//! - [`catalog`] - Catalog CSV parsing
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use checkout_core::money::Money;
//! use checkout_core::types::TaxRate;
//!
//! let subtotal = Money::from_paise(21800); // Rs. 218.00
//! let tax = subtotal.calculate_tax(TaxRate::from_bps(1800));
//! assert_eq!(tax.paise(), 3924); // Rs. 39.24
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod exit;
pub mod invoice;
pub mod ledger;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartSummary, CheckoutSession};
pub use catalog::{parse_catalog, CatalogImport, RejectedRow};
pub use error::{CoreError, CoreResult, ValidationError};
pub use exit::{ExitInput, ExitPass};
pub use invoice::Invoice;
pub use ledger::{CommittedTransaction, NewTransaction};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Customer name recorded when the shopper leaves the field blank.
pub const ANONYMOUS_CUSTOMER: &str = "Anonymous";

/// Tax rate applied when configuration does not override it (18% GST).
pub const DEFAULT_TAX_RATE_BPS: u32 = 1800;

/// Stock level given to catalog rows that omit `stock_quantity`.
pub const DEFAULT_STOCK_QUANTITY: i64 = 100;
