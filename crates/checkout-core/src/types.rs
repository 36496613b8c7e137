//! # Domain Types
//!
//! Core domain types used throughout the checkout.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  Transaction    │   │ TransactionItem │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │   │  trans_id       │   │  trans_id (FK)  │       │
//! │  │  barcode (uniq) │   │  exit_code(uniq)│   │  product_id(FK) │       │
//! │  │  price          │   │  subtotal/tax   │   │  qty            │       │
//! │  │  stock_quantity │   │  tax_rate, utr  │   │  unit_price     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │TransactionStatus│   │  ReceiptLine    │       │
//! │  │  bps (u32)      │   │  Completed      │   │  item joined    │       │
//! │  │  1800 = 18%     │   │                 │   │  with product   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1800 bps = 18%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Percentage label without trailing zeros: `18%`, `8.25%`, `12.5%`.
    pub fn label(&self) -> String {
        let whole = self.0 / 100;
        let fraction = self.0 % 100;
        if fraction == 0 {
            format!("{}%", whole)
        } else {
            let digits = format!("{:02}", fraction);
            format!("{}.{}%", whole, digits.trim_end_matches('0'))
        }
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate(crate::DEFAULT_TAX_RATE_BPS)
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product, keyed by `product_id` and looked up by `barcode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: i64,

    /// Printed barcode (EAN-13 and friends), unique across the catalog.
    pub barcode: String,

    pub product_name: String,

    pub brand: String,

    pub category: String,

    /// Unit price.
    pub price: Money,

    /// Informational only; scans never check or decrement it.
    pub stock_quantity: i64,

    pub description: String,

    pub image_url: Option<String>,

    /// Free-text timestamps carried through from the catalog file.
    pub created_at: String,
    pub updated_at: String,
}

impl Product {
    /// `name (brand)` as printed on invoices.
    pub fn display_name(&self) -> String {
        display_name(&self.product_name, &self.brand)
    }
}

/// Joins a product name with its brand the way receipts show it.
pub fn display_name(name: &str, brand: &str) -> String {
    if brand.trim().is_empty() {
        name.to_string()
    } else {
        format!("{} ({})", name, brand)
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

/// Persisted status of a transaction.
///
/// A cart that has not been paid for is never written, so the only state
/// that reaches the ledger is the terminal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Ledger write succeeded.
    #[default]
    Completed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A committed purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// `TXN-<YYYYMMDDHHMMSS>-<8 hex>`.
    pub trans_id: String,

    /// Local wall-clock time of payment.
    pub timestamp: NaiveDateTime,

    pub customer_name: String,

    pub subtotal: Money,

    pub tax_amount: Money,

    /// Rate `tax_amount` was computed at; receipts print this one.
    pub tax_rate: TaxRate,

    pub total: Money,

    /// Customer-supplied payment reference (UPI UTR), never validated.
    pub utr: String,

    /// `EXIT-<YYYYMMDDHHMMSS>`, shown as a QR code at the exit.
    pub exit_code: String,

    pub status: TransactionStatus,
}

/// A stored line item with its sale-time price snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub trans_id: String,
    pub product_id: i64,
    pub qty: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A line item joined with catalog name and brand, for receipts and the
/// exit checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub product_id: i64,
    pub product_name: String,
    pub brand: String,
    pub qty: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

impl ReceiptLine {
    pub fn display_name(&self) -> String {
        display_name(&self.product_name, &self.brand)
    }
}

/// A transaction together with its joined items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction: Transaction,
    pub items: Vec<ReceiptLine>,
}

impl TransactionRecord {
    /// Number of item rows.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

// =============================================================================
// Analytics
// =============================================================================

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SalesStats {
    pub total_sales: Money,
    pub transaction_count: i64,
    pub product_count: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_label() {
        assert_eq!(TaxRate::from_bps(1800).label(), "18%");
        assert_eq!(TaxRate::from_bps(825).label(), "8.25%");
        assert_eq!(TaxRate::from_bps(1250).label(), "12.5%");
        assert_eq!(TaxRate::zero().label(), "0%");
        assert_eq!(TaxRate::default().bps(), 1800);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("Toor Dal 1kg", "Tata Sampann"), "Toor Dal 1kg (Tata Sampann)");
        assert_eq!(display_name("Loose Onions", ""), "Loose Onions");
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&TransactionStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        assert_eq!(TransactionStatus::Completed.as_str(), "completed");
    }
}
