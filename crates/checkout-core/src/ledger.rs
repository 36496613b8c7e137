//! # Ledger Types
//!
//! Identifier generation and the transaction built at payment time.
//! Persisting it is the job of `checkout-db`.
//!
//! ## Identifier Formats
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  trans_id   TXN-20240501140322-9f86d081                                 │
//! │             │   │              └── first 8 hex chars of a UUID v4       │
//! │             │   └── local time, second precision                        │
//! │             └── fixed prefix                                            │
//! │                                                                         │
//! │  exit_code  EXIT-20240501140322                                         │
//! │             same timestamp, no random part                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two payments inside the same second produce the same exit code. The
//! store's UNIQUE constraint rejects the second commit and the caller sees
//! the failure; nothing retries.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cart::CheckoutSession;
use crate::error::{CoreError, CoreResult};
use crate::types::{ReceiptLine, Transaction, TransactionItem, TransactionRecord, TransactionStatus};
use crate::validation::validate_payment_reference;

const ID_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Builds `TXN-<YYYYMMDDHHMMSS>-<suffix>`.
pub fn transaction_id(at: NaiveDateTime, suffix: &str) -> String {
    format!("TXN-{}-{}", at.format(ID_TIMESTAMP_FORMAT), suffix)
}

/// Builds `EXIT-<YYYYMMDDHHMMSS>`.
pub fn exit_code(at: NaiveDateTime) -> String {
    format!("EXIT-{}", at.format(ID_TIMESTAMP_FORMAT))
}

/// Eight lowercase hex characters from a fresh UUID v4.
pub fn random_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// A fully priced transaction that has not been written yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
    /// The same items with the names the shopper saw, in cart order.
    pub lines: Vec<ReceiptLine>,
}

impl NewTransaction {
    /// Prices the session's cart and stamps identifiers at `at`.
    ///
    /// ## Errors
    /// - `EmptyCart` when there is nothing to pay for
    /// - `Validation` when the payment reference is blank
    pub fn from_session(
        session: &CheckoutSession,
        utr: &str,
        at: NaiveDateTime,
        suffix: &str,
    ) -> CoreResult<Self> {
        let cart = session.cart();
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        let utr = validate_payment_reference(utr)?;
        let summary = cart.summarize();
        let trans_id = transaction_id(at, suffix);

        let items = cart
            .lines()
            .iter()
            .map(|line| TransactionItem {
                trans_id: trans_id.clone(),
                product_id: line.product.product_id,
                qty: line.quantity,
                unit_price: line.unit_price(),
                line_total: line.line_total(),
            })
            .collect();
        let lines = cart.lines().iter().map(ReceiptLine::from).collect();

        Ok(NewTransaction {
            transaction: Transaction {
                trans_id,
                timestamp: at,
                customer_name: session.customer_name(),
                subtotal: summary.subtotal,
                tax_amount: summary.tax,
                tax_rate: cart.tax_rate(),
                total: summary.total,
                utr,
                exit_code: exit_code(at),
                status: TransactionStatus::Completed,
            },
            items,
            lines,
        })
    }

    /// Same as [`from_session`](Self::from_session) with the current local
    /// time (microsecond precision, matching storage) and a random suffix.
    pub fn generate(session: &CheckoutSession, utr: &str) -> CoreResult<Self> {
        let now = Local::now().naive_local();
        let now = now
            .with_nanosecond(now.nanosecond() / 1_000 * 1_000)
            .unwrap_or(now);
        Self::from_session(session, utr, now, &random_suffix())
    }

    /// The record as the ledger holds it once committed.
    pub fn into_record(self) -> TransactionRecord {
        TransactionRecord {
            transaction: self.transaction,
            items: self.lines,
        }
    }
}

/// Identifiers handed back once the ledger write has succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedTransaction {
    pub trans_id: String,
    pub exit_code: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::product;
    use crate::types::TaxRate;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(14, 3, 22))
            .unwrap()
    }

    #[test]
    fn test_identifier_formats() {
        assert_eq!(transaction_id(at(), "9f86d081"), "TXN-20240501140322-9f86d081");
        assert_eq!(exit_code(at()), "EXIT-20240501140322");

        let suffix = random_suffix();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_from_session_prices_lines() {
        let mut session = CheckoutSession::new(TaxRate::from_bps(1800));
        let milk = product(1, "8901262150101", "Taaza Milk 500ml", 4900);
        let butter = product(2, "8901262010016", "Butter 500g", 12000);
        session.cart_mut().add_product(&milk);
        session.cart_mut().add_product(&milk);
        session.cart_mut().add_product(&butter);

        let txn = NewTransaction::from_session(&session, " 412345678901 ", at(), "abcdef01").unwrap();

        assert_eq!(txn.transaction.trans_id, "TXN-20240501140322-abcdef01");
        assert_eq!(txn.transaction.exit_code, "EXIT-20240501140322");
        assert_eq!(txn.transaction.customer_name, "Anonymous");
        assert_eq!(txn.transaction.utr, "412345678901");
        assert_eq!(txn.transaction.subtotal.paise(), 21800);
        assert_eq!(txn.transaction.tax_amount.paise(), 3924);
        assert_eq!(txn.transaction.total.paise(), 25724);
        assert_eq!(txn.transaction.tax_rate, TaxRate::from_bps(1800));

        assert_eq!(txn.items.len(), 2);
        assert_eq!(txn.items[0].qty, 2);
        assert_eq!(txn.items[0].line_total.paise(), 9800);
        assert!(txn.items.iter().all(|i| i.trans_id == txn.transaction.trans_id));
    }

    #[test]
    fn test_into_record_keeps_cart_order_and_names() {
        let mut session = CheckoutSession::new(TaxRate::from_bps(500));
        session.cart_mut().add_product(&product(2, "222", "Butter 500g", 12000));
        session.cart_mut().add_product(&product(1, "111", "Taaza Milk 500ml", 4900));
        session.cart_mut().add_product(&product(2, "222", "Butter 500g", 12000));

        let txn = NewTransaction::from_session(&session, "UTR1", at(), "abcdef01").unwrap();
        let items = txn.items.clone();
        let record = txn.into_record();

        assert_eq!(record.transaction.tax_rate.bps(), 500);
        assert_eq!(record.items.len(), 2);
        assert_eq!(record.items[0].product_name, "Butter 500g");
        assert_eq!(record.items[0].qty, 2);
        for (line, item) in record.items.iter().zip(&items) {
            assert_eq!(line.product_id, item.product_id);
            assert_eq!(line.line_total, item.line_total);
        }
    }

    #[test]
    fn test_empty_cart_and_blank_utr_rejected() {
        let mut session = CheckoutSession::new(TaxRate::default());
        assert!(matches!(
            NewTransaction::from_session(&session, "123", at(), "00000000"),
            Err(CoreError::EmptyCart)
        ));

        session.cart_mut().add_product(&product(1, "111", "A", 100));
        assert!(matches!(
            NewTransaction::from_session(&session, "  ", at(), "00000000"),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_generate_truncates_to_microseconds() {
        let mut session = CheckoutSession::new(TaxRate::default());
        session.cart_mut().add_product(&product(1, "111", "A", 100));

        let txn = NewTransaction::generate(&session, "UTR1").unwrap();
        assert_eq!(txn.transaction.timestamp.nanosecond() % 1_000, 0);
        assert!(txn.transaction.trans_id.starts_with("TXN-"));
    }
}
