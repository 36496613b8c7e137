//! # Invoice
//!
//! [`Invoice`] is the formatted view of a committed transaction. Every
//! string a printed invoice shows is produced here once; the monospace
//! layout below and the PDF layout in `checkout-render` both read the same
//! fields, so their totals cannot disagree.
//!
//! ## Text Layout (46 columns)
//! ```text
//! ==============================================
//!                SUPERMART INVOICE
//! ==============================================
//! Transaction ID: TXN-20240501140322-9f86d081
//! Date: 2024-05-01T14:03:22
//! Customer: Anonymous
//! UTR: 412345678901
//! ----------------------------------------------
//! Product Name              |  Qty |    Price |    Total
//! ----------------------------------------------
//! Taaza Milk 500ml (Amul)   |    2 |    49.00 |    98.00
//! ----------------------------------------------
//! Subtotal:                        Rs. 218.00
//! Tax (18%):                        Rs. 39.24
//! ----------------------------------------------
//! TOTAL:                           Rs. 257.24
//! ==============================================
//!        Thank you for shopping with us!
//! ==============================================
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::TransactionRecord;

const RULE_WIDTH: usize = 46;
const NAME_WIDTH: usize = 24;
const SUMMARY_WIDTH: usize = 43;

/// One item row, already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRow {
    /// `name (brand)`, untruncated.
    pub name: String,
    pub qty: i64,
    pub unit_price: String,
    pub line_total: String,
}

/// A labelled amount in the totals block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub amount: String,
}

/// Everything an invoice prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub store_name: String,
    pub title: String,
    pub trans_id: String,
    pub exit_code: String,
    /// ISO timestamp cut to seconds.
    pub date: String,
    pub customer: String,
    pub utr: String,
    pub rows: Vec<InvoiceRow>,
    /// Subtotal, tax, grand total, in that order.
    pub summary: Vec<SummaryRow>,
}

impl Invoice {
    /// Formats `record` for printing.
    ///
    /// The tax label uses the rate stored on the transaction, so a reprint
    /// after a rate change still matches the amounts.
    ///
    /// ## Arguments
    /// * `store_name` - Printed in the title and the PDF footer
    /// * `currency_symbol` - Prefix for the totals block, e.g. `Rs.`
    pub fn build(record: &TransactionRecord, store_name: &str, currency_symbol: &str) -> Self {
        let txn = &record.transaction;
        let amount = |m: Money| m.with_symbol(currency_symbol);

        Invoice {
            store_name: store_name.to_string(),
            title: format!("{} INVOICE", store_name.to_uppercase()),
            trans_id: txn.trans_id.clone(),
            exit_code: txn.exit_code.clone(),
            date: txn.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            customer: txn.customer_name.clone(),
            utr: txn.utr.clone(),
            rows: record
                .items
                .iter()
                .map(|item| InvoiceRow {
                    name: item.display_name(),
                    qty: item.qty,
                    unit_price: item.unit_price.to_string(),
                    line_total: item.line_total.to_string(),
                })
                .collect(),
            summary: vec![
                SummaryRow {
                    label: "Subtotal".to_string(),
                    amount: amount(txn.subtotal),
                },
                SummaryRow {
                    label: format!("Tax ({})", txn.tax_rate.label()),
                    amount: amount(txn.tax_amount),
                },
                SummaryRow {
                    label: "TOTAL".to_string(),
                    amount: amount(txn.total),
                },
            ],
        }
    }

    /// Footer for the monospace layout.
    pub fn text_footer(&self) -> &'static str {
        "Thank you for shopping with us!"
    }

    /// Footer for the printable document.
    pub fn document_footer(&self) -> String {
        format!("Thank you for shopping with {}!", self.store_name)
    }

    /// Base file name for saved invoices, e.g. `invoice_TXN-...`.
    pub fn file_stem(&self) -> String {
        format!("invoice_{}", self.trans_id)
    }

    /// Renders the monospace text invoice.
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Invoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        writeln!(f, "{}", heavy)?;
        writeln!(f, "{:^width$}", self.title, width = RULE_WIDTH)?;
        writeln!(f, "{}", heavy)?;
        writeln!(f, "Transaction ID: {}", self.trans_id)?;
        writeln!(f, "Date: {}", self.date)?;
        writeln!(f, "Customer: {}", self.customer)?;
        writeln!(f, "UTR: {}", self.utr)?;
        writeln!(f, "{}", light)?;
        writeln!(
            f,
            "{:<25} | {:>4} | {:>8} | {:>8}",
            "Product Name", "Qty", "Price", "Total"
        )?;
        writeln!(f, "{}", light)?;

        for row in &self.rows {
            let name: String = row.name.chars().take(NAME_WIDTH).collect();
            writeln!(
                f,
                "{:<25} | {:>4} | {:>8} | {:>8}",
                name, row.qty, row.unit_price, row.line_total
            )?;
        }

        writeln!(f, "{}", light)?;
        if let Some((grand, lines)) = self.summary.split_last() {
            for row in lines {
                writeln!(f, "{}", summary_line(row))?;
            }
            writeln!(f, "{}", light)?;
            writeln!(f, "{}", summary_line(grand))?;
        } else {
            writeln!(f, "{}", light)?;
        }
        writeln!(f, "{}", heavy)?;
        writeln!(f, "{:^width$}", self.text_footer(), width = RULE_WIDTH)?;
        writeln!(f, "{}", heavy)
    }
}

/// `Label:` then the amount right-aligned to column 43.
fn summary_line(row: &SummaryRow) -> String {
    let head = format!("{}: ", row.label);
    let width = SUMMARY_WIDTH.saturating_sub(head.chars().count());
    format!("{}{:>width$}", head, row.amount, width = width)
}

// =============================================================================
// Unit Tests
// =============================================================================
