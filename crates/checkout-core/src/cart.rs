//! # Cart & Checkout Session
//!
//! The cart is owned by a [`CheckoutSession`], which the caller holds and
//! passes by `&mut` into every checkout operation. Nothing here is global.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Operations                                   │
//! │                                                                         │
//! │  Shopper Action           Service Call            Cart Change           │
//! │  ──────────────           ────────────            ───────────           │
//! │                                                                         │
//! │  Scan barcode ───────────► add_scan() ──────────► new line, qty 1       │
//! │                                                   or qty += 1           │
//! │                                                                         │
//! │  Remove item ────────────► remove_line() ───────► line dropped          │
//! │                                                                         │
//! │  Start over ─────────────► clear() ─────────────► lines.clear()         │
//! │                                                                         │
//! │  View cart ──────────────► summarize() ─────────► (read only)           │
//! │                                                                         │
//! │  Pay (UTR) ──────────────► checkout() ──────────► NewTransaction,       │
//! │                                                   cart cleared after    │
//! │                                                   the ledger commit     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;
use crate::types::{Product, ReceiptLine, TaxRate};
use crate::validation::normalize_customer_name;

/// One distinct barcode in the cart.
///
/// The product is a snapshot taken at first scan, so a catalog reload in
/// the middle of a session does not change the price the shopper saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub barcode: String,

    pub product: Product,

    /// Always >= 1; repeat scans increment it.
    pub quantity: i64,
}

impl CartLine {
    pub fn from_product(product: &Product) -> Self {
        CartLine {
            barcode: product.barcode.clone(),
            product: product.clone(),
            quantity: 1,
        }
    }

    pub fn unit_price(&self) -> Money {
        self.product.price
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.product.price.multiply_quantity(self.quantity)
    }
}

impl From<&CartLine> for ReceiptLine {
    fn from(line: &CartLine) -> Self {
        ReceiptLine {
            product_id: line.product.product_id,
            product_name: line.product.product_name.clone(),
            brand: line.product.brand.clone(),
            qty: line.quantity,
            unit_price: line.unit_price(),
            line_total: line.line_total(),
        }
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by barcode (a repeat scan increases quantity)
/// - Lines keep first-scan order
/// - No quantity cap and no stock check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    tax_rate: TaxRate,
}

impl Cart {
    /// Creates an empty cart that taxes at `tax_rate`.
    pub fn new(tax_rate: TaxRate) -> Self {
        Cart {
            lines: Vec::new(),
            tax_rate,
        }
    }

    /// Adds one unit of `product`.
    ///
    /// ## Behavior
    /// - Barcode already in cart: quantity + 1
    /// - Otherwise: new line at quantity 1
    pub fn add_product(&mut self, product: &Product) -> &CartLine {
        let index = match self.lines.iter().position(|l| l.barcode == product.barcode) {
            Some(index) => {
                self.lines[index].quantity += 1;
                index
            }
            None => {
                self.lines.push(CartLine::from_product(product));
                self.lines.len() - 1
            }
        };
        &self.lines[index]
    }

    /// Drops the line for `barcode`. Returns false if it was not in the cart.
    pub fn remove_line(&mut self, barcode: &str) -> bool {
        let barcode = barcode.trim();
        let before = self.lines.len();
        self.lines.retain(|l| l.barcode != barcode);
        self.lines.len() != before
    }

    /// Empties the cart unconditionally.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Subtotal, tax and grand total. Pure function of cart state.
    pub fn summarize(&self) -> CartSummary {
        CartSummary::from(self)
    }
}

/// Cart totals (for display and for the ledger row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub line_count: usize,
    pub unit_count: i64,
}

impl From<&Cart> for CartSummary {
    fn from(cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        let tax = subtotal.calculate_tax(cart.tax_rate);
        CartSummary {
            subtotal,
            tax,
            total: subtotal + tax,
            line_count: cart.lines.len(),
            unit_count: cart.lines.iter().map(|l| l.quantity).sum(),
        }
    }
}

// =============================================================================
// Checkout Session
// =============================================================================

/// One shopper's interaction, from first scan to payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: Uuid,
    customer_name: Option<String>,
    cart: Cart,
    pub started_at: DateTime<Local>,
}

impl CheckoutSession {
    pub fn new(tax_rate: TaxRate) -> Self {
        CheckoutSession {
            id: Uuid::new_v4(),
            customer_name: None,
            cart: Cart::new(tax_rate),
            started_at: Local::now(),
        }
    }

    pub fn with_customer(mut self, name: impl Into<String>) -> Self {
        self.set_customer(name);
        self
    }

    pub fn set_customer(&mut self, name: impl Into<String>) {
        self.customer_name = Some(name.into());
    }

    /// Customer name as it will be recorded ("Anonymous" when blank).
    pub fn customer_name(&self) -> String {
        normalize_customer_name(self.customer_name.as_deref())
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Starts the next shopper on the same kiosk with the same tax rate.
    pub fn reset(&mut self) {
        *self = CheckoutSession::new(self.cart.tax_rate);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn product(id: i64, barcode: &str, name: &str, paise: i64) -> Product {
        Product {
            product_id: id,
            barcode: barcode.to_string(),
            product_name: name.to_string(),
            brand: "Amul".to_string(),
            category: "Dairy".to_string(),
            price: Money::from_paise(paise),
            stock_quantity: 100,
            description: String::new(),
            image_url: None,
            created_at: "2024-05-01T09:00:00".to_string(),
            updated_at: "2024-05-01T09:00:00".to_string(),
        }
    }

    #[test]
    fn test_repeat_scan_increments_quantity() {
        let mut cart = Cart::new(TaxRate::from_bps(1800));
        let milk = product(1, "8901262150101", "Taaza Milk 500ml", 4900);

        cart.add_product(&milk);
        let line = cart.add_product(&milk);

        assert_eq!(line.quantity, 2);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].line_total().paise(), 9800);
    }

    #[test]
    fn test_summary_scenario() {
        let mut cart = Cart::new(TaxRate::from_bps(1800));
        let milk = product(1, "8901262150101", "Taaza Milk 500ml", 4900);
        let butter = product(2, "8901262010016", "Butter 500g", 12000);

        cart.add_product(&milk);
        cart.add_product(&milk);
        cart.add_product(&butter);

        let summary = cart.summarize();
        assert_eq!(summary.subtotal.to_string(), "218.00");
        assert_eq!(summary.tax.to_string(), "39.24");
        assert_eq!(summary.total.to_string(), "257.24");
        assert_eq!(summary.line_count, 2);
        assert_eq!(summary.unit_count, 3);
    }

    #[test]
    fn test_tax_matches_rounded_subtotal_for_many_carts() {
        for paise in [1, 7, 25, 99, 333, 1001, 4999, 123_457] {
            let mut cart = Cart::new(TaxRate::from_bps(1800));
            cart.add_product(&product(1, "1", "Item", paise));
            cart.add_product(&product(2, "2", "Other", paise / 3 + 1));
            let s = cart.summarize();
            let expected = (s.subtotal.paise() * 18 + 50) / 100;
            assert_eq!(s.tax.paise(), expected);
            assert_eq!(s.total, s.subtotal + s.tax);
        }
    }

    #[test]
    fn test_price_snapshot_survives_catalog_change() {
        let mut cart = Cart::new(TaxRate::default());
        let mut milk = product(1, "8901262150101", "Taaza Milk 500ml", 4900);
        cart.add_product(&milk);

        milk.price = Money::from_paise(5500);
        cart.add_product(&milk);

        assert_eq!(cart.lines()[0].unit_price().paise(), 4900);
        assert_eq!(cart.subtotal().paise(), 9800);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new(TaxRate::default());
        cart.add_product(&product(1, "111", "A", 100));
        cart.add_product(&product(2, "222", "B", 200));

        assert!(cart.remove_line(" 111 "));
        assert!(!cart.remove_line("999"));
        assert_eq!(cart.lines().len(), 1);

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.summarize().total.is_zero());
    }

    #[test]
    fn test_session_customer_and_reset() {
        let mut session = CheckoutSession::new(TaxRate::from_bps(500));
        assert_eq!(session.customer_name(), "Anonymous");

        session.set_customer("Ravi");
        session.cart_mut().add_product(&product(1, "111", "A", 100));
        let first_id = session.id;

        session.reset();
        assert!(session.cart().is_empty());
        assert_eq!(session.customer_name(), "Anonymous");
        assert_eq!(session.cart().tax_rate().bps(), 500);
        assert_ne!(session.id, first_id);
    }
}
