//! # Checkout Service
//!
//! Drives one kiosk from first scan to printed receipt.
//!
//! ## Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  complete_payment(session, utr)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  NewTransaction::generate ──EmptyCart / UTR missing──► error, cart kept │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ledger commit (one SQL transaction) ──fail──► error, cart kept         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  session.reset()  → next shopper                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  committed record ──► Invoice ──► text (always)                         │
//! │                                   ├─► PDF  (warn + skip if missing)     │
//! │                                   └─► exit QR (warn + skip if missing)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Once the ledger write succeeds the payment stands. The session is reset
//! straight away and the receipt is built from the committed data; render
//! failures become warnings on the [`Receipt`].

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use checkout_core::validation::validate_barcode;
use checkout_core::{
    CartLine, CheckoutSession, CoreError, ExitInput, ExitPass, Invoice, NewTransaction, TaxRate,
    TransactionRecord,
};
use checkout_db::{Database, DbError};

use crate::config::KioskConfig;
use crate::error::{AppError, AppResult, ErrorCode};

/// Everything produced for one paid transaction.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub record: TransactionRecord,
    pub invoice: Invoice,
    /// Monospace invoice; always present.
    pub text: String,
    pub pdf: Option<Vec<u8>>,
    /// Exit pass QR as PNG.
    pub exit_qr: Option<Vec<u8>>,
    /// Artifacts that could not be produced, one line each.
    pub warnings: Vec<String>,
}

impl Receipt {
    pub fn trans_id(&self) -> &str {
        &self.record.transaction.trans_id
    }

    pub fn exit_code(&self) -> &str {
        &self.record.transaction.exit_code
    }
}

/// Outcome of scanning every code in a camera frame.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub added: Vec<CartLine>,
    /// Decoded codes with no catalog entry.
    pub not_found: Vec<String>,
}

/// Checkout operations for a kiosk.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
    config: KioskConfig,
}

impl CheckoutService {
    pub fn new(db: Database, config: KioskConfig) -> Self {
        CheckoutService { db, config }
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.config.tax_rate()
    }

    pub fn currency_symbol(&self) -> &str {
        self.config.currency_symbol()
    }

    /// Starts an empty session at the configured tax rate.
    pub fn new_session(&self) -> CheckoutSession {
        CheckoutSession::new(self.tax_rate())
    }

    /// Adds one unit of the product with `barcode`.
    ///
    /// ## Errors
    /// * `ProductNotFound` - no catalog entry; the cart is unchanged
    /// * `ValidationError` - blank or malformed barcode
    pub async fn add_scan(
        &self,
        session: &mut CheckoutSession,
        barcode: &str,
    ) -> AppResult<CartLine> {
        let barcode = validate_barcode(barcode).map_err(CoreError::from)?;

        let product = self
            .db
            .products()
            .get_by_barcode(&barcode)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(barcode.clone()))?;

        let line = session.cart_mut().add_product(&product).clone();
        debug!(
            session = %session.id,
            barcode = %line.barcode,
            quantity = line.quantity,
            "Scanned product"
        );
        Ok(line)
    }

    /// Decodes every code in an image and scans each one.
    ///
    /// A code with no catalog entry is reported, not fatal. An image with
    /// no codes gives an empty report.
    ///
    /// ## Errors
    /// * `DecodingUnavailable` - fall back to typing the barcode
    pub async fn scan_image(
        &self,
        session: &mut CheckoutSession,
        bytes: &[u8],
    ) -> AppResult<ScanReport> {
        let codes = checkout_render::decode_image(bytes)?;
        let mut report = ScanReport::default();

        for code in codes {
            match self.add_scan(session, &code).await {
                Ok(line) => report.added.push(line),
                Err(e) if is_scan_miss(&e) => {
                    warn!(code = %code, error = %e, "Decoded code not scanned");
                    report.not_found.push(code);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    /// Records the payment, resets the session and renders the receipt.
    ///
    /// ## Errors
    /// * `ValidationError` - empty cart or missing UTR (session untouched)
    /// * `PersistenceError` - the ledger write failed (session untouched)
    ///
    /// After a successful commit this never fails.
    pub async fn complete_payment(
        &self,
        session: &mut CheckoutSession,
        utr: &str,
    ) -> AppResult<Receipt> {
        let new_txn = NewTransaction::generate(session, utr)?;
        let committed = self.db.transactions().commit(&new_txn).await?;
        session.reset();

        info!(
            trans_id = %committed.trans_id,
            exit_code = %committed.exit_code,
            total = %new_txn.transaction.total,
            items = new_txn.items.len(),
            "Payment recorded"
        );

        Ok(self.render(new_txn.into_record()))
    }

    /// Re-renders the receipt for a past transaction, at the tax rate it
    /// was sold at.
    ///
    /// Accepts a bare exit code or a full exit-pass payload.
    ///
    /// ## Errors
    /// * `NotFound` - no transaction has this exit code
    pub async fn reprint(&self, exit_code: &str) -> AppResult<Receipt> {
        let code = ExitInput::parse(exit_code)
            .exit_code()
            .map(str::to_string)
            .unwrap_or_else(|| exit_code.trim().to_string());

        let record = self
            .db
            .transactions()
            .find_by_exit_code(&code)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", code.as_str()))?;

        Ok(self.render(record))
    }

    fn render(&self, record: TransactionRecord) -> Receipt {
        let invoice = Invoice::build(
            &record,
            self.config.store_name(),
            self.config.currency_symbol(),
        );
        let text = invoice.render_text();
        let mut warnings = Vec::new();

        let pdf = match checkout_render::render_pdf(&invoice) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(trans_id = %invoice.trans_id, error = %e, "PDF invoice skipped");
                warnings.push(format!("PDF invoice unavailable: {}", e));
                None
            }
        };

        let payload = ExitPass::for_transaction(&record.transaction).payload();
        let exit_qr = match checkout_render::encode_png(&payload) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(trans_id = %invoice.trans_id, error = %e, "Exit QR skipped");
                warnings.push(format!(
                    "Exit QR unavailable ({}); show exit code {}",
                    e, record.transaction.exit_code
                ));
                None
            }
        };

        Receipt {
            record,
            invoice,
            text,
            pdf,
            exit_qr,
            warnings,
        }
    }
}

/// Unknown or malformed code, as opposed to a store failure.
pub(crate) fn is_scan_miss(err: &AppError) -> bool {
    matches!(err.code, ErrorCode::ProductNotFound | ErrorCode::ValidationError)
}

/// Writes the receipt's artifacts into `out_dir`, creating it if needed.
///
/// ## Files
/// * `invoice_<trans_id>.txt` - always
/// * `invoice_<trans_id>.pdf` - when a PDF was rendered
/// * `exit_<trans_id>.png` - when the exit QR was rendered
pub async fn save_receipt(receipt: &Receipt, out_dir: &Path) -> AppResult<Vec<PathBuf>> {
    tokio::fs::create_dir_all(out_dir).await?;
    let stem = receipt.invoice.file_stem();
    let mut written = Vec::new();

    let text_path = out_dir.join(format!("{}.txt", stem));
    tokio::fs::write(&text_path, &receipt.text).await?;
    written.push(text_path);

    if let Some(pdf) = &receipt.pdf {
        let pdf_path = out_dir.join(format!("{}.pdf", stem));
        tokio::fs::write(&pdf_path, pdf).await?;
        written.push(pdf_path);
    }

    if let Some(png) = &receipt.exit_qr {
        let qr_path = out_dir.join(format!("exit_{}.png", receipt.trans_id()));
        tokio::fs::write(&qr_path, png).await?;
        written.push(qr_path);
    }

    info!(dir = %out_dir.display(), files = written.len(), "Receipt saved");
    Ok(written)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use checkout_core::{Money, Product};
    use checkout_db::DbConfig;

    pub(crate) fn product(id: i64, barcode: &str, name: &str, brand: &str, paise: i64) -> Product {
        Product {
            product_id: id,
            barcode: barcode.to_string(),
            product_name: name.to_string(),
            brand: brand.to_string(),
            category: "Grocery".to_string(),
            price: Money::from_paise(paise),
            stock_quantity: 100,
            description: String::new(),
            image_url: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    /// Milk at 49.00 and bread at 120.00, 18% tax.
    pub(crate) async fn seeded() -> (Database, CheckoutService) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .upsert(&product(1, "8901000000011", "Milk", "Amul", 4900))
            .await
            .unwrap();
        db.products()
            .upsert(&product(2, "8901000000028", "Bread", "", 12000))
            .await
            .unwrap();
        let service = CheckoutService::new(db.clone(), KioskConfig::default());
        (db, service)
    }

    #[tokio::test]
    async fn test_repeat_scan_increments_quantity() {
        let (_db, service) = seeded().await;
        let mut session = service.new_session();

        service.add_scan(&mut session, "8901000000011").await.unwrap();
        let line = service.add_scan(&mut session, " 8901000000011\n").await.unwrap();

        assert_eq!(line.quantity, 2);
        assert_eq!(session.cart().lines().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_barcode_leaves_cart_unchanged() {
        let (_db, service) = seeded().await;
        let mut session = service.new_session();
        service.add_scan(&mut session, "8901000000028").await.unwrap();

        let err = service.add_scan(&mut session, "0000000000000").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);
        assert_eq!(session.cart().lines().len(), 1);
    }

    #[tokio::test]
    async fn test_payment_records_and_resets_session() {
        let (db, service) = seeded().await;
        let mut session = service.new_session().with_customer("Asha");
        service.add_scan(&mut session, "8901000000011").await.unwrap();
        service.add_scan(&mut session, "8901000000011").await.unwrap();
        service.add_scan(&mut session, "8901000000028").await.unwrap();

        let receipt = service.complete_payment(&mut session, "UTR123456").await.unwrap();

        let txn = &receipt.record.transaction;
        assert_eq!(txn.subtotal, Money::from_paise(21800));
        assert_eq!(txn.tax_amount, Money::from_paise(3924));
        assert_eq!(txn.total, Money::from_paise(25724));
        assert_eq!(txn.customer_name, "Asha");
        assert!(receipt.text.contains("Milk (Amul)"));
        assert!(receipt.text.contains("Tax (18%):"));
        assert!(session.cart().is_empty());

        let stored = db.transactions().find_by_exit_code(receipt.exit_code()).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_empty_cart_and_missing_utr_are_rejected() {
        let (db, service) = seeded().await;
        let mut session = service.new_session();

        let err = service.complete_payment(&mut session, "UTR1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        service.add_scan(&mut session, "8901000000011").await.unwrap();
        let err = service.complete_payment(&mut session, "   ").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(session.cart().lines().len(), 1);

        assert_eq!(db.transactions().sales_stats().await.unwrap().transaction_count, 0);
    }

    #[tokio::test]
    async fn test_reprint_matches_first_print() {
        let (_db, service) = seeded().await;
        let mut session = service.new_session();
        service.add_scan(&mut session, "8901000000028").await.unwrap();
        let receipt = service.complete_payment(&mut session, "UTR9").await.unwrap();

        let again = service.reprint(&format!("  {} ", receipt.exit_code())).await.unwrap();
        assert_eq!(again.text, receipt.text);

        let err = service.reprint("EXIT-19990101000000").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Transaction not found: EXIT-19990101000000");
    }

    #[tokio::test]
    async fn test_reprint_keeps_rate_of_sale() {
        let (db, service) = seeded().await;
        let mut session = service.new_session();
        service.add_scan(&mut session, "8901000000011").await.unwrap();
        service.add_scan(&mut session, "8901000000011").await.unwrap();
        service.add_scan(&mut session, "8901000000028").await.unwrap();
        let receipt = service.complete_payment(&mut session, "UTR18").await.unwrap();

        let mut config = KioskConfig::default();
        config.checkout.tax_rate_bps = 825;
        let repriced = CheckoutService::new(db, config);
        let again = repriced.reprint(receipt.exit_code()).await.unwrap();

        assert!(again.text.contains("Tax (18%):                        Rs. 39.24"));
        assert!(!again.text.contains("8.25%"));
        assert_eq!(again.text, receipt.text);
        assert_eq!(repriced.new_session().cart().tax_rate().bps(), 825);
    }

    #[tokio::test]
    async fn test_receipt_is_the_committed_record() {
        let (db, service) = seeded().await;
        let mut session = service.new_session().with_customer("Meera");
        service.add_scan(&mut session, "8901000000028").await.unwrap();
        service.add_scan(&mut session, "8901000000011").await.unwrap();

        let receipt = service.complete_payment(&mut session, " UTR42 ").await.unwrap();

        assert!(session.cart().is_empty());
        assert_eq!(session.customer_name(), "Anonymous");

        let stored = db
            .transactions()
            .get_by_id(receipt.trans_id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, receipt.record);
        assert_eq!(receipt.record.items[0].product_name, "Bread");
    }

    #[tokio::test]
    async fn test_save_receipt_writes_text_invoice() {
        let (_db, service) = seeded().await;
        let mut session = service.new_session();
        service.add_scan(&mut session, "8901000000011").await.unwrap();
        let receipt = service.complete_payment(&mut session, "UTR5").await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("receipts");
        let written = save_receipt(&receipt, &out).await.unwrap();

        let text_path = out.join(format!("invoice_{}.txt", receipt.trans_id()));
        assert!(written.contains(&text_path));
        assert_eq!(std::fs::read_to_string(text_path).unwrap(), receipt.text);
        let expected = 1 + usize::from(receipt.pdf.is_some()) + usize::from(receipt.exit_qr.is_some());
        assert_eq!(written.len(), expected);
    }
}
