//! # Transaction Repository
//!
//! The ledger. A paid cart is written here exactly once and read back by
//! the exit checkpoint, the reprint command and the admin dashboard.
//!
//! ## Atomic Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  commit(&NewTransaction)                                                │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    INSERT transactions        (1 row)                                   │
//! │    INSERT transaction_items   (1 row per cart line)                     │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure before COMMIT drops the sqlx transaction, which rolls      │
//! │  back: either every row exists or none does.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use checkout_core::{
    CommittedTransaction, Money, NewTransaction, ReceiptLine, SalesStats, TaxRate, Transaction,
    TransactionRecord, TransactionStatus,
};

/// Storage format for `transactions.timestamp`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const TRANSACTION_COLUMNS: &str = "trans_id, timestamp, customer_name, subtotal, tax_amount, \
     tax_rate_bps, total, utr, exit_code, status";

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    trans_id: String,
    timestamp: String,
    customer_name: Option<String>,
    subtotal: f64,
    tax_amount: f64,
    tax_rate_bps: Option<i64>,
    total: f64,
    utr: Option<String>,
    exit_code: Option<String>,
    status: Option<String>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DbError;

    fn try_from(row: TransactionRow) -> DbResult<Self> {
        let timestamp = NaiveDateTime::parse_from_str(&row.timestamp, TIMESTAMP_PARSE_FORMAT)
            .map_err(|_| DbError::corrupt("timestamp", &row.timestamp))?;

        let status = match row.status.as_deref() {
            None | Some("completed") => TransactionStatus::Completed,
            Some(other) => return Err(DbError::corrupt("status", other)),
        };

        let subtotal = Money::from_major_f64(row.subtotal);
        let tax_amount = Money::from_major_f64(row.tax_amount);
        let tax_rate = match row.tax_rate_bps {
            Some(bps) => u32::try_from(bps)
                .map(TaxRate::from_bps)
                .map_err(|_| DbError::corrupt("tax_rate_bps", bps.to_string()))?,
            None => implied_tax_rate(subtotal, tax_amount),
        };

        Ok(Transaction {
            trans_id: row.trans_id,
            timestamp,
            customer_name: row.customer_name.unwrap_or_default(),
            subtotal,
            tax_amount,
            tax_rate,
            total: Money::from_major_f64(row.total),
            utr: row.utr.unwrap_or_default(),
            exit_code: row.exit_code.unwrap_or_default(),
            status,
        })
    }
}

/// Rate for rows stored before `tax_rate_bps` existed, rounded to the
/// nearest basis point. Tax was rounded to the paisa, so tiny subtotals can
/// come out a few bps off.
fn implied_tax_rate(subtotal: Money, tax: Money) -> TaxRate {
    let (subtotal, tax) = (subtotal.paise(), tax.paise());
    if subtotal <= 0 || tax <= 0 {
        return TaxRate::zero();
    }
    let bps = (tax * 10_000 + subtotal / 2) / subtotal;
    TaxRate::from_bps(u32::try_from(bps).unwrap_or(u32::MAX))
}

#[derive(Debug, sqlx::FromRow)]
struct ReceiptLineRow {
    product_id: i64,
    product_name: String,
    brand: String,
    qty: i64,
    unit_price: f64,
    line_total: f64,
}

impl From<ReceiptLineRow> for ReceiptLine {
    fn from(row: ReceiptLineRow) -> Self {
        ReceiptLine {
            product_id: row.product_id,
            product_name: row.product_name,
            brand: row.brand,
            qty: row.qty,
            unit_price: Money::from_major_f64(row.unit_price),
            line_total: Money::from_major_f64(row.line_total),
        }
    }
}

/// Repository for ledger operations.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Writes the transaction and all of its items atomically.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - exit code already used (same second)
    /// * `DbError::ForeignKeyViolation` - an item's product is not in the catalog
    /// * `DbError::TransactionFailed` - begin/commit failed
    ///
    /// Nothing is retried and nothing is left half-written.
    pub async fn commit(&self, new: &NewTransaction) -> DbResult<CommittedTransaction> {
        let txn = &new.transaction;
        debug!(trans_id = %txn.trans_id, items = new.items.len(), "Committing transaction");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO transactions (
                trans_id, timestamp, customer_name, subtotal, tax_amount,
                tax_rate_bps, total, utr, exit_code, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&txn.trans_id)
        .bind(txn.timestamp.format(TIMESTAMP_FORMAT).to_string())
        .bind(&txn.customer_name)
        .bind(txn.subtotal.to_major_f64())
        .bind(txn.tax_amount.to_major_f64())
        .bind(i64::from(txn.tax_rate.bps()))
        .bind(txn.total.to_major_f64())
        .bind(&txn.utr)
        .bind(&txn.exit_code)
        .bind(txn.status)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } if field.ends_with("exit_code") => {
                DbError::duplicate(field, &txn.exit_code)
            }
            other => other,
        })?;

        for item in &new.items {
            sqlx::query(
                r#"
                INSERT INTO transaction_items (trans_id, product_id, qty, unit_price, line_total)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(&item.trans_id)
            .bind(item.product_id)
            .bind(item.qty)
            .bind(item.unit_price.to_major_f64())
            .bind(item.line_total.to_major_f64())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            trans_id = %txn.trans_id,
            exit_code = %txn.exit_code,
            total = %txn.total,
            "Transaction committed"
        );

        Ok(CommittedTransaction {
            trans_id: txn.trans_id.clone(),
            exit_code: txn.exit_code.clone(),
        })
    }

    /// Looks up the transaction an exit code belongs to, with its items.
    ///
    /// The code is trimmed, then matched exactly.
    pub async fn find_by_exit_code(&self, exit_code: &str) -> DbResult<Option<TransactionRecord>> {
        let exit_code = exit_code.trim();
        debug!(exit_code = %exit_code, "Looking up exit code");

        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {} FROM transactions WHERE exit_code = ?1",
            TRANSACTION_COLUMNS
        ))
        .bind(exit_code)
        .fetch_optional(&self.pool)
        .await?;

        self.with_items(row).await
    }

    /// Gets a transaction and its items by transaction id.
    pub async fn get_by_id(&self, trans_id: &str) -> DbResult<Option<TransactionRecord>> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {} FROM transactions WHERE trans_id = ?1",
            TRANSACTION_COLUMNS
        ))
        .bind(trans_id.trim())
        .fetch_optional(&self.pool)
        .await?;

        self.with_items(row).await
    }

    /// Newest transactions first, without items.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {} FROM transactions ORDER BY timestamp DESC LIMIT ?1",
            TRANSACTION_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Revenue, transaction count and catalog size.
    pub async fn sales_stats(&self) -> DbResult<SalesStats> {
        let (total_sales, transaction_count): (f64, i64) =
            sqlx::query_as("SELECT COALESCE(SUM(total), 0.0), COUNT(*) FROM transactions")
                .fetch_one(&self.pool)
                .await?;

        let product_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(SalesStats {
            total_sales: Money::from_major_f64(total_sales),
            transaction_count,
            product_count,
        })
    }

    async fn with_items(&self, row: Option<TransactionRow>) -> DbResult<Option<TransactionRecord>> {
        let Some(row) = row else {
            return Ok(None);
        };
        let transaction = Transaction::try_from(row)?;

        // LEFT JOIN: a product removed from the catalog must not hide the sale
        let items = sqlx::query_as::<_, ReceiptLineRow>(
            r#"
            SELECT
                ti.product_id,
                COALESCE(p.product_name, 'Unknown product') AS product_name,
                COALESCE(p.brand, '') AS brand,
                ti.qty,
                ti.unit_price,
                ti.line_total
            FROM transaction_items ti
            LEFT JOIN products p ON p.product_id = ti.product_id
            WHERE ti.trans_id = ?1
            ORDER BY ti.id
            "#,
        )
        .bind(&transaction.trans_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(TransactionRecord {
            transaction,
            items: items.into_iter().map(ReceiptLine::from).collect(),
        }))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use crate::DbError;
    use checkout_core::{CheckoutSession, Money, NewTransaction, Product, TaxRate};
    use chrono::{NaiveDate, NaiveDateTime};

    fn product(id: i64, barcode: &str, name: &str, paise: i64) -> Product {
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

    fn at(second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_micro_opt(14, 3, second, 250_000))
            .unwrap()
    }

    async fn seeded() -> (Database, Product, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let milk = product(1, "8901262150101", "Taaza Milk 500ml", 4900);
        let butter = product(2, "8901262010016", "Butter 500g", 12000);
        db.products().upsert(&milk).await.unwrap();
        db.products().upsert(&butter).await.unwrap();
        (db, milk, butter)
    }

    fn paid(milk: &Product, butter: &Product, second: u32, suffix: &str) -> NewTransaction {
        let mut session = CheckoutSession::new(TaxRate::from_bps(1800)).with_customer("Ravi");
        session.cart_mut().add_product(milk);
        session.cart_mut().add_product(milk);
        session.cart_mut().add_product(butter);
        NewTransaction::from_session(&session, "412345678901", at(second), suffix).unwrap()
    }

    #[tokio::test]
    async fn test_commit_then_find_by_exit_code() {
        let (db, milk, butter) = seeded().await;
        let repo = db.transactions();
        let new = paid(&milk, &butter, 22, "9f86d081");

        let committed = repo.commit(&new).await.unwrap();
        assert_eq!(committed.exit_code, "EXIT-20240501140322");
        assert_eq!(committed.trans_id, "TXN-20240501140322-9f86d081");

        let record = repo
            .find_by_exit_code(&committed.exit_code)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.transaction, new.transaction);
        assert_eq!(record.transaction.total.paise(), 25724);
        assert_eq!(record.item_count(), 2);
        assert_eq!(record.items[0].display_name(), "Taaza Milk 500ml (Amul)");
        assert_eq!(record.items[0].qty, 2);
        assert_eq!(record.items[0].line_total.paise(), 9800);
        assert_eq!(record.items[1].unit_price.paise(), 12000);
    }

    #[tokio::test]
    async fn test_exit_lookup_trims_and_misses() {
        let (db, milk, butter) = seeded().await;
        let repo = db.transactions();
        repo.commit(&paid(&milk, &butter, 22, "9f86d081")).await.unwrap();

        assert!(repo
            .find_by_exit_code("  EXIT-20240501140322\n")
            .await
            .unwrap()
            .is_some());
        assert!(repo.find_by_exit_code("EXIT-19990101000000").await.unwrap().is_none());
        assert!(repo.find_by_exit_code("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_same_second_exit_code_is_rejected_whole() {
        let (db, milk, butter) = seeded().await;
        let repo = db.transactions();
        repo.commit(&paid(&milk, &butter, 22, "aaaaaaaa")).await.unwrap();

        let err = repo
            .commit(&paid(&milk, &butter, 22, "bbbbbbbb"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());

        assert!(repo
            .get_by_id("TXN-20240501140322-bbbbbbbb")
            .await
            .unwrap()
            .is_none());
        assert_eq!(repo.sales_stats().await.unwrap().transaction_count, 1);
    }

    #[tokio::test]
    async fn test_failed_item_insert_rolls_back() {
        let (db, milk, butter) = seeded().await;
        let repo = db.transactions();
        let mut new = paid(&milk, &butter, 22, "9f86d081");
        new.items[1].product_id = 999;

        let err = repo.commit(&new).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        assert!(repo
            .find_by_exit_code("EXIT-20240501140322")
            .await
            .unwrap()
            .is_none());
        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transaction_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_recent_and_stats() {
        let (db, milk, butter) = seeded().await;
        let repo = db.transactions();
        repo.commit(&paid(&milk, &butter, 10, "00000001")).await.unwrap();
        repo.commit(&paid(&milk, &butter, 30, "00000002")).await.unwrap();

        let recent = repo.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].trans_id, "TXN-20240501140330-00000002");
        assert_eq!(repo.recent(1).await.unwrap().len(), 1);

        let stats = repo.sales_stats().await.unwrap();
        assert_eq!(stats.transaction_count, 2);
        assert_eq!(stats.product_count, 2);
        assert_eq!(stats.total_sales.paise(), 2 * 25724);
    }

    #[tokio::test]
    async fn test_tax_rate_is_stored_per_transaction() {
        let (db, milk, butter) = seeded().await;
        let repo = db.transactions();

        let mut session = CheckoutSession::new(TaxRate::from_bps(825));
        session.cart_mut().add_product(&butter);
        let new = NewTransaction::from_session(&session, "UTR825", at(40), "0000825a").unwrap();
        repo.commit(&new).await.unwrap();
        repo.commit(&paid(&milk, &butter, 41, "0000180a")).await.unwrap();

        let low = repo.get_by_id("TXN-20240501140340-0000825a").await.unwrap().unwrap();
        assert_eq!(low.transaction.tax_rate.bps(), 825);
        assert_eq!(low.transaction.tax_amount.paise(), 990);

        let high = repo.find_by_exit_code("EXIT-20240501140341").await.unwrap().unwrap();
        assert_eq!(high.transaction.tax_rate.bps(), 1800);
    }

    #[tokio::test]
    async fn test_rows_without_rate_imply_it() {
        let (db, _, _) = seeded().await;
        sqlx::query(
            r#"
            INSERT INTO transactions
                (trans_id, timestamp, customer_name, subtotal, tax_amount, total, utr, exit_code)
            VALUES ('TXN-old', '2023-01-02T10:00:00.000000', 'Anonymous', 218.0, 39.24, 257.24, 'U', 'EXIT-old')
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let record = db.transactions().find_by_exit_code("EXIT-old").await.unwrap().unwrap();
        assert_eq!(record.transaction.tax_rate.bps(), 1800);
        assert!(record.items.is_empty());

        assert_eq!(super::implied_tax_rate(Money::zero(), Money::zero()).bps(), 0);
    }

    #[tokio::test]
    async fn test_empty_ledger_stats() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let stats = db.transactions().sales_stats().await.unwrap();
        assert!(stats.total_sales.is_zero());
        assert_eq!(stats.transaction_count, 0);
    }
}
