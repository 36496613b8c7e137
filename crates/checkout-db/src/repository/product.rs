//! # Product Repository
//!
//! The catalog: barcode lookups for the scanner, upserts for catalog loads.
//!
//! ## Catalog Load
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How a Catalog File Is Loaded                         │
//! │                                                                         │
//! │  products.csv                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  checkout_core::parse_catalog  ──► rejected rows (bad price, ...)       │
//! │       │                                   │                             │
//! │       ▼                                   │                             │
//! │  upsert() per entry ──► store error? ─────┤                             │
//! │       │                 (barcode clash)   │                             │
//! │       ▼                                   ▼                             │
//! │  LoadReport { loaded: 2, skipped: [row 2 (2): price is required] }      │
//! │                                                                         │
//! │  One bad row never aborts the load.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use checkout_core::{CatalogImport, Money, Product, RejectedRow};

const PRODUCT_COLUMNS: &str = "product_id, barcode, product_name, brand, category, price, \
     stock_quantity, description, image_url, created_at, updated_at";

/// A `products` row as SQLite returns it.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    product_id: i64,
    barcode: String,
    product_name: String,
    brand: Option<String>,
    category: Option<String>,
    price: f64,
    stock_quantity: Option<i64>,
    description: Option<String>,
    image_url: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            product_id: row.product_id,
            barcode: row.barcode,
            product_name: row.product_name,
            brand: row.brand.unwrap_or_default(),
            category: row.category.unwrap_or_default(),
            price: Money::from_major_f64(row.price),
            stock_quantity: row.stock_quantity.unwrap_or(checkout_core::DEFAULT_STOCK_QUANTITY),
            description: row.description.unwrap_or_default(),
            image_url: row.image_url,
            created_at: row.created_at.unwrap_or_default(),
            updated_at: row.updated_at.unwrap_or_default(),
        }
    }
}

/// A catalog row that did not make it into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based data row in the source file.
    pub row: usize,
    pub product_id: Option<String>,
    pub reason: String,
}

impl From<RejectedRow> for SkippedRow {
    fn from(rejected: RejectedRow) -> Self {
        SkippedRow {
            row: rejected.row,
            product_id: rejected.product_id,
            reason: rejected.reason,
        }
    }
}

/// Outcome of a catalog load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Ordered by row number.
    pub skipped: Vec<SkippedRow>,
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let milk = repo.get_by_barcode(" 8901262150101 ").await?;
/// let report = repo.load_catalog(import).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Looks up a product by its printed barcode.
    ///
    /// Surrounding whitespace from the scanner is ignored; otherwise the
    /// match is exact.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - No product carries this barcode
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let barcode = barcode.trim();
        debug!(barcode = %barcode, "Looking up product");

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE barcode = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Gets a product by its catalog id.
    pub async fn get_by_id(&self, product_id: i64) -> DbResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE product_id = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Inserts `product`, or overwrites every column of the row with the
    /// same `product_id`.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - the barcode belongs to another product
    pub async fn upsert(&self, product: &Product) -> DbResult<()> {
        debug!(product_id = product.product_id, barcode = %product.barcode, "Upserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                product_id, barcode, product_name, brand, category, price,
                stock_quantity, description, image_url, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(product_id) DO UPDATE SET
                barcode = excluded.barcode,
                product_name = excluded.product_name,
                brand = excluded.brand,
                category = excluded.category,
                price = excluded.price,
                stock_quantity = excluded.stock_quantity,
                description = excluded.description,
                image_url = excluded.image_url,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(product.product_id)
        .bind(&product.barcode)
        .bind(&product.product_name)
        .bind(&product.brand)
        .bind(&product.category)
        .bind(product.price.to_major_f64())
        .bind(product.stock_quantity)
        .bind(&product.description)
        .bind(&product.image_url)
        .bind(&product.created_at)
        .bind(&product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &product.barcode),
            other => other,
        })?;

        Ok(())
    }

    /// Writes a parsed catalog.
    ///
    /// Rows the parser rejected and rows the store refuses both end up in
    /// [`LoadReport::skipped`]; everything else is upserted.
    pub async fn load_catalog(&self, import: CatalogImport) -> DbResult<LoadReport> {
        let mut report = LoadReport {
            loaded: 0,
            skipped: import.rejected.into_iter().map(SkippedRow::from).collect(),
        };

        for entry in import.entries {
            match self.upsert(&entry.product).await {
                Ok(()) => report.loaded += 1,
                Err(e) => {
                    warn!(row = entry.row, product_id = entry.product.product_id, error = %e, "Catalog row skipped");
                    report.skipped.push(SkippedRow {
                        row: entry.row,
                        product_id: Some(entry.product.product_id.to_string()),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.skipped.sort_by_key(|s| s.row);

        info!(
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "Catalog load finished"
        );
        Ok(report)
    }

    /// First `limit` products by id (admin browser).
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY product_id LIMIT ?1",
            PRODUCT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Counts catalog products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
