//! # Catalog Import
//!
//! Parses a product CSV into [`Product`]s. Bad rows are collected, not fatal;
//! only a header without the required columns fails the whole import.
//!
//! ## Columns
//! ```text
//! required  product_id, barcode, product_name, brand, category, price
//! optional  stock_quantity (100), description (""), image_url,
//!           created_at / updated_at (load time)
//! ```

use std::io::Read;

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::validation::{
    validate_barcode, validate_price_paise, validate_product_name, validate_stock_quantity,
};
use crate::DEFAULT_STOCK_QUANTITY;

/// Columns every catalog file must have.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "product_id",
    "barcode",
    "product_name",
    "brand",
    "category",
    "price",
];

/// A parsed product and the 1-based data row it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub row: usize,
    pub product: Product,
}

/// A row that could not become a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// 1-based data row (the header is row 0).
    pub row: usize,
    /// Raw `product_id` cell, if there was one.
    pub product_id: Option<String>,
    pub reason: String,
}

/// Result of parsing a catalog file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogImport {
    pub entries: Vec<CatalogEntry>,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRow {
    product_id: Option<String>,
    barcode: Option<String>,
    product_name: Option<String>,
    brand: Option<String>,
    category: Option<String>,
    price: Option<String>,
    stock_quantity: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

/// Parses catalog CSV from `reader`.
///
/// `loaded_at` fills in missing `created_at` / `updated_at`.
///
/// ## Errors
/// - `Validation(MissingColumns)` if the header lacks a required column
/// - `Catalog` if the header itself cannot be read
pub fn parse_catalog<R: Read>(reader: R, loaded_at: NaiveDateTime) -> CoreResult<CatalogImport> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader);

    let headers = csv
        .headers()
        .map_err(|e| CoreError::Catalog(e.to_string()))?
        .clone();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingColumns { columns: missing }.into());
    }

    let timestamp = loaded_at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
    let mut import = CatalogImport::default();

    for (index, record) in csv.deserialize::<RawRow>().enumerate() {
        let row = index + 1;
        let raw = match record {
            Ok(raw) => raw,
            Err(e) => {
                import.rejected.push(RejectedRow {
                    row,
                    product_id: None,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let raw_id = cell(&raw.product_id).map(str::to_string);
        match product_from_row(raw, &timestamp) {
            Ok(product) => import.entries.push(CatalogEntry { row, product }),
            Err(e) => import.rejected.push(RejectedRow {
                row,
                product_id: raw_id,
                reason: e.to_string(),
            }),
        }
    }

    Ok(import)
}

/// Trimmed, non-empty cell contents.
fn cell(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn product_from_row(raw: RawRow, timestamp: &str) -> Result<Product, ValidationError> {
    let product_id = cell(&raw.product_id)
        .ok_or_else(|| ValidationError::Required {
            field: "product_id".to_string(),
        })?
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: "product_id".to_string(),
            reason: "must be an integer".to_string(),
        })?;

    let barcode = validate_barcode(cell(&raw.barcode).unwrap_or(""))?;
    let product_name = validate_product_name(cell(&raw.product_name).unwrap_or(""))?;

    let price = Money::parse_decimal(cell(&raw.price).unwrap_or(""))?;
    validate_price_paise(price.paise())?;

    let stock_quantity = match cell(&raw.stock_quantity) {
        Some(value) => value.parse::<i64>().map_err(|_| ValidationError::InvalidFormat {
            field: "stock_quantity".to_string(),
            reason: "must be an integer".to_string(),
        })?,
        None => DEFAULT_STOCK_QUANTITY,
    };
    validate_stock_quantity(stock_quantity)?;

    Ok(Product {
        product_id,
        barcode,
        product_name,
        brand: cell(&raw.brand).unwrap_or("").to_string(),
        category: cell(&raw.category).unwrap_or("").to_string(),
        price,
        stock_quantity,
        description: cell(&raw.description).unwrap_or("").to_string(),
        image_url: cell(&raw.image_url).map(str::to_string),
        created_at: cell(&raw.created_at).unwrap_or(timestamp).to_string(),
        updated_at: cell(&raw.updated_at).unwrap_or(timestamp).to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn loaded_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap()
    }

    const HEADER: &str = "product_id,barcode,product_name,brand,category,price,stock_quantity\n";

    #[test]
    fn test_parses_valid_rows_with_defaults() {
        let csv = "product_id,barcode,product_name,brand,category,price\n\
                   1,8901262150101,Taaza Milk 500ml,Amul,Dairy,49.00\n";
        let import = parse_catalog(csv.as_bytes(), loaded_at()).unwrap();

        assert!(import.rejected.is_empty());
        let product = &import.entries[0].product;
        assert_eq!(import.entries[0].row, 1);
        assert_eq!(product.product_id, 1);
        assert_eq!(product.price.paise(), 4900);
        assert_eq!(product.stock_quantity, 100);
        assert_eq!(product.description, "");
        assert_eq!(product.image_url, None);
        assert_eq!(product.created_at, "2024-05-01T09:00:00.000000");
    }

    #[test]
    fn test_missing_price_row_is_skipped_and_reported() {
        let csv = format!(
            "{}1,8901262150101,Taaza Milk 500ml,Amul,Dairy,49.00,20\n\
             2,8901262010016,Butter 500g,Amul,Dairy,,15\n\
             3,8901030865278,Surf Excel 1kg,HUL,Home,120,8\n",
            HEADER
        );
        let import = parse_catalog(csv.as_bytes(), loaded_at()).unwrap();

        assert_eq!(import.entries.len(), 2);
        assert_eq!(import.rejected.len(), 1);
        assert_eq!(import.rejected[0].row, 2);
        assert_eq!(import.rejected[0].product_id.as_deref(), Some("2"));
        assert_eq!(import.rejected[0].reason, "price is required");
    }

    #[test]
    fn test_invalid_types_are_rejected() {
        let csv = format!(
            "{}abc,111,A,B,C,1.00,1\n\
             5,222,B,B,C,free,1\n\
             6,333,C,B,C,-1,1\n\
             7,444,D,B,C,1,lots\n\
             8,,E,B,C,1,1\n\
             9,555,F,B,C,1,-3\n",
            HEADER
        );
        let import = parse_catalog(csv.as_bytes(), loaded_at()).unwrap();

        assert!(import.entries.is_empty());
        let rows: Vec<usize> = import.rejected.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_short_record_is_rejected_not_fatal() {
        let csv = format!("{}1,111,A,B,C\n2,222,B,B,C,2.50,4\n", HEADER);
        let import = parse_catalog(csv.as_bytes(), loaded_at()).unwrap();

        assert_eq!(import.entries.len(), 1);
        assert_eq!(import.entries[0].product.product_id, 2);
        assert_eq!(import.rejected[0].row, 1);
    }

    #[test]
    fn test_missing_required_column_fails_whole_load() {
        let csv = "product_id,barcode,product_name,brand,category\n1,111,A,B,C\n";
        let err = parse_catalog(csv.as_bytes(), loaded_at()).unwrap_err();

        match err {
            CoreError::Validation(ValidationError::MissingColumns { columns }) => {
                assert_eq!(columns, vec!["price".to_string()])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let csv = "product_id,barcode,product_name,brand,category,price,aisle\n\
                   1,111,A,B,C,10,7\n";
        let import = parse_catalog(csv.as_bytes(), loaded_at()).unwrap();
        assert_eq!(import.entries.len(), 1);
    }
}
