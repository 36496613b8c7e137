//! # Validation Module
//!
//! Input validation for catalog rows, checkout input and configuration.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: kiosk (clap)                                                 │
//! │  └── Argument presence and types                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Catalog row fields (barcode, name, stock)                         │
//! │  └── Customer name, payment reference, tax rate                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::ANONYMOUS_CUSTOMER;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_BARCODE_LEN: usize = 64;
const MAX_NAME_LEN: usize = 200;
const MAX_REFERENCE_LEN: usize = 64;

// =============================================================================
// String Validators
// =============================================================================

/// Validates and trims a barcode.
///
/// ```rust
/// use checkout_core::validation::validate_barcode;
///
/// assert_eq!(validate_barcode(" 8901030865278 ").unwrap(), "8901030865278");
/// assert!(validate_barcode("   ").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<String> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }

    if barcode.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must not contain spaces".to_string(),
        });
    }

    Ok(barcode.to_string())
}

/// Validates a product name (non-empty, at most 200 characters).
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "product_name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "product_name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Normalizes the optional customer name; blank means anonymous.
pub fn normalize_customer_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => ANONYMOUS_CUSTOMER.to_string(),
    }
}

/// Validates a payment reference (UTR).
///
/// The reference is never checked against a payment processor; it only
/// has to be present.
pub fn validate_payment_reference(utr: &str) -> ValidationResult<String> {
    let utr = utr.trim();

    if utr.is_empty() {
        return Err(ValidationError::Required {
            field: "utr".to_string(),
        });
    }

    if utr.len() > MAX_REFERENCE_LEN {
        return Err(ValidationError::TooLong {
            field: "utr".to_string(),
            max: MAX_REFERENCE_LEN,
        });
    }

    Ok(utr.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock quantity.
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "stock_quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price in paise. Zero is allowed (free items).
pub fn validate_price_paise(paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::InvalidFormat {
            field: "tax_rate_bps".to_string(),
            reason: format!("{} exceeds 10000 (100%)", bps),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
