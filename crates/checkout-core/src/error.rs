//! # Error Types
//!
//! Domain-specific error types for checkout-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  checkout-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  checkout-db errors                                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  checkout-render errors                                                │
//! │  └── RenderError      - QR / PDF capability failures                   │
//! │                                                                         │
//! │  kiosk errors                                                          │
//! │  └── AppError         - What the shopper or operator sees              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → terminal               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No catalog entry for a scanned or typed barcode.
    ///
    /// ## User Workflow
    /// ```text
    /// scan 8901234567890
    ///      │
    ///      ▼
    /// catalog lookup: no row
    ///      │
    ///      ▼
    /// ProductNotFound("8901234567890") → cart unchanged, shopper re-scans
    /// ```
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Payment was attempted on a cart with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// The catalog file could not be read as CSV at all.
    #[error("Catalog file unreadable: {0}")]
    Catalog(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g. a price that is not a decimal number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Catalog header lacks required columns.
    #[error("missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
