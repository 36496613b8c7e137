//! # Application Error Type
//!
//! Unified error type for kiosk services and commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Kiosk                              │
//! │                                                                         │
//! │  Shell / CLI                 Services                                   │
//! │  ───────────                 ────────                                   │
//! │                                                                         │
//! │  scan 8901234567890                                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service method: AppResult<T>                                    │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  DbError ────────► NOT_FOUND / PERSISTENCE_ERROR (logged)        │  │
//! │  │  CoreError ──────► PRODUCT_NOT_FOUND / VALIDATION_ERROR          │  │
//! │  │  RenderError ────► ENCODING_ERROR / DECODING_UNAVAILABLE / ...   │  │
//! │  │  ConfigError ────► CONFIG_ERROR                                  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  "[ProductNotFound] Product not found: 8901234567890"                   │
//! │  session continues, cart unchanged                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## JSON Form
//! `kiosk verify --json` prints errors as:
//! ```json
//! { "code": "PRODUCT_NOT_FOUND", "message": "Product not found: 8901234567890" }
//! ```

use serde::Serialize;

use checkout_core::CoreError;
use checkout_db::DbError;
use checkout_render::RenderError;

use crate::config::ConfigError;

/// Error returned from kiosk services.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes surfaced to the shopper, the guard and the admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Scanned barcode has no catalog entry
    ProductNotFound,

    /// Requested transaction or record does not exist
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Ledger or catalog store failed; nothing was written
    PersistenceError,

    /// QR payload could not be encoded
    EncodingError,

    /// Build cannot read codes from images
    DecodingUnavailable,

    /// Build cannot produce PDFs or QR images
    CapabilityUnavailable,

    /// Admin password missing or wrong
    AuthenticationError,

    /// Config file or overrides invalid
    ConfigError,

    /// Reading input files or writing receipts failed
    IoError,

    Internal,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::AuthenticationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to app errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                AppError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
            }
            DbError::UniqueViolation { field, value } => AppError::new(
                ErrorCode::PersistenceError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                AppError::new(ErrorCode::PersistenceError, "Item refers to an unknown product")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                AppError::new(ErrorCode::PersistenceError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                AppError::new(ErrorCode::PersistenceError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                AppError::new(ErrorCode::PersistenceError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                AppError::new(ErrorCode::PersistenceError, "Payment could not be recorded")
            }
            DbError::CorruptValue { column, value } => {
                tracing::error!(%column, %value, "Corrupt stored value");
                AppError::new(ErrorCode::PersistenceError, "Stored record is unreadable")
            }
            DbError::PoolExhausted => {
                AppError::new(ErrorCode::PersistenceError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                AppError::new(ErrorCode::PersistenceError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to app errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ProductNotFound(_) => AppError::new(ErrorCode::ProductNotFound, message),
            CoreError::EmptyCart => AppError::validation(message),
            CoreError::Catalog(_) => AppError::new(ErrorCode::IoError, message),
            CoreError::Validation(e) => AppError::validation(e.to_string()),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        let message = err.to_string();
        match err {
            RenderError::Encoding(_) => AppError::new(ErrorCode::EncodingError, message),
            RenderError::DecodingUnavailable => {
                AppError::new(ErrorCode::DecodingUnavailable, message)
            }
            RenderError::CapabilityUnavailable(_) => {
                AppError::new(ErrorCode::CapabilityUnavailable, message)
            }
            RenderError::Image(_) => AppError::validation(message),
            RenderError::Pdf(e) => {
                tracing::error!("PDF rendering failed: {}", e);
                AppError::internal(message)
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::new(ErrorCode::IoError, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

/// Result type for kiosk services.
pub type AppResult<T> = Result<T, AppError>;

// =============================================================================
// Unit Tests
// =============================================================================
