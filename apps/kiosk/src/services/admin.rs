//! # Admin Service
//!
//! Password-gated store maintenance: catalog loads, sales analytics and a
//! read-only database browser.
//!
//! ```text
//! AdminGate::unlock(password)
//!     │  argon2 verify against [admin] password_hash
//!     ▼
//! AdminSession
//!     ├── load_catalog(csv)      → LoadReport
//!     ├── sales_stats()          → SalesStats
//!     ├── recent_transactions(n) → newest first
//!     └── browse_products() / browse_transactions()
//! ```

use std::path::Path;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::Local;
use tracing::{info, warn};

use checkout_core::{parse_catalog, Product, SalesStats, Transaction};
use checkout_db::{Database, LoadReport};

use crate::config::KioskConfig;
use crate::error::{AppError, AppResult};

/// Rows shown by `admin recent` unless asked otherwise.
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

const BROWSE_PRODUCT_LIMIT: u32 = 50;
const BROWSE_TRANSACTION_LIMIT: u32 = 20;

/// Hashes a password into a PHC string for `[admin] password_hash`.
pub fn hash_password(password: &str) -> AppResult<String> {
    if password.is_empty() {
        return Err(AppError::validation("password is required"));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Checks the admin password before handing out an [`AdminSession`].
#[derive(Debug, Clone)]
pub struct AdminGate {
    password_hash: Option<String>,
}

impl AdminGate {
    pub fn new(password_hash: Option<String>) -> Self {
        AdminGate { password_hash }
    }

    pub fn from_config(config: &KioskConfig) -> Self {
        AdminGate::new(config.admin.password_hash.clone())
    }

    /// ## Errors
    /// * `AuthenticationError` - no hash configured, or wrong password
    pub fn unlock(&self, db: Database, password: &str) -> AppResult<AdminSession> {
        let Some(hash) = &self.password_hash else {
            return Err(AppError::authentication("admin password not configured"));
        };

        if !verify_password(password, hash) {
            warn!("Admin login rejected");
            return Err(AppError::authentication("incorrect admin password"));
        }

        info!("Admin session opened");
        Ok(AdminSession { db })
    }
}

/// An unlocked admin session.
#[derive(Debug, Clone)]
pub struct AdminSession {
    db: Database,
}

impl AdminSession {
    /// Loads a catalog CSV, upserting every valid row.
    ///
    /// Bad rows are skipped and listed in the report; the rest still load.
    ///
    /// ## Errors
    /// * `IoError` - file unreadable or not CSV
    /// * `ValidationError` - header lacks a required column
    pub async fn load_catalog(&self, path: &Path) -> AppResult<LoadReport> {
        let bytes = tokio::fs::read(path).await?;
        let import = parse_catalog(bytes.as_slice(), Local::now().naive_local())?;

        let report = self.db.products().load_catalog(import).await?;
        info!(
            path = %path.display(),
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "Catalog loaded"
        );
        Ok(report)
    }

    pub async fn sales_stats(&self) -> AppResult<SalesStats> {
        Ok(self.db.transactions().sales_stats().await?)
    }

    /// Newest first.
    pub async fn recent_transactions(&self, limit: u32) -> AppResult<Vec<Transaction>> {
        Ok(self.db.transactions().recent(limit).await?)
    }

    pub async fn browse_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.db.products().list(BROWSE_PRODUCT_LIMIT).await?)
    }

    pub async fn browse_transactions(&self) -> AppResult<Vec<Transaction>> {
        Ok(self.db.transactions().recent(BROWSE_TRANSACTION_LIMIT).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
