//! # Kiosk Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     KIOSK_TAX_RATE_BPS=1800                                             │
//! │     KIOSK_DATABASE_PATH=/var/lib/kiosk/kiosk.db                         │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     --config <path>, or                                                 │
//! │     ~/.config/kiosk/kiosk.toml (Linux)                                  │
//! │     ~/Library/Application Support/com.selfcheckout.kiosk/kiosk.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     18% tax, "Retail360", Rs.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! name = "Retail360"
//! currency_symbol = "Rs."
//!
//! [checkout]
//! tax_rate_bps = 1800   # 18.00%
//!
//! [storage]
//! database_path = "/var/lib/kiosk/kiosk.db"
//! output_dir = "/var/lib/kiosk/receipts"
//!
//! [admin]
//! # kiosk hash-password <password>
//! password_hash = "$argon2id$v=19$m=19456,t=2,p=1$..."
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use checkout_core::validation::validate_tax_rate_bps;
use checkout_core::{TaxRate, DEFAULT_TAX_RATE_BPS};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// `[store]`: what the receipts print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_store_name() -> String {
    "Retail360".to_string()
}

fn default_currency_symbol() -> String {
    "Rs.".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

/// `[checkout]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Flat tax rate in basis points (1800 = 18%).
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: u32,
}

fn default_tax_rate_bps() -> u32 {
    DEFAULT_TAX_RATE_BPS
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            tax_rate_bps: default_tax_rate_bps(),
        }
    }
}

/// `[storage]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Where invoices and exit-pass images are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "selfcheckout", "kiosk")
}

fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("kiosk.db"))
        .unwrap_or_else(|| PathBuf::from("kiosk.db"))
}

fn default_output_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("receipts"))
        .unwrap_or_else(|| PathBuf::from("receipts"))
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            database_path: default_database_path(),
            output_dir: default_output_dir(),
        }
    }
}

/// `[admin]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSettings {
    /// Argon2 PHC string. Admin commands are refused while this is unset.
    #[serde(default)]
    pub password_hash: Option<String>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete kiosk configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KioskConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub admin: AdminSettings,
}

impl KioskConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else the platform config dir)
    /// 3. Environment variables
    ///
    /// A path given explicitly must exist; the platform default may not.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() || explicit {
                info!(?path, "Loading kiosk config from file");
                let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_tax_rate_bps(self.checkout.tax_rate_bps)
            .map_err(|e| ConfigError::invalid("checkout.tax_rate_bps", e.to_string()))?;

        if self.store.name.trim().is_empty() {
            return Err(ConfigError::invalid("store.name", "must not be empty"));
        }

        if let Some(hash) = &self.admin.password_hash {
            argon2::PasswordHash::new(hash)
                .map_err(|e| ConfigError::invalid("admin.password_hash", e.to_string()))?;
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `KIOSK_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(rate) = lookup("KIOSK_TAX_RATE_BPS") {
            match rate.trim().parse::<u32>() {
                Ok(bps) => {
                    debug!(bps, "Overriding tax rate from environment");
                    self.checkout.tax_rate_bps = bps;
                }
                Err(_) => warn!(value = %rate, "Ignoring unparsable KIOSK_TAX_RATE_BPS"),
            }
        }

        if let Some(path) = lookup("KIOSK_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = PathBuf::from(path);
        }

        if let Some(dir) = lookup("KIOSK_OUTPUT_DIR") {
            self.storage.output_dir = PathBuf::from(dir);
        }

        if let Some(name) = lookup("KIOSK_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(symbol) = lookup("KIOSK_CURRENCY_SYMBOL") {
            self.store.currency_symbol = symbol;
        }

        if let Some(hash) = lookup("KIOSK_ADMIN_PASSWORD_HASH") {
            self.admin.password_hash = Some(hash);
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("kiosk.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.checkout.tax_rate_bps)
    }

    pub fn store_name(&self) -> &str {
        &self.store.name
    }

    pub fn currency_symbol(&self) -> &str {
        &self.store.currency_symbol
    }
}
