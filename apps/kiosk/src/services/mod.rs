//! # Services
//!
//! The kiosk's three jobs, each over a shared [`checkout_db::Database`].
//!
//! ```text
//! services/
//! ├── checkout.rs ◄─── scan, pay, render receipts, reprint
//! ├── exit.rs     ◄─── exit checkpoint verification
//! └── admin.rs    ◄─── password gate, catalog load, analytics
//! ```
//!
//! Services never print. Commands and the shell decide how results and
//! warnings reach the user.

pub mod admin;
pub mod checkout;
pub mod exit;

pub use admin::{hash_password, AdminGate, AdminSession};
pub use checkout::{save_receipt, CheckoutService, Receipt, ScanReport};
pub use exit::{DenialReason, ExitVerifier, Verification};
