//! # Exit Verifier
//!
//! The guard's checkpoint: confirms that a shopper leaving the store holds
//! a paid transaction.
//!
//! ## Decision
//! ```text
//!   raw input
//!       │
//!       ▼
//!   ExitInput::parse ──► NotApplicable (product barcode, noise)
//!       │
//!       ▼
//!   ledger lookup by exit code ──none──► Denied(UnknownCode)
//!       │
//!       ▼
//!   full pass? TXN/TOTAL agree ──no──► Denied(PayloadMismatch)
//!       │
//!       ▼
//!   Approved(record)
//! ```
//!
//! Verification only reads, so the same pass can be checked any number of
//! times.

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use checkout_core::{ExitInput, TransactionRecord};
use checkout_db::Database;

use crate::error::AppResult;

/// Why an exit code was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// No transaction carries this exit code.
    UnknownCode,
    /// The pass names a different transaction or total than the ledger.
    PayloadMismatch,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::UnknownCode => f.write_str("invalid exit code"),
            DenialReason::PayloadMismatch => f.write_str("exit pass does not match the recorded sale"),
        }
    }
}

/// Outcome of checking one input at the exit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Verification {
    /// Input was not an exit code; nothing was looked up.
    NotApplicable,
    Approved(TransactionRecord),
    Denied {
        exit_code: String,
        reason: DenialReason,
    },
}

impl Verification {
    pub fn is_approved(&self) -> bool {
        matches!(self, Verification::Approved(_))
    }
}

/// Looks exit codes up in the ledger.
#[derive(Debug, Clone)]
pub struct ExitVerifier {
    db: Database,
}

impl ExitVerifier {
    pub fn new(db: Database) -> Self {
        ExitVerifier { db }
    }

    /// Verifies typed or scanned input.
    ///
    /// Accepts `EXIT-<ts>` or a full `EXIT:<code>|TOTAL:..|TXN:..` payload.
    /// Surrounding whitespace is ignored.
    pub async fn verify(&self, raw: &str) -> AppResult<Verification> {
        let input = ExitInput::parse(raw);
        let Some(code) = input.exit_code() else {
            return Ok(Verification::NotApplicable);
        };

        let Some(record) = self.db.transactions().find_by_exit_code(code).await? else {
            warn!(exit_code = %code, "Exit denied: unknown code");
            return Ok(Verification::Denied {
                exit_code: code.to_string(),
                reason: DenialReason::UnknownCode,
            });
        };

        if let ExitInput::Pass(pass) = &input {
            if !pass.matches(&record.transaction) {
                warn!(
                    exit_code = %code,
                    pass_txn = %pass.trans_id,
                    pass_total = %pass.total,
                    "Exit denied: pass does not match ledger"
                );
                return Ok(Verification::Denied {
                    exit_code: code.to_string(),
                    reason: DenialReason::PayloadMismatch,
                });
            }
        }

        info!(
            exit_code = %code,
            trans_id = %record.transaction.trans_id,
            "Exit approved"
        );
        Ok(Verification::Approved(record))
    }

    /// Verifies every exit code found in an image.
    ///
    /// Codes that are not exit codes (product barcodes in the frame) are
    /// skipped, so an image without an exit pass gives an empty list.
    ///
    /// ## Errors
    /// * `DecodingUnavailable` - the guard should type the code instead
    pub async fn verify_image(&self, bytes: &[u8]) -> AppResult<Vec<Verification>> {
        let payloads = checkout_render::decode_image(bytes)?;
        let mut results = Vec::new();

        for payload in payloads {
            match self.verify(&payload).await? {
                Verification::NotApplicable => {}
                outcome => results.push(outcome),
            }
        }

        Ok(results)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
