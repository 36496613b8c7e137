//! # Exit Pass
//!
//! The exit pass is the QR payload the shopper shows at the door, and
//! [`ExitInput`] is whatever the guard's scanner or keyboard produced.
//!
//! ## Payload Format
//! ```text
//! EXIT:EXIT-20240501140322|TOTAL:257.24|TXN:TXN-20240501140322-9f86d081
//! └─┬─┘└────────┬────────┘ └────┬─────┘ └──────────────┬──────────────┘
//!  tag      exit code        2 dp total          transaction id
//! ```
//!
//! ## Input Classification
//! ```text
//!   raw input ──trim──┬── "EXIT:..."  → Pass (or bare Code if fields missing)
//!                     ├── "EXIT-..."  → Code
//!                     └── anything    → NotApplicable (not an error)
//! ```

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::Transaction;

const PASS_TAG: &str = "EXIT:";
const CODE_PREFIX: &str = "EXIT-";

/// Contents of an exit-pass QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitPass {
    pub exit_code: String,
    pub total: Money,
    pub trans_id: String,
}

impl ExitPass {
    pub fn for_transaction(transaction: &Transaction) -> Self {
        ExitPass {
            exit_code: transaction.exit_code.clone(),
            total: transaction.total,
            trans_id: transaction.trans_id.clone(),
        }
    }

    /// `EXIT:<code>|TOTAL:<2dp>|TXN:<id>`.
    pub fn payload(&self) -> String {
        format!(
            "{}{}|TOTAL:{}|TXN:{}",
            PASS_TAG, self.exit_code, self.total, self.trans_id
        )
    }

    /// Parses a full payload. Returns `None` unless all three fields are present.
    pub fn parse(payload: &str) -> Option<Self> {
        let body = payload.trim().strip_prefix(PASS_TAG)?;
        let mut parts = body.split('|');

        let exit_code = parts.next()?.trim();
        let total = parts.next()?.trim().strip_prefix("TOTAL:")?;
        let trans_id = parts.next()?.trim().strip_prefix("TXN:")?;
        if exit_code.is_empty() || trans_id.is_empty() || parts.next().is_some() {
            return None;
        }

        Some(ExitPass {
            exit_code: exit_code.to_string(),
            total: Money::parse_decimal(total).ok()?,
            trans_id: trans_id.to_string(),
        })
    }

    /// True when the pass agrees with the stored transaction.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.exit_code == transaction.exit_code
            && self.trans_id == transaction.trans_id
            && self.total == transaction.total
    }
}

/// Classified exit-checkpoint input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitInput {
    /// A bare exit code, typed or scanned.
    Code(String),
    /// A full exit-pass payload.
    Pass(ExitPass),
    /// Not an exit code at all, e.g. a product barcode.
    NotApplicable,
}

impl ExitInput {
    pub fn parse(raw: &str) -> Self {
        let input = raw.trim();

        if let Some(body) = input.strip_prefix(PASS_TAG) {
            if let Some(pass) = ExitPass::parse(input) {
                return ExitInput::Pass(pass);
            }
            // `EXIT:<code>` with the other fields torn off
            let code = body.split('|').next().unwrap_or("").trim();
            if code.is_empty() {
                return ExitInput::NotApplicable;
            }
            return ExitInput::Code(code.to_string());
        }

        if input.starts_with(CODE_PREFIX) {
            return ExitInput::Code(input.to_string());
        }

        ExitInput::NotApplicable
    }

    /// The exit code to look up, if any.
    pub fn exit_code(&self) -> Option<&str> {
        match self {
            ExitInput::Code(code) => Some(code),
            ExitInput::Pass(pass) => Some(&pass.exit_code),
            ExitInput::NotApplicable => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
