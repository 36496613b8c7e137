//! # Exit Checkpoint Command

use std::io::Write;

use crate::cli::VerifyArgs;
use crate::error::{AppError, AppResult};
use crate::services::{ExitVerifier, Verification};

/// `kiosk verify`. Returns true only if something was approved.
///
/// An image with several exit passes approves if any of them does.
pub async fn run_verify(
    verifier: &ExitVerifier,
    args: VerifyArgs,
    symbol: &str,
    out: &mut impl Write,
) -> AppResult<bool> {
    let outcomes = match (&args.code, &args.image) {
        (Some(code), _) => vec![verifier.verify(code).await?],
        (None, Some(path)) => {
            let bytes = tokio::fs::read(path).await?;
            verifier.verify_image(&bytes).await?
        }
        (None, None) => return Err(AppError::validation("an exit code or --image is required")),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&outcomes)
            .map_err(|e| AppError::internal(e.to_string()))?;
        writeln!(out, "{}", json)?;
    } else if outcomes.is_empty() {
        writeln!(out, "No exit code found")?;
    } else {
        for outcome in &outcomes {
            print_outcome(out, outcome, symbol)?;
        }
    }

    Ok(outcomes.iter().any(Verification::is_approved))
}

fn print_outcome(out: &mut impl Write, outcome: &Verification, symbol: &str) -> AppResult<()> {
    match outcome {
        Verification::NotApplicable => writeln!(out, "Not an exit code")?,
        Verification::Denied { exit_code, reason } => {
            writeln!(out, "DENIED {}: {}", exit_code, reason)?;
        }
        Verification::Approved(record) => {
            let txn = &record.transaction;
            writeln!(out, "APPROVED {}", txn.exit_code)?;
            writeln!(out, "  Transaction: {}", txn.trans_id)?;
            writeln!(out, "  Customer: {}", txn.customer_name)?;
            writeln!(out, "  Time: {}", txn.timestamp.format("%Y-%m-%d %H:%M:%S"))?;
            writeln!(out, "  Total: {}", txn.total.with_symbol(symbol))?;
            for item in &record.items {
                writeln!(out, "  - {} x{}", item.display_name(), item.qty)?;
            }
        }
    }
    Ok(())
}
