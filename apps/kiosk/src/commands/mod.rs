//! # Command Handlers
//!
//! One handler per CLI area. Handlers call services and write human
//! output to any `std::io::Write`, so tests can capture it.
//!
//! ```text
//! commands/
//! ├── mod.rs      ◄─── shared printing
//! ├── checkout.rs ◄─── kiosk checkout / reprint
//! ├── shell.rs    ◄─── kiosk shell
//! ├── verify.rs   ◄─── kiosk verify
//! └── admin.rs    ◄─── kiosk admin
//! ```

pub mod admin;
pub mod checkout;
pub mod shell;
pub mod verify;

use std::io::Write;
use std::path::Path;

use checkout_core::Cart;
use tracing::warn;

use crate::error::AppResult;
use crate::services::{save_receipt, Receipt};

/// Features this build was compiled without, as shopper-facing notes.
pub(crate) fn missing_capabilities() -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !checkout_render::decoder_available() {
        missing.push("image scanning is not available, type barcodes instead");
    }
    if !checkout_render::encoder_available() {
        missing.push("exit QR codes are not available, show the exit code instead");
    }
    if !checkout_render::pdf_available() {
        missing.push("PDF invoices are not available, text invoices only");
    }
    missing
}

/// Prints a note per missing capability.
pub(crate) fn report_capabilities(out: &mut impl Write) -> AppResult<()> {
    for note in missing_capabilities() {
        warn!(note, "Capability unavailable");
        writeln!(out, "note: {}", note)?;
    }
    Ok(())
}

/// Prints the cart lines and totals.
pub(crate) fn print_cart(out: &mut impl Write, cart: &Cart, symbol: &str) -> AppResult<()> {
    if cart.is_empty() {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    }

    for line in cart.lines() {
        writeln!(
            out,
            "  {:<30} x{:<3} {:>10}",
            line.product.display_name(),
            line.quantity,
            line.line_total().with_symbol(symbol)
        )?;
    }

    let summary = cart.summarize();
    writeln!(out, "  Subtotal: {}", summary.subtotal.with_symbol(symbol))?;
    writeln!(
        out,
        "  Tax ({}): {}",
        cart.tax_rate().label(),
        summary.tax.with_symbol(symbol)
    )?;
    writeln!(out, "  Total: {}", summary.total.with_symbol(symbol))?;
    Ok(())
}

/// Prints the invoice and saves its files under `out_dir`.
pub(crate) async fn deliver_receipt(
    out: &mut impl Write,
    receipt: &Receipt,
    out_dir: &Path,
) -> AppResult<()> {
    writeln!(out, "{}", receipt.text)?;

    for warning in &receipt.warnings {
        writeln!(out, "warning: {}", warning)?;
    }

    for path in save_receipt(receipt, out_dir).await? {
        writeln!(out, "saved {}", path.display())?;
    }

    writeln!(out, "Exit code: {}", receipt.exit_code())?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_notes_follow_the_build() {
        let missing = missing_capabilities();
        let everything = checkout_render::decoder_available()
            && checkout_render::encoder_available()
            && checkout_render::pdf_available();
        assert_eq!(missing.is_empty(), everything);

        let mut out = Vec::new();
        report_capabilities(&mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed.lines().count(), missing.len());
    }
}
