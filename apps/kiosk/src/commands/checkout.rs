//! # Checkout Commands

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::cli::CheckoutArgs;
use crate::commands::{deliver_receipt, print_cart};
use crate::error::AppResult;
use crate::services::checkout::is_scan_miss;
use crate::services::CheckoutService;

/// `kiosk checkout`: one full session from the command line.
///
/// Unknown barcodes are reported and skipped, as at the kiosk. In a build
/// without image scanning the frames are skipped with a note and the
/// session carries on with the typed barcodes.
pub async fn run_checkout(
    service: &CheckoutService,
    args: CheckoutArgs,
    out_dir: &Path,
    out: &mut impl Write,
) -> AppResult<()> {
    let mut session = service.new_session();
    if let Some(customer) = &args.customer {
        session.set_customer(customer.as_str());
    }

    for barcode in &args.scans {
        match service.add_scan(&mut session, barcode).await {
            Ok(line) => writeln!(
                out,
                "+ {} (qty {})",
                line.product.display_name(),
                line.quantity
            )?,
            Err(e) if is_scan_miss(&e) => {
                writeln!(out, "! {}", e.message)?;
            }
            Err(e) => return Err(e),
        }
    }

    let images: &[PathBuf] = if args.images.is_empty() || checkout_render::decoder_available() {
        &args.images
    } else {
        warn!(count = args.images.len(), "Image scanning unavailable, images skipped");
        writeln!(out, "! image scanning is not available, use --scan instead")?;
        &[]
    };

    for path in images {
        let bytes = tokio::fs::read(path).await?;
        let report = service.scan_image(&mut session, &bytes).await?;
        for line in &report.added {
            writeln!(out, "+ {} (qty {})", line.product.display_name(), line.quantity)?;
        }
        for code in &report.not_found {
            writeln!(out, "! Product not found: {}", code)?;
        }
        if report.added.is_empty() && report.not_found.is_empty() {
            writeln!(out, "! No code found in {}", path.display())?;
        }
    }

    print_cart(out, session.cart(), service.currency_symbol())?;

    let receipt = service.complete_payment(&mut session, &args.utr).await?;
    deliver_receipt(out, &receipt, out_dir).await
}

/// `kiosk reprint <exit-code>`
pub async fn run_reprint(
    service: &CheckoutService,
    exit_code: &str,
    out_dir: &Path,
    out: &mut impl Write,
) -> AppResult<()> {
    let receipt = service.reprint(exit_code).await?;
    deliver_receipt(out, &receipt, out_dir).await
}
