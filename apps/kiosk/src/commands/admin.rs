//! # Admin Commands

use std::io::Write;

use checkout_core::Transaction;

use crate::cli::AdminAction;
use crate::error::AppResult;
use crate::services::AdminSession;

/// `kiosk admin ...`
pub async fn run_admin(
    session: &AdminSession,
    action: AdminAction,
    symbol: &str,
    out: &mut impl Write,
) -> AppResult<()> {
    match action {
        AdminAction::LoadCatalog { csv } => {
            let report = session.load_catalog(&csv).await?;
            writeln!(out, "Loaded {} products", report.loaded)?;
            for skipped in &report.skipped {
                writeln!(
                    out,
                    "Skipped row {} ({}): {}",
                    skipped.row,
                    skipped.product_id.as_deref().unwrap_or("?"),
                    skipped.reason
                )?;
            }
        }
        AdminAction::Stats => {
            let stats = session.sales_stats().await?;
            writeln!(out, "Total sales: {}", stats.total_sales.with_symbol(symbol))?;
            writeln!(out, "Transactions: {}", stats.transaction_count)?;
            writeln!(out, "Products: {}", stats.product_count)?;
        }
        AdminAction::Recent { limit } => {
            let recent = session.recent_transactions(limit).await?;
            print_transactions(out, &recent, symbol)?;
        }
        AdminAction::Browse => {
            writeln!(out, "Products")?;
            for p in session.browse_products().await? {
                writeln!(
                    out,
                    "  {:>5}  {:<14} {:<40} {:>10}",
                    p.product_id,
                    p.barcode,
                    p.display_name(),
                    p.price.with_symbol(symbol)
                )?;
            }
            writeln!(out, "Transactions")?;
            print_transactions(out, &session.browse_transactions().await?, symbol)?;
        }
    }
    Ok(())
}

fn print_transactions(out: &mut impl Write, txns: &[Transaction], symbol: &str) -> AppResult<()> {
    if txns.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for t in txns {
        writeln!(
            out,
            "  {}  {}  {:<20} {:>12}  {}",
            t.timestamp.format("%Y-%m-%d %H:%M:%S"),
            t.trans_id,
            t.customer_name,
            t.total.with_symbol(symbol),
            t.exit_code
        )?;
    }
    Ok(())
}
