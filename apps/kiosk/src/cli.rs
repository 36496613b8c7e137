//! # Command Line
//!
//! ```text
//! kiosk [--config <path>] <command>
//!
//!   checkout       one-shot session: scan, pay, save receipt
//!   shell          interactive kiosk session
//!   verify         exit checkpoint (exit status 0 = approved)
//!   reprint        re-render a past invoice
//!   admin          password-gated catalog load and analytics
//!   hash-password  produce [admin] password_hash for the config file
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::services::admin::DEFAULT_RECENT_LIMIT;

#[derive(Debug, Parser)]
#[command(name = "kiosk")]
#[command(about = "Self-checkout kiosk and exit checkpoint")]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config dir, kiosk.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Store(StoreCommand),

    /// Print an argon2 hash for [admin] password_hash
    HashPassword { password: String },
}

/// Commands that load the config and open the database.
#[derive(Debug, Subcommand)]
pub enum StoreCommand {
    /// Scan items, pay, and write the receipt
    Checkout(CheckoutArgs),

    /// Interactive session (scan, image, remove, cart, pay, ...)
    Shell {
        /// Directory for invoices and exit passes
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Verify an exit code at the checkpoint
    Verify(VerifyArgs),

    /// Re-render the invoice for an exit code
    Reprint {
        exit_code: String,

        /// Directory for invoices and exit passes
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Store maintenance (requires the admin password)
    Admin {
        #[arg(long)]
        password: String,

        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Customer name (blank records "Anonymous")
    #[arg(long)]
    pub customer: Option<String>,

    /// UPI transaction reference
    #[arg(long)]
    pub utr: String,

    /// Barcode to scan; repeat for more items
    #[arg(long = "scan", value_name = "BARCODE")]
    pub scans: Vec<String>,

    /// Camera frame to decode and scan; repeatable
    #[arg(long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,

    /// Directory for invoices and exit passes
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Exit code or full exit-pass payload
    #[arg(conflicts_with = "image")]
    pub code: Option<String>,

    /// Image containing the exit-pass QR
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum AdminAction {
    /// Load products from a CSV file
    LoadCatalog { csv: PathBuf },

    /// Total sales, transaction and product counts
    Stats,

    /// Newest transactions
    Recent {
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: u32,
    },

    /// Dump the products and transactions tables
    Browse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_checkout_collects_repeated_scans() {
        let cli = Cli::try_parse_from([
            "kiosk", "checkout", "--utr", "UTR1", "--scan", "111", "--scan", "222", "--scan", "111",
        ])
        .unwrap();

        match cli.command {
            Command::Store(StoreCommand::Checkout(args)) => {
                assert_eq!(args.scans, vec!["111", "222", "111"]);
                assert!(args.customer.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_verify_code_and_image_conflict() {
        let result = Cli::try_parse_from(["kiosk", "verify", "EXIT-1", "--image", "frame.png"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_admin_recent_default_limit() {
        let cli = Cli::try_parse_from(["kiosk", "admin", "--password", "pw", "recent"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Store(StoreCommand::Admin {
                action: AdminAction::Recent { limit: 10 },
                ..
            })
        ));
    }

    #[test]
    fn test_hash_password_is_top_level() {
        let cli = Cli::try_parse_from(["kiosk", "hash-password", "letmein"]).unwrap();
        assert!(matches!(cli.command, Command::HashPassword { .. }));

        let cli = Cli::try_parse_from(["kiosk", "reprint", "EXIT-1"]).unwrap();
        assert!(matches!(cli.command, Command::Store(StoreCommand::Reprint { .. })));
    }
}
