//! # Kiosk Library
//!
//! The self-checkout kiosk, its exit checkpoint and the admin tools, as a
//! library so integration tests can drive the same code as the binary.
//!
//! ## Module Organization
//! ```text
//! kiosk/
//! ├── lib.rs          ◄─── You are here (logging, startup, dispatch)
//! ├── cli.rs          ◄─── clap definitions
//! ├── config.rs       ◄─── KioskConfig (toml + env)
//! ├── error.rs        ◄─── AppError / ErrorCode
//! ├── services/
//! │   ├── checkout.rs ◄─── scan, pay, receipts, reprint
//! │   ├── exit.rs     ◄─── exit verification
//! │   └── admin.rs    ◄─── password gate, catalog, analytics
//! └── commands/
//!     ├── checkout.rs ◄─── kiosk checkout / reprint
//!     ├── shell.rs    ◄─── kiosk shell
//!     ├── verify.rs   ◄─── kiosk verify
//!     └── admin.rs    ◄─── kiosk admin
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize logging (RUST_LOG or the default filter)                 │
//! │  2. Load KioskConfig (defaults → kiosk.toml → KIOSK_* env)              │
//! │  3. Open SQLite (WAL, foreign keys) and apply migrations                │
//! │  4. Build the service the command needs                                 │
//! │  5. Run the command, close the pool                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod services;

use std::io::Write;
use std::process::ExitCode;

use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use checkout_db::{migrations, Database, DbConfig};

use cli::{Cli, Command, StoreCommand};
use config::KioskConfig;
use error::AppResult;
use services::{AdminGate, CheckoutService, ExitVerifier};

pub use error::{AppError, ErrorCode};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages everywhere
/// - `RUST_LOG=checkout_db=trace` - Trace the database layer only
/// - Default: `info,kiosk=debug,checkout_db=debug,sqlx=warn`
///
/// Logs go to stderr so receipts and JSON on stdout stay clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kiosk=debug,checkout_db=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the configured database, applying migrations.
///
/// A file last migrated by a newer build still opens, with a warning.
pub async fn open_database(config: &KioskConfig) -> AppResult<Database> {
    let db = Database::new(DbConfig::new(config.storage.database_path.clone())).await?;

    let (embedded, applied) = migrations::migration_status(db.pool()).await?;
    if applied > embedded {
        warn!(embedded, applied, "Database schema is newer than this build");
    } else {
        info!(applied, "Database schema up to date");
    }
    Ok(db)
}

/// Runs one CLI invocation and returns the process exit status.
pub async fn run(cli: Cli) -> AppResult<ExitCode> {
    let mut stdout = std::io::stdout();

    let command = match cli.command {
        Command::HashPassword { password } => {
            writeln!(stdout, "{}", services::hash_password(&password)?)?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Store(command) => command,
    };

    let config = KioskConfig::load(cli.config)?;
    info!(
        store = %config.store_name(),
        tax = %config.tax_rate(),
        db = %config.storage.database_path.display(),
        "Kiosk starting"
    );

    let db = open_database(&config).await?;
    let result = dispatch(command, &db, &config, &mut stdout).await;
    db.close().await;
    result
}

async fn dispatch(
    command: StoreCommand,
    db: &Database,
    config: &KioskConfig,
    out: &mut impl Write,
) -> AppResult<ExitCode> {
    let default_out = config.storage.output_dir.clone();
    let symbol = config.currency_symbol();

    match command {
        StoreCommand::Checkout(args) => {
            let out_dir = args.out.clone().unwrap_or(default_out);
            let service = CheckoutService::new(db.clone(), config.clone());
            commands::checkout::run_checkout(&service, args, &out_dir, out).await?;
        }
        StoreCommand::Shell { out: out_dir } => {
            let out_dir = out_dir.unwrap_or(default_out);
            let service = CheckoutService::new(db.clone(), config.clone());
            let stdin = BufReader::new(tokio::io::stdin());
            commands::shell::run_shell(&service, &out_dir, stdin, out).await?;
        }
        StoreCommand::Verify(args) => {
            let verifier = ExitVerifier::new(db.clone());
            let approved = commands::verify::run_verify(&verifier, args, symbol, out).await?;
            if !approved {
                return Ok(ExitCode::FAILURE);
            }
        }
        StoreCommand::Reprint {
            exit_code,
            out: out_dir,
        } => {
            let out_dir = out_dir.unwrap_or(default_out);
            let service = CheckoutService::new(db.clone(), config.clone());
            commands::checkout::run_reprint(&service, &exit_code, &out_dir, out).await?;
        }
        StoreCommand::Admin { password, action } => {
            let session = AdminGate::from_config(config).unlock(db.clone(), &password)?;
            commands::admin::run_admin(&session, action, symbol, out).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_database_migrates_a_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = KioskConfig::default();
        config.storage.database_path = dir.path().join("kiosk.db");

        let db = open_database(&config).await.unwrap();
        let (embedded, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(embedded, applied);
        db.close().await;

        let db = open_database(&config).await.unwrap();
        assert_eq!(db.transactions().sales_stats().await.unwrap().transaction_count, 0);
        db.close().await;
    }
}
