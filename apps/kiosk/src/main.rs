//! # Kiosk Entry Point
//!
//! ```bash
//! kiosk shell
//! kiosk checkout --customer Asha --utr 412345678901 --scan 8901262150101
//! kiosk verify EXIT-20240501140322
//! kiosk admin --password ... load-catalog products.csv
//! ```
//!
//! Exit status: 0 on success (or approval at `verify`), 1 otherwise.

use std::process::ExitCode;

use clap::Parser;

use kiosk::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    kiosk::init_tracing();

    match kiosk::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(code = ?e.code, "{}", e.message);
            eprintln!("Error: {}", e.message);
            ExitCode::FAILURE
        }
    }
}
