//! # Interactive Kiosk Shell
//!
//! Line-oriented stand-in for the touch screen. One session lives for the
//! whole shell; paying starts the next shopper's session.
//!
//! ```text
//! kiosk> scan 8901262150101
//! + Taaza Toned Milk 500ml (Amul) (qty 1)
//! kiosk> image frame.jpg
//! kiosk> cart
//! kiosk> pay 412345678901
//! ```
//!
//! Every failure is printed and the loop continues; only `quit` or end of
//! input ends the shell.

use std::io::Write;
use std::path::Path;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::commands::{deliver_receipt, print_cart, report_capabilities};
use crate::error::AppResult;
use crate::services::CheckoutService;

const HELP: &str = "\
Commands:
  scan <barcode>     add one item
  image <path>       scan every code in an image
  remove <barcode>   drop a line from the cart
  cart               show the cart
  clear              empty the cart
  customer <name>    set the customer name
  pay <utr>          pay and print the receipt
  help               this text
  quit               leave the shell";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Scan(String),
    Image(String),
    Remove(String),
    Cart,
    Clear,
    Customer(String),
    Pay(String),
    Help,
    Quit,
    Empty,
}

impl ShellCommand {
    /// Parses one input line. `Err` carries the message to show.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let needs_arg = |name: &str, build: fn(String) -> ShellCommand| {
            if rest.is_empty() {
                Err(format!("usage: {} <{}>", verb, name))
            } else {
                Ok(build(rest.to_string()))
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "" => Ok(ShellCommand::Empty),
            "scan" => needs_arg("barcode", ShellCommand::Scan),
            "image" => needs_arg("path", ShellCommand::Image),
            "remove" => needs_arg("barcode", ShellCommand::Remove),
            "cart" => Ok(ShellCommand::Cart),
            "clear" => Ok(ShellCommand::Clear),
            "customer" => Ok(ShellCommand::Customer(rest.to_string())),
            "pay" => needs_arg("utr", ShellCommand::Pay),
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" => Ok(ShellCommand::Quit),
            other => Err(format!("unknown command '{}', try 'help'", other)),
        }
    }
}

/// Runs the shell until `quit` or end of input.
pub async fn run_shell<R>(
    service: &CheckoutService,
    out_dir: &Path,
    input: R,
    out: &mut impl Write,
) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
{
    let symbol = service.currency_symbol().to_string();
    let mut session = service.new_session();
    let mut lines = input.lines();

    writeln!(out, "Self-checkout ready. Type 'help' for commands.")?;
    report_capabilities(out)?;

    loop {
        write!(out, "kiosk> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "{}", message)?;
                continue;
            }
        };
        debug!(?command, "Shell command");

        match command {
            ShellCommand::Empty => {}
            ShellCommand::Help => writeln!(out, "{}", HELP)?,
            ShellCommand::Quit => break,
            ShellCommand::Scan(barcode) => match service.add_scan(&mut session, &barcode).await {
                Ok(line) => writeln!(
                    out,
                    "+ {} (qty {})",
                    line.product.display_name(),
                    line.quantity
                )?,
                Err(e) => writeln!(out, "! {}", e.message)?,
            },
            ShellCommand::Image(_) if !checkout_render::decoder_available() => {
                writeln!(out, "! image scanning is not available, type the barcode")?;
            }
            ShellCommand::Image(path) => {
                let bytes = match tokio::fs::read(&path).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        writeln!(out, "! cannot read {}: {}", path, e)?;
                        continue;
                    }
                };
                match service.scan_image(&mut session, &bytes).await {
                    Ok(report) => {
                        for line in &report.added {
                            writeln!(out, "+ {} (qty {})", line.product.display_name(), line.quantity)?;
                        }
                        for code in &report.not_found {
                            writeln!(out, "! Product not found: {}", code)?;
                        }
                        if report.added.is_empty() && report.not_found.is_empty() {
                            writeln!(out, "! No code found, try again or type the barcode")?;
                        }
                    }
                    Err(e) => {
                        warn!(path = %path, error = %e, "Image scan failed");
                        writeln!(out, "! {}", e.message)?;
                    }
                }
            }
            ShellCommand::Remove(barcode) => {
                if session.cart_mut().remove_line(&barcode) {
                    writeln!(out, "- removed {}", barcode)?;
                } else {
                    writeln!(out, "! {} is not in the cart", barcode)?;
                }
            }
            ShellCommand::Cart => print_cart(out, session.cart(), &symbol)?,
            ShellCommand::Clear => {
                session.cart_mut().clear();
                writeln!(out, "Cart cleared")?;
            }
            ShellCommand::Customer(name) => {
                session.set_customer(name);
                writeln!(out, "Customer: {}", session.customer_name())?;
            }
            ShellCommand::Pay(utr) => match service.complete_payment(&mut session, &utr).await {
                Ok(receipt) => {
                    if let Err(e) = deliver_receipt(out, &receipt, out_dir).await {
                        writeln!(out, "! receipt not saved: {}", e.message)?;
                        writeln!(out, "Exit code: {}", receipt.exit_code())?;
                    }
                    writeln!(out, "Next customer.")?;
                }
                Err(e) => writeln!(out, "! {}", e.message)?,
            },
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
