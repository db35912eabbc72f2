//! # Blueslip CLI
//!
//! Command-line interface for Bluetooth LE receipt printing.
//!
//! ## Usage
//!
//! ```bash
//! # Show the formatted receipt text
//! blueslip --config shop.json text sale.json
//!
//! # Write the complete printer program to a file
//! blueslip --config shop.json render sale.json --output sale.bin
//!
//! # Print, test the link, or send the minimal diagnostic program
//! blueslip --config shop.json print sale.json
//! blueslip test --name MTP-
//! blueslip diagnostic --capture diag.bin
//!
//! # Stop reconnecting to the last printer
//! blueslip forget
//! ```
//!
//! This build drives the in-process loopback peripheral; `--capture` writes
//! whatever it received.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use blueslip::{
    PrinterError,
    printer::{AppConfig, PaperWidth, PrinterService},
    receipt::{Customer, Employee, ReceiptDocument, Table, Transaction},
    transport::{
        FileStore, KeyValueStore, LoopbackPlatform, MemoryStore, candidates::parse_identifier,
    },
};

/// Blueslip - Bluetooth receipt printer utility
#[derive(Parser, Debug)]
#[command(name = "blueslip")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file (printer, business, store_path)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Characters per line: 32, 48 or 64
    #[arg(long, global = true)]
    paper_width: Option<u8>,

    /// Preferred printer service (UUID or 16-bit short form)
    #[arg(long, global = true)]
    service: Option<String>,

    /// Preferred write characteristic (UUID or 16-bit short form)
    #[arg(long, global = true)]
    characteristic: Option<String>,

    /// Only offer printers whose name starts with this
    #[arg(long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the formatted receipt text to stdout
    Text {
        /// Sale to format (JSON)
        receipt: PathBuf,
    },

    /// Write the complete printer program to a file
    Render {
        receipt: PathBuf,

        #[arg(long, short, value_name = "FILE")]
        output: PathBuf,
    },

    /// Print a receipt
    Print {
        receipt: PathBuf,

        /// Save the bytes the printer received
        #[arg(long, value_name = "FILE")]
        capture: Option<PathBuf>,
    },

    /// Check that a compatible printer is reachable
    Test,

    /// Send a minimal reset/text/cut program
    Diagnostic {
        #[arg(long, value_name = "FILE")]
        capture: Option<PathBuf>,
    },

    /// Forget the last used printer
    Forget,
}

/// A sale plus the optional people and table attached to it.
#[derive(Debug, Deserialize)]
struct SaleFile {
    transaction: Transaction,
    #[serde(default)]
    cashier: Option<Employee>,
    #[serde(default)]
    customer: Option<Customer>,
    #[serde(default)]
    table: Option<Table>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blueslip=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), PrinterError> {
    let config = load_config(&cli)?;
    let platform = Arc::new(LoopbackPlatform::new());
    let store: Arc<dyn KeyValueStore> = match &config.store_path {
        Some(path) => Arc::new(FileStore::new(path)),
        None => Arc::new(MemoryStore::new()),
    };
    let service = PrinterService::new(
        platform.clone(),
        store,
        config.printer.clone(),
        config.business.clone(),
    );

    match cli.command {
        Commands::Text { receipt } => {
            let document = load_sale(&receipt, &config)?;
            print!(
                "{}",
                blueslip::receipt::format(&document, config.printer.paper_width)
            );
        }
        Commands::Render { receipt, output } => {
            let document = load_sale(&receipt, &config)?;
            let stream = service.render(&document).await;
            std::fs::write(&output, stream.as_bytes())?;
            println!("Wrote {} bytes to {}", stream.len(), output.display());
        }
        Commands::Print { receipt, capture } => {
            let document = load_sale(&receipt, &config)?;
            service.print(&document).await?;
            println!("Printed receipt {}", document.receipt_number);
            save_capture(capture.as_deref(), &platform.received())?;
        }
        Commands::Test => {
            let handle = service.test_connection().await?;
            println!("Printer {} is reachable", handle.device_id);
            if let (Some(service), Some(characteristic)) = (handle.service, handle.characteristic) {
                println!("  service:        {}", service);
                println!("  characteristic: {}", characteristic);
            }
        }
        Commands::Diagnostic { capture } => {
            service.simple_diagnostic_print().await?;
            println!("Diagnostic print sent");
            save_capture(capture.as_deref(), &platform.received())?;
        }
        Commands::Forget => {
            service.forget_printer()?;
            println!("Forgot the last used printer");
        }
    }

    Ok(())
}

/// Config file values with command-line overrides applied.
fn load_config(cli: &Cli) -> Result<AppConfig, PrinterError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    if let Some(width) = cli.paper_width {
        config.printer.paper_width = PaperWidth::try_from(width)?;
    }
    if let Some(service) = &cli.service {
        config.printer.service_id = Some(parse_identifier(service)?);
    }
    if let Some(characteristic) = &cli.characteristic {
        config.printer.characteristic_id = Some(parse_identifier(characteristic)?);
    }
    if let Some(name) = &cli.name {
        config.printer.device_name_filter = Some(name.clone());
    }
    Ok(config)
}

fn load_sale(path: &Path, config: &AppConfig) -> Result<ReceiptDocument, PrinterError> {
    let text = std::fs::read_to_string(path)?;
    let sale: SaleFile = serde_json::from_str(&text).map_err(|e| {
        PrinterError::InvalidConfig(format!("Invalid sale file {}: {}", path.display(), e))
    })?;
    Ok(ReceiptDocument::from_transaction(
        &sale.transaction,
        &config.business,
        sale.cashier.as_ref(),
        sale.customer.as_ref(),
        sale.table.as_ref(),
    ))
}

fn save_capture(path: Option<&Path>, bytes: &[u8]) -> Result<(), PrinterError> {
    if let Some(path) = path {
        std::fs::write(path, bytes)?;
        println!("Saved {} captured bytes to {}", bytes.len(), path.display());
    }
    Ok(())
}
