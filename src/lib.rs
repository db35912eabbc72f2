//! # Blueslip - Bluetooth LE Receipt Printing
//!
//! Blueslip turns a sale into an ESC/POS program and delivers it to a
//! thermal receipt printer over Bluetooth LE. It provides:
//!
//! - **Receipt formatting**: fixed-width text for 32, 48 and 64 column paper
//! - **Rasterization**: business logos as 1-bit `GS v 0` bitmaps
//! - **Protocol implementation**: ESC/POS command builders and PC437 text
//! - **Transport**: endpoint discovery and paced 20-byte writes over any
//!   [`RadioPlatform`](transport::RadioPlatform)
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use blueslip::{
//!     printer::{PrinterConfiguration, PrinterService},
//!     receipt::{BusinessProfile, ReceiptDocument, Transaction},
//!     transport::{LoopbackPlatform, MemoryStore},
//! };
//!
//! # async fn demo(tx: Transaction) -> Result<(), blueslip::PrinterError> {
//! let business = BusinessProfile { name: "Corner Cafe".into(), ..Default::default() };
//! let service = PrinterService::new(
//!     Arc::new(LoopbackPlatform::new()),
//!     Arc::new(MemoryStore::new()),
//!     PrinterConfiguration::default(),
//!     business.clone(),
//! );
//!
//! let document = ReceiptDocument::from_transaction(&tx, &business, None, None, None);
//! service.print(&document).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | ESC/POS command builders |
//! | [`render`] | Logo loading and rasterization |
//! | [`receipt`] | Receipt data and text formatter |
//! | [`encoder`] | Complete printer programs |
//! | [`transport`] | Bluetooth LE delivery |
//! | [`printer`] | Configuration and the print service |
//! | [`error`] | Error types |

pub mod encoder;
pub mod error;
pub mod printer;
pub mod protocol;
pub mod receipt;
pub mod render;
pub mod transport;

// Re-exports for convenience
pub use error::PrinterError;
pub use printer::{PrinterConfiguration, PrinterService};
pub use transport::BluetoothTransport;
