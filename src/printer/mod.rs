//! # Printer Module
//!
//! Printer settings and the service applications print through.
//!
//! ## Modules
//!
//! - [`config`]: Paper width, preferred endpoints and the CLI config file
//! - [`service`]: Print, connection test and diagnostic operations

pub mod config;
pub mod service;

pub use config::{AppConfig, ConnectionKind, PaperWidth, PrinterConfiguration};
pub use service::PrinterService;
