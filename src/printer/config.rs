//! # Printer Configuration
//!
//! Caller-supplied settings for one print call, plus the JSON config file
//! the CLI reads them from.
//!
//! ## Paper Widths
//!
//! | Setting | Columns | Typical paper | Logo width (dots) |
//! |---------|---------|---------------|-------------------|
//! | 32 | 32 | 58mm | 384 |
//! | 48 | 48 | 80mm | 576 |
//! | 64 | 64 | 80mm, font B | 576 |
//!
//! ## Example file
//!
//! ```json
//! {
//!   "printer": { "paperWidth": 48, "serviceId": "18f0", "deviceNameFilter": "PT-" },
//!   "business": { "name": "Corner Cafe", "address": ["12 Main St"], "tax_id": "123-456" },
//!   "store_path": "/var/lib/blueslip/state.json"
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::PrinterError;
use crate::receipt::BusinessProfile;
use crate::transport::candidates::parse_identifier;

// ============================================================================
// PAPER WIDTH
// ============================================================================

/// Characters per printed line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PaperWidth {
    #[default]
    Cols32,
    Cols48,
    Cols64,
}

impl PaperWidth {
    /// Characters per line.
    #[inline]
    pub fn columns(self) -> usize {
        match self {
            PaperWidth::Cols32 => 32,
            PaperWidth::Cols48 => 48,
            PaperWidth::Cols64 => 64,
        }
    }

    /// Widest logo, in dots, that fits the printable area.
    #[inline]
    pub fn logo_max_dots(self) -> u16 {
        match self {
            PaperWidth::Cols32 => 384,
            PaperWidth::Cols48 | PaperWidth::Cols64 => 576,
        }
    }
}

impl TryFrom<u8> for PaperWidth {
    type Error = PrinterError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            32 => Ok(PaperWidth::Cols32),
            48 => Ok(PaperWidth::Cols48),
            64 => Ok(PaperWidth::Cols64),
            other => Err(PrinterError::InvalidConfig(format!(
                "paper width must be 32, 48 or 64 characters, got {}",
                other
            ))),
        }
    }
}

impl From<PaperWidth> for u8 {
    fn from(width: PaperWidth) -> u8 {
        width.columns() as u8
    }
}

impl fmt::Display for PaperWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.columns())
    }
}

// ============================================================================
// PRINTER CONFIGURATION
// ============================================================================

/// Link type to the printer. Only Bluetooth LE is supported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    #[default]
    Bluetooth,
}

/// Settings for one print call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrinterConfiguration {
    pub connection: ConnectionKind,
    /// Service tried before the built-in fallbacks
    #[serde(deserialize_with = "de_identifier")]
    pub service_id: Option<Uuid>,
    /// Characteristic tried before enumeration and fallbacks
    #[serde(deserialize_with = "de_identifier")]
    pub characteristic_id: Option<Uuid>,
    /// Narrows the device chooser to names starting with this prefix
    pub device_name_filter: Option<String>,
    pub paper_width: PaperWidth,
}

fn de_identifier<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_identifier(&s).map_err(serde::de::Error::custom))
        .transpose()
}

// ============================================================================
// CONFIG FILE
// ============================================================================

/// Contents of the CLI's JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub printer: PrinterConfiguration,
    pub business: BusinessProfile,
    /// Where the last-used printer is remembered
    pub store_path: Option<PathBuf>,
}

impl AppConfig {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, PrinterError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PrinterError::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, PrinterError> {
        serde_json::from_str(text).map_err(|e| PrinterError::InvalidConfig(e.to_string()))
    }
}

// ============================================================================
// TESTS
// ============================================================================
