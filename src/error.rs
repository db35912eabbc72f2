//! # Error Types
//!
//! This module defines error types used throughout the blueslip library.
//!
//! Platform adapters speak [`PlatformError`]; the transport translates those
//! into [`PrinterError`] according to the state it was in when the call
//! failed, so every terminal error names the phase that broke.

use std::fmt;

use thiserror::Error;

/// Phase of a print or test operation, used to label terminal errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Discovery,
    Connect,
    ServiceLookup,
    CharacteristicLookup,
    Transfer,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Discovery => "device discovery",
            Phase::Connect => "link connect",
            Phase::ServiceLookup => "service lookup",
            Phase::CharacteristicLookup => "characteristic lookup",
            Phase::Transfer => "data transfer",
        };
        f.write_str(name)
    }
}

/// Main error type for blueslip operations
#[derive(Debug, Error)]
pub enum PrinterError {
    /// The host has no usable radio at all
    #[error("Bluetooth is not available on this platform")]
    PlatformUnsupported,

    /// The user dismissed the device chooser
    #[error("{}: device selection was cancelled", Phase::Discovery)]
    DeviceSelectionCancelled,

    /// Discovery or link establishment failed
    #[error("{phase}: printer link unavailable: {reason}")]
    LinkUnavailable { phase: Phase, reason: String },

    /// None of the candidate services exist on the device
    #[error("{}: no compatible printer service found (tried {tried})", Phase::ServiceLookup)]
    NoCompatibleService { tried: usize },

    /// The bound service exposes nothing we can write to
    #[error("{}: no writable characteristic on service {service}", Phase::CharacteristicLookup)]
    NoWritableCharacteristic { service: uuid::Uuid },

    /// A chunk write failed; later chunks were never sent
    #[error("{}: write of chunk {index} failed: {reason}", Phase::Transfer)]
    ChunkWriteFailure { index: usize, reason: String },

    /// The peer dropped the link while we were negotiating
    #[error("{phase}: connection lost: {reason}")]
    ConnectionLost { phase: Phase, reason: String },

    /// Logo could not be fetched or decoded (recoverable)
    #[error("Image error: {0}")]
    ImageLoadFailure(String),

    /// Invalid configuration value
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Persistent key/value store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PrinterError {
    /// Phase the error belongs to, if it terminated a transport run.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            PrinterError::DeviceSelectionCancelled => Some(Phase::Discovery),
            PrinterError::LinkUnavailable { phase, .. } => Some(*phase),
            PrinterError::NoCompatibleService { .. } => Some(Phase::ServiceLookup),
            PrinterError::NoWritableCharacteristic { .. } => Some(Phase::CharacteristicLookup),
            PrinterError::ChunkWriteFailure { .. } => Some(Phase::Transfer),
            PrinterError::ConnectionLost { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

/// Errors reported by a [`RadioPlatform`](crate::transport::RadioPlatform) adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("radio not supported")]
    Unsupported,

    #[error("cancelled by user")]
    Cancelled,

    #[error("not found")]
    NotFound,

    #[error("disconnected")]
    Disconnected,

    #[error("timed out")]
    Timeout,

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_phase() {
        let err = PrinterError::ChunkWriteFailure {
            index: 7,
            reason: "timed out".into(),
        };
        assert_eq!(
            err.to_string(),
            "data transfer: write of chunk 7 failed: timed out"
        );
        assert_eq!(err.phase(), Some(Phase::Transfer));

        let err = PrinterError::NoCompatibleService { tried: 4 };
        assert!(err.to_string().starts_with("service lookup:"));
    }

    #[test]
    fn test_image_failure_has_no_phase() {
        assert_eq!(PrinterError::ImageLoadFailure("404".into()).phase(), None);
    }
}
