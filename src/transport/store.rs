//! Persistence of the last printer that completed a print.
//!
//! A single entry under [`LAST_DEVICE_KEY`] holds a [`DeviceHandle`] as a
//! JSON string. Writers follow last-writer-wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::PrinterError;

/// Key under which the last successful printer is remembered.
pub const LAST_DEVICE_KEY: &str = "blueslip.last_printer";

/// Minimal string key/value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PrinterError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PrinterError>;
    fn remove(&self, key: &str) -> Result<(), PrinterError>;
}

// ============================================================================
// DEVICE HANDLE
// ============================================================================

/// A device plus the endpoints bound on it during the last good session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceHandle {
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristic: Option<Uuid>,
}

impl DeviceHandle {
    /// Decode a stored value. A value that is not a JSON object is taken as a
    /// bare device id.
    pub fn decode(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if value.starts_with('{') {
            return match serde_json::from_str(value) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    warn!(error = %e, "ignoring unreadable printer handle");
                    None
                }
            };
        }
        Some(Self {
            device_id: value.to_string(),
            service: None,
            characteristic: None,
        })
    }

    pub fn encode(&self) -> Result<String, PrinterError> {
        serde_json::to_string(self).map_err(|e| PrinterError::Storage(e.to_string()))
    }

    /// Read the remembered printer, if any.
    pub fn load(store: &dyn KeyValueStore) -> Result<Option<Self>, PrinterError> {
        Ok(store.get(LAST_DEVICE_KEY)?.as_deref().and_then(Self::decode))
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), PrinterError> {
        store.set(LAST_DEVICE_KEY, &self.encode()?)
    }

    /// Drop the remembered printer.
    pub fn forget(store: &dyn KeyValueStore) -> Result<(), PrinterError> {
        store.remove(LAST_DEVICE_KEY)
    }
}

// ============================================================================
// MEMORY STORE
// ============================================================================

/// In-process store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PrinterError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrinterError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PrinterError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// FILE STORE
// ============================================================================

/// Store backed by a JSON object on disk.
///
/// The whole file is rewritten on every change. A missing file reads as an
/// empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PrinterError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(PrinterError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).map_err(|e| {
            PrinterError::Storage(format!("Corrupt store {}: {}", self.path.display(), e))
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), PrinterError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(entries)
            .map_err(|e| PrinterError::Storage(e.to_string()))?;
        std::fs::write(&self.path, text).map_err(|e| {
            PrinterError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        debug!(path = %self.path.display(), "store written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PrinterError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrinterError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), PrinterError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}
