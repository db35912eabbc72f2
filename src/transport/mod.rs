//! # Printer Transport Layer
//!
//! This module delivers command streams to Bluetooth LE receipt printers.
//!
//! ## Modules
//!
//! - [`platform`]: The radio capability the transport is driven through
//! - [`candidates`]: Known printer services/characteristics and lookup order
//! - [`store`]: Remembering the last printer that completed a print
//! - [`bluetooth`]: The discovery, binding and chunked-transfer state machine
//! - [`loopback`]: An in-process peripheral for tests and dry runs

pub mod bluetooth;
pub mod candidates;
pub mod loopback;
pub mod platform;
pub mod store;

pub use bluetooth::{BluetoothTransport, TransportState};
pub use loopback::LoopbackPlatform;
pub use platform::{CharacteristicInfo, DeviceInfo, DeviceRequest, LinkId, RadioPlatform, WriteKind};
pub use store::{DeviceHandle, FileStore, KeyValueStore, MemoryStore};
