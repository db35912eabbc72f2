//! In-process printer peripheral.
//!
//! [`LoopbackPlatform`] answers every [`RadioPlatform`] call from a script
//! and records what the transport did with it. Tests use it to inject
//! failures; the CLI uses it for dry runs whose bytes can be captured.
//!
//! By default it offers one unpaired device named `Loopback Printer`
//! exposing service `18f0` with a writable characteristic `2af1`.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use super::candidates::short_uuid;
use super::platform::{
    CharacteristicInfo, DeviceInfo, DeviceRequest, LinkId, RadioPlatform, WriteKind,
};
use crate::error::PlatformError;

pub const LOOPBACK_DEVICE_ID: &str = "loopback-0";
pub const LOOPBACK_DEVICE_NAME: &str = "Loopback Printer";

/// Scripted peripheral behaviour.
#[derive(Debug, Clone)]
struct Script {
    available: bool,
    cancel_chooser: bool,
    device: DeviceInfo,
    paired: Vec<DeviceInfo>,
    connect_error: Option<PlatformError>,
    services: Vec<Uuid>,
    characteristics: Vec<CharacteristicInfo>,
    enumeration: bool,
    lookup_error: Option<PlatformError>,
    fail_write_at: Option<usize>,
}

/// What the transport did.
#[derive(Debug, Default)]
struct Record {
    prompts: usize,
    connections: Vec<String>,
    disconnections: usize,
    open: HashSet<LinkId>,
    service_lookups: Vec<Uuid>,
    writes: Vec<(Vec<u8>, WriteKind)>,
    write_attempts: usize,
}

#[derive(Debug)]
pub struct LoopbackPlatform {
    script: Script,
    record: Mutex<Record>,
}

impl Default for LoopbackPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackPlatform {
    pub fn new() -> Self {
        Self {
            script: Script {
                available: true,
                cancel_chooser: false,
                device: DeviceInfo::new(LOOPBACK_DEVICE_ID, Some(LOOPBACK_DEVICE_NAME)),
                paired: Vec::new(),
                connect_error: None,
                services: vec![short_uuid(0x18f0)],
                characteristics: vec![CharacteristicInfo::writable(short_uuid(0x2af1))],
                enumeration: true,
                lookup_error: None,
                fail_write_at: None,
            },
            record: Mutex::new(Record::default()),
        }
    }

    // ---- script ------------------------------------------------------------

    /// Report no radio.
    pub fn unavailable(mut self) -> Self {
        self.script.available = false;
        self
    }

    /// The user dismisses the chooser.
    pub fn cancel_chooser(mut self) -> Self {
        self.script.cancel_chooser = true;
        self
    }

    /// Device the chooser returns.
    pub fn with_device(mut self, device: DeviceInfo) -> Self {
        self.script.device = device;
        self
    }

    /// Add a device to the previously-paired list.
    pub fn with_paired(mut self, device: DeviceInfo) -> Self {
        self.script.paired.push(device);
        self
    }

    pub fn fail_connect(mut self, err: PlatformError) -> Self {
        self.script.connect_error = Some(err);
        self
    }

    /// Primary services the device exposes.
    pub fn with_services(mut self, services: Vec<Uuid>) -> Self {
        self.script.services = services;
        self
    }

    /// Characteristics of every exposed service.
    pub fn with_characteristics(mut self, characteristics: Vec<CharacteristicInfo>) -> Self {
        self.script.characteristics = characteristics;
        self
    }

    /// Make characteristic enumeration report `Unsupported`.
    pub fn without_enumeration(mut self) -> Self {
        self.script.enumeration = false;
        self
    }

    /// Every service and characteristic lookup fails with `err`.
    pub fn fail_lookups(mut self, err: PlatformError) -> Self {
        self.script.lookup_error = Some(err);
        self
    }

    /// The write of chunk `index` (zero-based) times out.
    pub fn fail_write_at(mut self, index: usize) -> Self {
        self.script.fail_write_at = Some(index);
        self
    }

    // ---- record ------------------------------------------------------------

    fn record(&self) -> MutexGuard<'_, Record> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every successfully written chunk, in order.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.record().writes.iter().map(|(bytes, _)| bytes.clone()).collect()
    }

    pub fn write_kinds(&self) -> Vec<WriteKind> {
        self.record().writes.iter().map(|(_, kind)| *kind).collect()
    }

    pub fn write_count(&self) -> usize {
        self.record().writes.len()
    }

    /// Write calls issued, including the failing one.
    pub fn write_attempts(&self) -> usize {
        self.record().write_attempts
    }

    /// Successfully written bytes, concatenated.
    pub fn received(&self) -> Vec<u8> {
        self.record()
            .writes
            .iter()
            .flat_map(|(bytes, _)| bytes.iter().copied())
            .collect()
    }

    /// How many times the chooser was shown.
    pub fn prompts(&self) -> usize {
        self.record().prompts
    }

    /// Device ids connected to, in order.
    pub fn connections(&self) -> Vec<String> {
        self.record().connections.clone()
    }

    pub fn connection_count(&self) -> usize {
        self.record().connections.len()
    }

    pub fn disconnections(&self) -> usize {
        self.record().disconnections
    }

    /// Links connected and not yet released.
    pub fn open_links(&self) -> usize {
        self.record().open.len()
    }

    /// Services probed, in order.
    pub fn service_lookups(&self) -> Vec<Uuid> {
        self.record().service_lookups.clone()
    }

    fn check_link(&self, link: LinkId) -> Result<(), PlatformError> {
        if !self.record().open.contains(&link) {
            return Err(PlatformError::Disconnected);
        }
        if let Some(err) = &self.script.lookup_error {
            return Err(err.clone());
        }
        Ok(())
    }

    fn check_service(&self, service: Uuid) -> Result<(), PlatformError> {
        if self.script.services.contains(&service) {
            Ok(())
        } else {
            Err(PlatformError::NotFound)
        }
    }
}

#[async_trait]
impl RadioPlatform for LoopbackPlatform {
    async fn is_available(&self) -> bool {
        self.script.available
    }

    async fn request_device(&self, request: &DeviceRequest) -> Result<DeviceInfo, PlatformError> {
        self.record().prompts += 1;
        if !self.script.available {
            return Err(PlatformError::Unsupported);
        }
        if self.script.cancel_chooser {
            return Err(PlatformError::Cancelled);
        }
        let device = &self.script.device;
        if let Some(prefix) = &request.name_prefix {
            let name = device.name.as_deref().unwrap_or_default();
            if !name.starts_with(prefix.as_str()) {
                return Err(PlatformError::NotFound);
            }
        }
        Ok(device.clone())
    }

    async fn paired_devices(&self) -> Result<Vec<DeviceInfo>, PlatformError> {
        Ok(self.script.paired.clone())
    }

    async fn connect(&self, device_id: &str) -> Result<LinkId, PlatformError> {
        let mut record = self.record();
        record.connections.push(device_id.to_string());
        if let Some(err) = &self.script.connect_error {
            return Err(err.clone());
        }
        let known = self.script.device.id == device_id
            || self.script.paired.iter().any(|d| d.id == device_id);
        if !known {
            return Err(PlatformError::NotFound);
        }
        let link = LinkId(Uuid::new_v4());
        record.open.insert(link);
        Ok(link)
    }

    async fn service(&self, link: LinkId, service: Uuid) -> Result<(), PlatformError> {
        self.record().service_lookups.push(service);
        self.check_link(link)?;
        self.check_service(service)
    }

    async fn characteristics(
        &self,
        link: LinkId,
        service: Uuid,
    ) -> Result<Vec<CharacteristicInfo>, PlatformError> {
        self.check_link(link)?;
        self.check_service(service)?;
        if !self.script.enumeration {
            return Err(PlatformError::Unsupported);
        }
        Ok(self.script.characteristics.clone())
    }

    async fn characteristic(
        &self,
        link: LinkId,
        service: Uuid,
        characteristic: Uuid,
    ) -> Result<CharacteristicInfo, PlatformError> {
        self.check_link(link)?;
        self.check_service(service)?;
        self.script
            .characteristics
            .iter()
            .find(|c| c.uuid == characteristic)
            .copied()
            .ok_or(PlatformError::NotFound)
    }

    async fn write(
        &self,
        link: LinkId,
        _service: Uuid,
        _characteristic: Uuid,
        bytes: &[u8],
        kind: WriteKind,
    ) -> Result<(), PlatformError> {
        let mut record = self.record();
        if !record.open.contains(&link) {
            return Err(PlatformError::Disconnected);
        }
        let index = record.write_attempts;
        record.write_attempts += 1;
        if self.script.fail_write_at == Some(index) {
            return Err(PlatformError::Timeout);
        }
        record.writes.push((bytes.to_vec(), kind));
        Ok(())
    }

    async fn disconnect(&self, link: LinkId) -> Result<(), PlatformError> {
        let mut record = self.record();
        record.disconnections += 1;
        if record.open.remove(&link) {
            Ok(())
        } else {
            Err(PlatformError::Disconnected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_peripheral() {
        let platform = LoopbackPlatform::new();
        let device = platform
            .request_device(&DeviceRequest::default())
            .await
            .unwrap();
        let link = platform.connect(&device.id).await.unwrap();
        platform.service(link, short_uuid(0x18f0)).await.unwrap();
        assert_eq!(
            platform.service(link, short_uuid(0xff00)).await,
            Err(PlatformError::NotFound)
        );
        platform.disconnect(link).await.unwrap();
        assert_eq!(
            platform.service(link, short_uuid(0x18f0)).await,
            Err(PlatformError::Disconnected)
        );
        assert_eq!(platform.open_links(), 0);
    }

    #[tokio::test]
    async fn test_name_filter() {
        let platform = LoopbackPlatform::new();
        let request = DeviceRequest {
            name_prefix: Some("MTP".into()),
            services: Vec::new(),
        };
        assert_eq!(
            platform.request_device(&request).await,
            Err(PlatformError::NotFound)
        );
    }
}
