//! Radio capability surface.
//!
//! The transport never talks to a Bluetooth stack directly; it is handed a
//! [`RadioPlatform`] and drives it one call at a time. Each method is a
//! suspension point and may time out according to the adapter's own policy.

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::PlatformError;

/// A peripheral as reported by the chooser or the paired list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Opaque platform identifier, stable across sessions
    pub id: String,
    pub name: Option<String>,
}

impl DeviceInfo {
    pub fn new(id: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.map(str::to_string),
        }
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})", name, self.id),
            None => f.write_str(&self.id),
        }
    }
}

/// Filter handed to the device chooser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceRequest {
    /// Only offer devices whose name starts with this
    pub name_prefix: Option<String>,
    /// Services the chooser should allow access to once connected
    pub services: Vec<Uuid>,
}

/// Handle to one established link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(pub Uuid);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link-{}", self.0.simple())
    }
}

/// How a chunk is written to a characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    /// Acknowledged write; the call resolves once the peer confirms
    WithResponse,
    /// Unacknowledged write; the call resolves once the host queued it
    WithoutResponse,
}

/// A characteristic and the write operations it advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicInfo {
    pub uuid: Uuid,
    pub write: bool,
    pub write_without_response: bool,
}

impl CharacteristicInfo {
    pub fn writable(uuid: Uuid) -> Self {
        Self {
            uuid,
            write: true,
            write_without_response: false,
        }
    }

    pub fn write_without_response(uuid: Uuid) -> Self {
        Self {
            uuid,
            write: false,
            write_without_response: true,
        }
    }

    pub fn read_only(uuid: Uuid) -> Self {
        Self {
            uuid,
            write: false,
            write_without_response: false,
        }
    }

    pub fn is_writable(&self) -> bool {
        self.write || self.write_without_response
    }

    /// Acknowledged writes when available, otherwise unacknowledged.
    pub fn write_kind(&self) -> Option<WriteKind> {
        if self.write {
            Some(WriteKind::WithResponse)
        } else if self.write_without_response {
            Some(WriteKind::WithoutResponse)
        } else {
            None
        }
    }
}

/// Operations a Bluetooth LE host stack must provide.
///
/// ## Error conventions
///
/// - [`PlatformError::Unsupported`]: the host has no radio, or (from
///   [`characteristics`](Self::characteristics)) cannot enumerate
/// - [`PlatformError::Cancelled`]: the user dismissed the chooser
/// - [`PlatformError::NotFound`]: the requested device, service or
///   characteristic does not exist
/// - [`PlatformError::Disconnected`]: the link dropped under the call
#[async_trait]
pub trait RadioPlatform: Send + Sync {
    /// Whether a radio is present and powered.
    async fn is_available(&self) -> bool;

    /// Prompt the user to pick a device.
    async fn request_device(&self, request: &DeviceRequest) -> Result<DeviceInfo, PlatformError>;

    /// Devices this host was granted access to earlier, without prompting.
    async fn paired_devices(&self) -> Result<Vec<DeviceInfo>, PlatformError>;

    async fn connect(&self, device_id: &str) -> Result<LinkId, PlatformError>;

    /// Resolve a primary service on the connected device.
    async fn service(&self, link: LinkId, service: Uuid) -> Result<(), PlatformError>;

    /// List every characteristic of a resolved service.
    async fn characteristics(
        &self,
        link: LinkId,
        service: Uuid,
    ) -> Result<Vec<CharacteristicInfo>, PlatformError>;

    /// Resolve one characteristic by identifier.
    async fn characteristic(
        &self,
        link: LinkId,
        service: Uuid,
        characteristic: Uuid,
    ) -> Result<CharacteristicInfo, PlatformError>;

    /// Write one chunk and wait for the write to complete.
    async fn write(
        &self,
        link: LinkId,
        service: Uuid,
        characteristic: Uuid,
        bytes: &[u8],
        kind: WriteKind,
    ) -> Result<(), PlatformError>;

    async fn disconnect(&self, link: LinkId) -> Result<(), PlatformError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_kind_prefers_acknowledged() {
        let id = Uuid::nil();
        let both = CharacteristicInfo {
            uuid: id,
            write: true,
            write_without_response: true,
        };
        assert_eq!(both.write_kind(), Some(WriteKind::WithResponse));
        assert_eq!(
            CharacteristicInfo::write_without_response(id).write_kind(),
            Some(WriteKind::WithoutResponse)
        );
        assert_eq!(CharacteristicInfo::read_only(id).write_kind(), None);
        assert!(!CharacteristicInfo::read_only(id).is_writable());
    }

    #[test]
    fn test_device_display() {
        assert_eq!(
            DeviceInfo::new("AA:BB", Some("MTP-II")).to_string(),
            "MTP-II (AA:BB)"
        );
        assert_eq!(DeviceInfo::new("AA:BB", None).to_string(), "AA:BB");
    }
}
