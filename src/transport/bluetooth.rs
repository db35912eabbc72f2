//! # Bluetooth LE Transport
//!
//! Finds a printer, binds a writable endpoint on it and streams a
//! [`CommandStream`] to it in small paced writes.
//!
//! ## State Machine
//!
//! ```text
//! Idle ─► Discovering ─► Connected ─► ServiceBound ─► CharacteristicBound ─► Transferring ─► Done
//!              │              │              │                  │                  │
//!              └──────────────┴──────────────┴──────────────────┴──────────────────┴──► Failed
//! ```
//!
//! - **Discovering**: the remembered device is looked up among paired
//!   devices; without one the chooser is shown.
//! - **ServiceBound**: configured service, then remembered service, then
//!   [`FALLBACK_SERVICES`].
//! - **CharacteristicBound**: configured and remembered characteristics,
//!   then the first writable one the service enumerates. Services that
//!   cannot enumerate are probed with [`FALLBACK_CHARACTERISTICS`].
//! - **Transferring**: [`CHUNK_SIZE`]-byte writes, each awaited, with
//!   [`CHUNK_DELAY`] between them. The first failed write ends the run.
//! - **Done**: reached after [`SETTLE_DELAY`]; only now is the device
//!   remembered.
//!
//! Once a link exists it is released on every exit path, success included.
//! A run whose future is dropped mid-flight (say, under
//! `tokio::time::timeout`) hands the disconnect to a spawned task.
//!
//! ## Pacing
//!
//! Most BLE receipt printers have a few hundred bytes of input buffer and
//! no flow control. The delays are fixed; the transfer unit is not
//! negotiated with the peer.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::candidates::{self, FALLBACK_CHARACTERISTICS, FALLBACK_SERVICES};
use super::platform::{CharacteristicInfo, DeviceInfo, DeviceRequest, LinkId, RadioPlatform};
use super::store::{DeviceHandle, KeyValueStore};
use crate::encoder::CommandStream;
use crate::error::{Phase, PlatformError, PrinterError};
use crate::printer::PrinterConfiguration;

pub use crate::encoder::CHUNK_SIZE;

/// Pause between consecutive chunk writes.
pub const CHUNK_DELAY: Duration = Duration::from_millis(50);

/// Pause after the last chunk so the printer can finish printing and cutting.
pub const SETTLE_DELAY: Duration = Duration::from_millis(1500);

/// Where a transport run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Idle,
    Discovering,
    Connected,
    ServiceBound,
    CharacteristicBound,
    Transferring,
    Done,
    Failed,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Endpoints bound on a connected printer.
struct Binding {
    device_id: String,
    link: LinkId,
    service: Uuid,
    characteristic: CharacteristicInfo,
}

impl Binding {
    fn handle(&self) -> DeviceHandle {
        DeviceHandle {
            device_id: self.device_id.clone(),
            service: Some(self.service),
            characteristic: Some(self.characteristic.uuid),
        }
    }
}

/// Owns an open link until it is released.
///
/// Dropped without [`LinkGuard::release`], it spawns the disconnect on the
/// current runtime.
struct LinkGuard {
    platform: Arc<dyn RadioPlatform>,
    link: Option<LinkId>,
}

impl LinkGuard {
    fn new(platform: Arc<dyn RadioPlatform>, link: LinkId) -> Self {
        Self {
            platform,
            link: Some(link),
        }
    }

    async fn release(mut self) {
        if let Some(link) = self.link.take() {
            disconnect(self.platform.as_ref(), link).await;
        }
    }
}

impl Drop for LinkGuard {
    fn drop(&mut self) {
        let Some(link) = self.link.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                warn!(%link, "transport run abandoned, releasing link");
                let platform = Arc::clone(&self.platform);
                runtime.spawn(async move { disconnect(platform.as_ref(), link).await });
            }
            Err(_) => warn!(%link, "transport run abandoned outside a runtime, link left open"),
        }
    }
}

async fn disconnect(platform: &dyn RadioPlatform, link: LinkId) {
    match platform.disconnect(link).await {
        Ok(()) => debug!(%link, "link released"),
        Err(e) => debug!(%link, error = %e, "disconnect reported an error"),
    }
}

/// # Bluetooth Printer Transport
///
/// One instance drives one operation at a time; the `&mut self` receivers
/// enforce exclusive use of the link.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use blueslip::encoder;
/// use blueslip::printer::PrinterConfiguration;
/// use blueslip::transport::{BluetoothTransport, LoopbackPlatform, MemoryStore};
///
/// # async fn demo() -> Result<(), blueslip::PrinterError> {
/// let mut transport = BluetoothTransport::new(
///     Arc::new(LoopbackPlatform::new()),
///     Arc::new(MemoryStore::new()),
///     PrinterConfiguration::default(),
/// );
/// transport.send(&encoder::diagnostic_stream()).await?;
/// # Ok(())
/// # }
/// ```
pub struct BluetoothTransport {
    platform: Arc<dyn RadioPlatform>,
    store: Arc<dyn KeyValueStore>,
    config: PrinterConfiguration,
    state: TransportState,
}

impl BluetoothTransport {
    pub fn new(
        platform: Arc<dyn RadioPlatform>,
        store: Arc<dyn KeyValueStore>,
        config: PrinterConfiguration,
    ) -> Self {
        Self {
            platform,
            store,
            config,
            state: TransportState::Idle,
        }
    }

    /// State reached by the most recent run.
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Deliver a complete program to the printer.
    ///
    /// On success the device is remembered for silent reconnection. On
    /// failure the previously remembered device is left untouched.
    pub async fn send(&mut self, stream: &CommandStream) -> Result<DeviceHandle, PrinterError> {
        self.run(Some(stream)).await
    }

    /// Go as far as binding a writable characteristic, then disconnect.
    /// Nothing is written and nothing is remembered.
    pub async fn probe(&mut self) -> Result<DeviceHandle, PrinterError> {
        self.run(None).await
    }

    async fn run(&mut self, stream: Option<&CommandStream>) -> Result<DeviceHandle, PrinterError> {
        self.state = TransportState::Idle;

        if !self.platform.is_available().await {
            return Err(self.fail(PrinterError::PlatformUnsupported));
        }

        let (device, remembered) = match self.discover().await {
            Ok(found) => found,
            Err(e) => return Err(self.fail(e)),
        };
        let link = match self.connect(&device).await {
            Ok(link) => link,
            Err(e) => return Err(self.fail(e)),
        };

        let guard = LinkGuard::new(Arc::clone(&self.platform), link);
        let result = self.session(&device, link, remembered.as_ref(), stream).await;
        guard.release().await;

        match result {
            Ok(handle) => {
                if stream.is_some() {
                    self.transition(TransportState::Done);
                    if let Err(e) = handle.save(self.store.as_ref()) {
                        warn!(error = %e, "printed, but could not remember printer");
                    }
                }
                Ok(handle)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Everything that happens while the link is held.
    async fn session(
        &mut self,
        device: &DeviceInfo,
        link: LinkId,
        remembered: Option<&DeviceHandle>,
        stream: Option<&CommandStream>,
    ) -> Result<DeviceHandle, PrinterError> {
        let service = self.bind_service(link, remembered).await?;
        let characteristic = self.bind_characteristic(link, service, remembered).await?;
        let binding = Binding {
            device_id: device.id.clone(),
            link,
            service,
            characteristic,
        };

        if let Some(stream) = stream {
            self.transfer(&binding, stream).await?;
        }
        Ok(binding.handle())
    }

    // ========================================================================
    // DISCOVERY & LINK
    // ========================================================================

    async fn discover(&mut self) -> Result<(DeviceInfo, Option<DeviceHandle>), PrinterError> {
        self.transition(TransportState::Discovering);

        let remembered = match DeviceHandle::load(self.store.as_ref()) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "could not read remembered printer");
                None
            }
        };

        if let Some(handle) = &remembered {
            match self.platform.paired_devices().await {
                Ok(devices) => {
                    if let Some(device) = devices.into_iter().find(|d| d.id == handle.device_id) {
                        info!(%device, "reconnecting to remembered printer");
                        return Ok((device, remembered));
                    }
                    debug!(device_id = %handle.device_id, "remembered printer is not paired");
                }
                Err(e) => debug!(error = %e, "paired device list unavailable"),
            }
        }

        let request = DeviceRequest {
            name_prefix: self.config.device_name_filter.clone(),
            services: candidates::ordered([self.config.service_id], &FALLBACK_SERVICES),
        };
        let device = self
            .platform
            .request_device(&request)
            .await
            .map_err(|e| match e {
                PlatformError::Cancelled => PrinterError::DeviceSelectionCancelled,
                PlatformError::Unsupported => PrinterError::PlatformUnsupported,
                other => PrinterError::LinkUnavailable {
                    phase: Phase::Discovery,
                    reason: other.to_string(),
                },
            })?;
        info!(%device, "printer selected");

        let remembered = remembered.filter(|h| h.device_id == device.id);
        Ok((device, remembered))
    }

    async fn connect(&mut self, device: &DeviceInfo) -> Result<LinkId, PrinterError> {
        let link = self
            .platform
            .connect(&device.id)
            .await
            .map_err(|e| PrinterError::LinkUnavailable {
                phase: Phase::Connect,
                reason: e.to_string(),
            })?;
        self.transition(TransportState::Connected);
        debug!(%link, %device, "link established");
        Ok(link)
    }

    // ========================================================================
    // ENDPOINT BINDING
    // ========================================================================

    async fn bind_service(
        &mut self,
        link: LinkId,
        remembered: Option<&DeviceHandle>,
    ) -> Result<Uuid, PrinterError> {
        let candidates = candidates::ordered(
            [self.config.service_id, remembered.and_then(|h| h.service)],
            &FALLBACK_SERVICES,
        );
        let platform = Arc::clone(&self.platform);
        let platform = platform.as_ref();

        let found = candidates::first_match(&candidates, move |id| platform.service(link, id))
            .await
            .map_err(|e| lost(Phase::ServiceLookup, e))?;

        match found {
            Some((service, ())) => {
                self.transition(TransportState::ServiceBound);
                info!(%service, "service bound");
                Ok(service)
            }
            None => Err(PrinterError::NoCompatibleService {
                tried: candidates.len(),
            }),
        }
    }

    async fn bind_characteristic(
        &mut self,
        link: LinkId,
        service: Uuid,
        remembered: Option<&DeviceHandle>,
    ) -> Result<CharacteristicInfo, PrinterError> {
        let platform = Arc::clone(&self.platform);
        let platform = platform.as_ref();
        let writable = move |id: Uuid| async move {
            let info = platform.characteristic(link, service, id).await?;
            if info.is_writable() {
                Ok(info)
            } else {
                Err(PlatformError::NotFound)
            }
        };

        let preferred = candidates::ordered(
            [
                self.config.characteristic_id,
                remembered.and_then(|h| h.characteristic),
            ],
            &[],
        );
        let mut found = candidates::first_match(&preferred, writable)
            .await
            .map_err(|e| lost(Phase::CharacteristicLookup, e))?
            .map(|(_, info)| info);

        if found.is_none() {
            found = match platform.characteristics(link, service).await {
                Ok(all) => {
                    debug!(count = all.len(), "characteristics enumerated");
                    all.into_iter().find(CharacteristicInfo::is_writable)
                }
                Err(e @ (PlatformError::Disconnected | PlatformError::Timeout)) => {
                    return Err(lost(Phase::CharacteristicLookup, e));
                }
                Err(e) => {
                    debug!(error = %e, "enumeration unavailable, probing known characteristics");
                    candidates::first_match(&FALLBACK_CHARACTERISTICS, writable)
                        .await
                        .map_err(|e| lost(Phase::CharacteristicLookup, e))?
                        .map(|(_, info)| info)
                }
            };
        }

        let characteristic = found.ok_or(PrinterError::NoWritableCharacteristic { service })?;
        self.transition(TransportState::CharacteristicBound);
        info!(
            characteristic = %characteristic.uuid,
            kind = ?characteristic.write_kind(),
            "characteristic bound"
        );
        Ok(characteristic)
    }

    // ========================================================================
    // TRANSFER
    // ========================================================================

    async fn transfer(
        &mut self,
        binding: &Binding,
        stream: &CommandStream,
    ) -> Result<(), PrinterError> {
        let kind = binding
            .characteristic
            .write_kind()
            .ok_or(PrinterError::NoWritableCharacteristic {
                service: binding.service,
            })?;
        self.transition(TransportState::Transferring);

        let total = stream.chunk_count(CHUNK_SIZE);
        info!(bytes = stream.len(), chunks = total, "sending");

        for chunk in stream.chunks(CHUNK_SIZE) {
            if chunk.index > 0 {
                tokio::time::sleep(CHUNK_DELAY).await;
            }
            trace!(index = chunk.index, len = chunk.bytes.len(), "chunk");
            self.platform
                .write(
                    binding.link,
                    binding.service,
                    binding.characteristic.uuid,
                    chunk.bytes,
                    kind,
                )
                .await
                .map_err(|e| PrinterError::ChunkWriteFailure {
                    index: chunk.index,
                    reason: e.to_string(),
                })?;
        }

        tokio::time::sleep(SETTLE_DELAY).await;
        info!(chunks = total, "transfer complete");
        Ok(())
    }

    // ========================================================================
    // STATE
    // ========================================================================

    fn transition(&mut self, next: TransportState) {
        debug!(from = %self.state, to = %next, "transport state");
        self.state = next;
    }

    fn fail(&mut self, err: PrinterError) -> PrinterError {
        warn!(from = %self.state, error = %err, "transport failed");
        self.state = TransportState::Failed;
        err
    }
}

/// A link that dropped or stalled during lookup.
fn lost(phase: Phase, err: PlatformError) -> PrinterError {
    PrinterError::ConnectionLost {
        phase,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::loopback::LoopbackPlatform;
    use crate::transport::store::MemoryStore;

    fn transport(platform: LoopbackPlatform) -> (BluetoothTransport, Arc<LoopbackPlatform>) {
        let platform = Arc::new(platform);
        let transport = BluetoothTransport::new(
            platform.clone(),
            Arc::new(MemoryStore::new()),
            PrinterConfiguration::default(),
        );
        (transport, platform)
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_stops_before_transfer() {
        let (mut transport, platform) = transport(LoopbackPlatform::new());
        let handle = transport.probe().await.unwrap();

        assert_eq!(handle.service, Some(FALLBACK_SERVICES[0]));
        assert_eq!(transport.state(), TransportState::CharacteristicBound);
        assert_eq!(platform.write_count(), 0);
        assert_eq!(platform.open_links(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_reaches_done() {
        let (mut transport, platform) = transport(LoopbackPlatform::new());
        let stream = CommandStream::from_bytes((0..=255).collect());
        transport.send(&stream).await.unwrap();

        assert_eq!(transport.state(), TransportState::Done);
        assert_eq!(platform.received(), stream.as_bytes());
        assert_eq!(platform.write_count(), 13);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_send_still_releases_link() {
        let (mut transport, platform) = transport(LoopbackPlatform::new());
        let stream = CommandStream::from_bytes((0..=255).collect());

        let outcome = tokio::time::timeout(CHUNK_DELAY * 3, transport.send(&stream)).await;
        assert!(outcome.is_err());
        assert!(platform.write_count() < 13);

        tokio::task::yield_now().await;
        assert_eq!(platform.open_links(), 0);
        assert_eq!(platform.disconnections(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_radio() {
        let (mut transport, platform) = transport(LoopbackPlatform::new().unavailable());
        let err = transport.probe().await.unwrap_err();
        assert!(matches!(err, PrinterError::PlatformUnsupported));
        assert_eq!(transport.state(), TransportState::Failed);
        assert_eq!(platform.connection_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_delays() {
        let (mut transport, _platform) = transport(LoopbackPlatform::new());
        let stream = CommandStream::from_bytes(vec![0; CHUNK_SIZE * 3]);

        let start = tokio::time::Instant::now();
        transport.send(&stream).await.unwrap();
        assert_eq!(start.elapsed(), CHUNK_DELAY * 2 + SETTLE_DELAY);
    }
}
