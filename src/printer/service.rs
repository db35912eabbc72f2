//! # Printer Service
//!
//! The entry point applications hold on to. Ties the logo rasterizer, the
//! receipt formatter, the command encoder and the transport together.
//!
//! ## Operations
//!
//! | Operation | Formats | Rasterizes logo | Transfers |
//! |-----------|---------|-----------------|-----------|
//! | [`print`](PrinterService::print) | yes | yes (once) | yes |
//! | [`test_connection`](PrinterService::test_connection) | no | no | no |
//! | [`simple_diagnostic_print`](PrinterService::simple_diagnostic_print) | no | no | yes |
//!
//! Operations are serialized: a second call waits for the first to finish.

use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use super::config::PrinterConfiguration;
use crate::encoder::{self, CommandStream};
use crate::error::PrinterError;
use crate::receipt::{BusinessProfile, Formatter, ReceiptDocument};
use crate::render::loader::{self, LogoSource};
use crate::render::raster::{self, DEFAULT_THRESHOLD, RasterImage};
use crate::transport::{BluetoothTransport, DeviceHandle, KeyValueStore, RadioPlatform};

pub struct PrinterService {
    platform: Arc<dyn RadioPlatform>,
    store: Arc<dyn KeyValueStore>,
    config: PrinterConfiguration,
    business: BusinessProfile,
    /// Outcome of the one logo attempt; `None` inside means it failed
    logo: OnceCell<Option<RasterImage>>,
    busy: Mutex<()>,
}

impl PrinterService {
    pub fn new(
        platform: Arc<dyn RadioPlatform>,
        store: Arc<dyn KeyValueStore>,
        config: PrinterConfiguration,
        business: BusinessProfile,
    ) -> Self {
        Self {
            platform,
            store,
            config,
            business,
            logo: OnceCell::new(),
            busy: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &PrinterConfiguration {
        &self.config
    }

    /// Build the complete program for a receipt without sending it.
    ///
    /// The business logo, if configured, is fetched and rasterized on the
    /// first call only. A logo that fails to load is not retried; receipts
    /// then carry the text header.
    pub async fn render(&self, document: &ReceiptDocument) -> CommandStream {
        let logo = self.logo().await;
        let text = Formatter::new(self.config.paper_width)
            .with_logo(logo.is_some())
            .format(document);
        let frame = logo.map(RasterImage::frame);
        encoder::encode(&text, frame.as_deref())
    }

    /// Print a receipt.
    pub async fn print(&self, document: &ReceiptDocument) -> Result<(), PrinterError> {
        let _busy = self.busy.lock().await;
        let stream = self.render(document).await;
        info!(
            receipt = %document.receipt_number,
            bytes = stream.len(),
            "printing receipt"
        );
        self.transport().send(&stream).await?;
        Ok(())
    }

    /// Check that a compatible printer can be reached and bound, without
    /// printing anything.
    pub async fn test_connection(&self) -> Result<DeviceHandle, PrinterError> {
        let _busy = self.busy.lock().await;
        let handle = self.transport().probe().await?;
        info!(device = %handle.device_id, "printer reachable");
        Ok(handle)
    }

    /// Send a fixed reset/text/cut program, skipping formatting and images.
    pub async fn simple_diagnostic_print(&self) -> Result<(), PrinterError> {
        let _busy = self.busy.lock().await;
        self.transport().send(&encoder::diagnostic_stream()).await?;
        Ok(())
    }

    /// Stop reconnecting silently to the last printer.
    pub fn forget_printer(&self) -> Result<(), PrinterError> {
        DeviceHandle::forget(self.store.as_ref())?;
        info!("remembered printer cleared");
        Ok(())
    }

    /// The printer that will be reconnected to silently, if any.
    pub fn remembered_printer(&self) -> Result<Option<DeviceHandle>, PrinterError> {
        DeviceHandle::load(self.store.as_ref())
    }

    fn transport(&self) -> BluetoothTransport {
        BluetoothTransport::new(
            Arc::clone(&self.platform),
            Arc::clone(&self.store),
            self.config.clone(),
        )
    }

    async fn logo(&self) -> Option<&RasterImage> {
        self.logo
            .get_or_init(|| async {
                let reference = self.business.logo.as_deref()?;
                match self.load_logo(reference).await {
                    Ok(image) => {
                        debug!(
                            width = image.width,
                            height = image.height,
                            "logo cached"
                        );
                        Some(image)
                    }
                    Err(e) => {
                        warn!(error = %e, "logo unavailable, using text header");
                        None
                    }
                }
            })
            .await
            .as_ref()
    }

    async fn load_logo(&self, reference: &str) -> Result<RasterImage, PrinterError> {
        let source = LogoSource::parse(reference);
        let client = loader::http_client()?;
        let image = loader::load_image(&source, &client).await?;
        raster::rasterize(&image, self.config.paper_width.logo_max_dots(), DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::PaperWidth;
    use crate::receipt::Transaction;
    use crate::transport::{LoopbackPlatform, MemoryStore};

    fn document(business: &BusinessProfile) -> ReceiptDocument {
        let tx: Transaction = serde_json::from_value(serde_json::json!({
            "id": "tx-1",
            "receipt_number": "0001",
            "created_at": "2026-01-02T08:00:00",
            "items": [{"name": "Tea", "quantity": 1, "unit_price": 250}],
            "subtotal": 250,
            "total": 250
        }))
        .unwrap();
        ReceiptDocument::from_transaction(&tx, business, None, None, None)
    }

    fn service(business: BusinessProfile) -> PrinterService {
        PrinterService::new(
            Arc::new(LoopbackPlatform::new()),
            Arc::new(MemoryStore::new()),
            PrinterConfiguration {
                paper_width: PaperWidth::Cols48,
                ..Default::default()
            },
            business,
        )
    }

    #[tokio::test]
    async fn test_render_without_logo_has_no_raster() {
        let business = BusinessProfile {
            name: "Tea Shop".into(),
            ..Default::default()
        };
        let service = service(business.clone());
        let stream = service.render(&document(&business)).await;
        let bytes = stream.as_bytes();
        assert!(!bytes.windows(3).any(|w| w == [0x1D, 0x76, 0x30]));
        assert!(bytes.windows(8).any(|w| w == b"Tea Shop"));
    }

    #[tokio::test]
    async fn test_missing_logo_falls_back_to_text_header() {
        let business = BusinessProfile {
            name: "Tea Shop".into(),
            logo: Some("/nonexistent/blueslip/logo.png".into()),
            ..Default::default()
        };
        let service = service(business.clone());
        let first = service.render(&document(&business)).await;
        let second = service.render(&document(&business)).await;
        assert_eq!(first, second);
        assert!(first.as_bytes().windows(8).any(|w| w == b"Tea Shop"));
        assert!(service.logo.get().is_some_and(Option::is_none));
    }
}
