//! Logo loading: fetches and decodes the branding image.
//!
//! A logo reference is either an `http(s)://` URL or a local file path.
//! Loading is one awaited call with a single success/failure result; every
//! failure comes back as [`PrinterError::ImageLoadFailure`] so the caller
//! can fall back to a text header.

use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::error::PrinterError;

/// User agent sent when downloading logos.
pub const USER_AGENT: &str = concat!("blueslip/", env!("CARGO_PKG_VERSION"));

/// Where a logo comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource<'a> {
    Url(&'a str),
    File(&'a Path),
}

impl<'a> LogoSource<'a> {
    /// Classify a logo reference from configuration.
    pub fn parse(reference: &'a str) -> Self {
        let lower = reference.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            LogoSource::Url(reference)
        } else {
            LogoSource::File(Path::new(reference))
        }
    }
}

/// Build the HTTP client used for logo downloads.
pub fn http_client() -> Result<reqwest::Client, PrinterError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| PrinterError::ImageLoadFailure(format!("HTTP client error: {}", e)))
}

/// Fetch and decode a logo.
pub async fn load_image(
    source: &LogoSource<'_>,
    client: &reqwest::Client,
) -> Result<DynamicImage, PrinterError> {
    let bytes = match source {
        LogoSource::Url(url) => download(url, client).await?,
        LogoSource::File(path) => tokio::fs::read(path).await.map_err(|e| {
            PrinterError::ImageLoadFailure(format!("Failed to read {}: {}", path.display(), e))
        })?,
    };
    debug!(bytes = bytes.len(), "decoding logo");

    image::load_from_memory(&bytes)
        .map_err(|e| PrinterError::ImageLoadFailure(format!("Failed to decode image: {}", e)))
}

async fn download(url: &str, client: &reqwest::Client) -> Result<Vec<u8>, PrinterError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| PrinterError::ImageLoadFailure(format!("Failed to download {}: {}", url, e)))?;
    if !response.status().is_success() {
        return Err(PrinterError::ImageLoadFailure(format!(
            "Failed to download {}: HTTP {}",
            url,
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| PrinterError::ImageLoadFailure(format!("Failed to read image data: {}", e)))?;
    Ok(bytes.to_vec())
}
