//! Known printer endpoints and the try-in-order lookup routine.
//!
//! Cheap BLE receipt printers rarely document their GATT layout. The
//! fallback lists below cover the vendor layouts seen in the field; a
//! configured or remembered identifier is always tried first.

use std::future::Future;

use tracing::debug;
use uuid::Uuid;

use crate::error::{PlatformError, PrinterError};

/// `0000xxxx-0000-1000-8000-00805f9b34fb`, the Bluetooth SIG base UUID.
const BLUETOOTH_BASE: u128 = 0x0000_0000_0000_1000_8000_0080_5f9b_34fb;

/// Expand a 16-bit assigned number onto the Bluetooth base UUID.
pub const fn short_uuid(short: u16) -> Uuid {
    Uuid::from_u128(BLUETOOTH_BASE | ((short as u128) << 96))
}

/// Expand a 32-bit assigned number onto the Bluetooth base UUID.
pub const fn short_uuid32(short: u32) -> Uuid {
    Uuid::from_u128(BLUETOOTH_BASE | ((short as u128) << 96))
}

/// Printer services, in the order they are probed.
pub const FALLBACK_SERVICES: [Uuid; 4] = [
    short_uuid(0x18f0),
    Uuid::from_u128(0xe7810a71_73ae_499d_8c15_faa9aef0c3f2),
    Uuid::from_u128(0x49535343_fe7d_4ae5_8fa9_9fafd205e455),
    short_uuid(0xff00),
];

/// Printer write characteristics, in the order they are probed when a
/// service cannot be enumerated.
pub const FALLBACK_CHARACTERISTICS: [Uuid; 4] = [
    short_uuid(0x2af1),
    Uuid::from_u128(0xbef8d6c9_9c21_4c9e_b632_bd58c1009f9f),
    Uuid::from_u128(0x49535343_8841_43f4_a8d4_ecbe34729bb3),
    short_uuid(0xff02),
];

/// Parse a service or characteristic identifier.
///
/// Accepts full hyphenated UUIDs and 16/32-bit short forms with or without
/// a `0x` prefix.
///
/// ```
/// use blueslip::transport::candidates::parse_identifier;
///
/// let full = parse_identifier("000018f0-0000-1000-8000-00805f9b34fb").unwrap();
/// assert_eq!(parse_identifier("0x18F0").unwrap(), full);
/// assert_eq!(parse_identifier("18f0").unwrap(), full);
/// ```
pub fn parse_identifier(raw: &str) -> Result<Uuid, PrinterError> {
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let invalid = || PrinterError::InvalidConfig(format!("not a Bluetooth identifier: {:?}", raw));
    let is_hex = !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());

    match hex.len() {
        1..=4 if is_hex => u16::from_str_radix(hex, 16)
            .map(short_uuid)
            .map_err(|_| invalid()),
        5..=8 if is_hex => u32::from_str_radix(hex, 16)
            .map(short_uuid32)
            .map_err(|_| invalid()),
        _ => Uuid::parse_str(trimmed).map_err(|_| invalid()),
    }
}

/// Preferred identifiers followed by `fallbacks`, duplicates removed, first
/// occurrence wins.
pub fn ordered<I>(preferred: I, fallbacks: &[Uuid]) -> Vec<Uuid>
where
    I: IntoIterator<Item = Option<Uuid>>,
{
    let mut out: Vec<Uuid> = Vec::with_capacity(fallbacks.len() + 2);
    for id in preferred.into_iter().flatten().chain(fallbacks.iter().copied()) {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// Whether a lookup error means "try the next candidate" rather than
/// "the link is gone".
fn is_miss(err: &PlatformError) -> bool {
    !matches!(err, PlatformError::Disconnected | PlatformError::Timeout)
}

/// Probe `candidates` in order and return the first one that resolves.
///
/// Misses are skipped. A dropped or timed-out link ends the search with that
/// error. `Ok(None)` means every candidate missed.
pub async fn first_match<T, F, Fut>(
    candidates: &[Uuid],
    mut probe: F,
) -> Result<Option<(Uuid, T)>, PlatformError>
where
    F: FnMut(Uuid) -> Fut,
    Fut: Future<Output = Result<T, PlatformError>>,
{
    for &candidate in candidates {
        match probe(candidate).await {
            Ok(found) => return Ok(Some((candidate, found))),
            Err(err) if is_miss(&err) => {
                debug!(%candidate, error = %err, "candidate missed");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(None)
}
