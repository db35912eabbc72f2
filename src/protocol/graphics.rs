//! # ESC/POS Raster Graphics
//!
//! The only image command this crate emits is `GS v 0`, the "print raster bit
//! image" command. It is the one bitmap command that practically every cheap
//! Bluetooth receipt printer implements.
//!
//! ## Bit Packing
//!
//! - Bit 7 (MSB) = leftmost dot
//! - Bit 0 (LSB) = rightmost dot
//! - 1 = black (print), 0 = white (no print)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0xAA = 10101010 = █░█░█░█░
//! ```

use super::commands::{GS, u16_le};

/// Opcode prefix of the raster bit image command (`GS v 0`).
pub const RASTER_OPCODE: [u8; 3] = [GS, b'v', b'0'];

/// Length of the frame header that precedes the bitmap bytes.
pub const RASTER_HEADER_LEN: usize = 8;

/// Raster scaling mode (`m` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterMode {
    Normal = 0,
    DoubleWidth = 1,
    DoubleHeight = 2,
    Quadruple = 3,
}

/// # Print Raster Bit Image (GS v 0 m xL xH yL yH d1...dk)
///
/// | Format | Bytes |
/// |--------|-------|
/// | ASCII  | GS v 0 m xL xH yL yH d1...dk |
/// | Hex    | 1D 76 30 m xL xH yL yH d1...dk |
///
/// ## Parameters
///
/// - `width_bytes`: bytes per row, `ceil(width_dots / 8)`
/// - `height`: number of rows
/// - `data`: row-major bitmap, `k = width_bytes × height`
///
/// The mode byte is always [`RasterMode::Normal`].
///
/// ```
/// use blueslip::protocol::graphics;
///
/// let data = vec![0xFF; 2 * 3];
/// let cmd = graphics::raster_bit_image(2, 3, &data);
/// assert_eq!(&cmd[..8], &[0x1D, 0x76, 0x30, 0x00, 2, 0, 3, 0]);
/// assert_eq!(cmd.len(), 8 + 6);
/// ```
pub fn raster_bit_image(width_bytes: u16, height: u16, data: &[u8]) -> Vec<u8> {
    debug_assert!(
        data.len() == width_bytes as usize * height as usize,
        "Raster data length mismatch. Expected {} ({} bytes × {} rows), got {}",
        width_bytes as usize * height as usize,
        width_bytes,
        height,
        data.len()
    );

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(RASTER_HEADER_LEN + data.len());
    cmd.extend_from_slice(&RASTER_OPCODE);
    cmd.push(RasterMode::Normal as u8);
    cmd.push(xl);
    cmd.push(xh);
    cmd.push(yl);
    cmd.push(yh);
    cmd.extend_from_slice(data);
    cmd
}
