//! # Logo Rasterization
//!
//! Turns a decoded image into the 1-bit bitmap the printer's raster command
//! expects.
//!
//! ## Pipeline
//!
//! 1. Downscale (never upscale) to at most `max_width` dots, keeping aspect ratio
//! 2. Composite over white, so transparent logo backgrounds stay unprinted
//! 3. Luminance `0.299R + 0.587G + 0.114B`; below `threshold` prints black
//! 4. Pack 8 dots per byte, MSB first, zero-padding the last byte of each row
//!
//! Plain thresholding is used instead of dithering: logos are line art and
//! the output must be stable when fed back in (an already monochrome image
//! rasterizes to identical bytes).

use std::borrow::Cow;

use image::{DynamicImage, GrayImage, Luma, imageops::FilterType};

use crate::error::PrinterError;
use crate::protocol::graphics;

/// Luminance cutoff used when the caller has no opinion.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// A packed monochrome bitmap.
///
/// Rows are `ceil(width / 8)` bytes each, most significant bit first,
/// `1` = black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u16,
    pub height: u16,
    pub data: Vec<u8>,
}

impl RasterImage {
    /// Bytes per row.
    #[inline]
    pub fn width_bytes(&self) -> u16 {
        self.width.div_ceil(8)
    }

    /// Whether the dot at `(x, y)` is black.
    pub fn is_black(&self, x: usize, y: usize) -> bool {
        let byte = self.data[y * self.width_bytes() as usize + x / 8];
        (byte >> (7 - (x % 8))) & 1 == 1
    }

    /// The `GS v 0` command frame for this bitmap.
    pub fn frame(&self) -> Vec<u8> {
        graphics::raster_bit_image(self.width_bytes(), self.height, &self.data)
    }

    /// Unpack into an 8-bit grayscale image (black = 0, white = 255).
    pub fn to_image(&self) -> GrayImage {
        let mut img = GrayImage::new(self.width as u32, self.height as u32);
        for y in 0..self.height as usize {
            for x in 0..self.width as usize {
                let color = if self.is_black(x, y) { 0u8 } else { 255u8 };
                img.put_pixel(x as u32, y as u32, Luma([color]));
            }
        }
        img
    }
}

/// Perceived brightness of an RGB pixel in thousandths, 0 (black) to
/// 255_000 (white).
///
/// Integer weights keep a uniform gray `v` at exactly `v * 1000`, so the
/// threshold comparison has no rounding error.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u32 {
    299 * r as u32 + 587 * g as u32 + 114 * b as u32
}

/// Pack a row of boolean pixel values into bytes.
///
/// If the row length is not a multiple of 8, the last byte is padded
/// with zeros (white) on the right.
///
/// ```
/// use blueslip::render::raster::pack_row;
///
/// assert_eq!(pack_row(&[true, true, true, true, false, false, false, false]), vec![0xF0]);
/// assert_eq!(pack_row(&[true; 12]), vec![0xFF, 0xF0]);
/// ```
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let num_bytes = pixels.len().div_ceil(8);
    let mut bytes = vec![0u8; num_bytes];

    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }

    bytes
}

/// Target dimensions after fitting `width × height` into `max_width`.
///
/// Images already narrow enough keep their size.
pub fn fit_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let scaled = (height as u64 * max_width as u64 + width as u64 / 2) / width as u64;
    (max_width, scaled.max(1) as u32)
}

/// Rasterize an image for the printer.
///
/// ## Errors
///
/// [`PrinterError::ImageLoadFailure`] if the image is empty or too tall for
/// the raster command's 16-bit row count.
pub fn rasterize(
    image: &DynamicImage,
    max_width: u16,
    threshold: u8,
) -> Result<RasterImage, PrinterError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PrinterError::ImageLoadFailure(
            "image has no pixels".to_string(),
        ));
    }
    if max_width == 0 {
        return Err(PrinterError::InvalidConfig(
            "raster width must be at least one dot".to_string(),
        ));
    }

    let (width, height) = fit_width(image.width(), image.height(), max_width as u32);
    let height = u16::try_from(height).map_err(|_| {
        PrinterError::ImageLoadFailure(format!("image too tall to print ({} rows)", height))
    })?;

    let scaled: Cow<'_, DynamicImage> = if width == image.width() {
        Cow::Borrowed(image)
    } else {
        Cow::Owned(image.resize_exact(width, height as u32, FilterType::Triangle))
    };
    let rgba = scaled.to_rgba8();

    let width_bytes = (width as usize).div_ceil(8);
    let mut data = Vec::with_capacity(width_bytes * height as usize);
    let mut row = Vec::with_capacity(width as usize);

    for y in 0..height as u32 {
        row.clear();
        for x in 0..width {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            let lum = luminance(over_white(r, a), over_white(g, a), over_white(b, a));
            row.push(lum < 1000 * threshold as u32);
        }
        data.extend(pack_row(&row));
    }

    Ok(RasterImage {
        width: width as u16,
        height,
        data,
    })
}

#[inline]
fn over_white(channel: u8, alpha: u8) -> u8 {
    let c = channel as u32 * alpha as u32 + 255 * (255 - alpha as u32);
    (c / 255) as u8
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn checkerboard(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_pack_row_padding() {
        assert_eq!(pack_row(&[true, true, true, true]), vec![0xF0]);
        assert_eq!(pack_row(&[true; 9]), vec![0xFF, 0x80]);
        assert_eq!(pack_row(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_luminance_weights() {
        assert_eq!(luminance(0, 0, 0), 0);
        assert_eq!(luminance(255, 255, 255), 255_000);
        // Pure green reads far brighter than pure blue
        assert!(luminance(0, 255, 0) > 128_000);
        assert!(luminance(0, 0, 255) < 128_000);
    }

    #[test]
    fn test_fit_width_never_upscales() {
        assert_eq!(fit_width(100, 50, 384), (100, 50));
        assert_eq!(fit_width(768, 200, 384), (384, 100));
        assert_eq!(fit_width(1000, 1, 384), (384, 1));
    }

    #[test]
    fn test_rasterize_checkerboard() {
        let raster = rasterize(&checkerboard(10, 2), 384, DEFAULT_THRESHOLD).unwrap();
        assert_eq!(raster.width, 10);
        assert_eq!(raster.width_bytes(), 2);
        // Row 0: 1010101010 -> 10101010 10000000
        assert_eq!(raster.data, vec![0xAA, 0x80, 0x55, 0x40]);
    }

    #[test]
    fn test_rasterize_downscales() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(800, 400, Rgb([0, 0, 0])));
        let raster = rasterize(&img, 384, DEFAULT_THRESHOLD).unwrap();
        assert_eq!((raster.width, raster.height), (384, 192));
        assert_eq!(raster.data.len(), 48 * 192);
        assert!(raster.data.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_threshold_boundary() {
        let gray = |v| DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 1, Rgb([v, v, v])));
        assert_eq!(rasterize(&gray(126), 8, 128).unwrap().data, vec![0xFF]);
        assert_eq!(rasterize(&gray(129), 8, 128).unwrap().data, vec![0x00]);
    }

    #[test]
    fn test_gray_equal_to_threshold_is_white() {
        let gray = |v| DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 1, Rgb([v, v, v])));
        for v in 1..=255u8 {
            assert_eq!(rasterize(&gray(v), 8, v).unwrap().data, vec![0x00], "gray {}", v);
            assert_eq!(rasterize(&gray(v - 1), 8, v).unwrap().data, vec![0xFF], "gray {}", v - 1);
        }
    }

    #[test]
    fn test_transparent_pixels_are_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 1, Rgba([0, 0, 0, 0])));
        assert_eq!(rasterize(&img, 8, 128).unwrap().data, vec![0x00]);
    }

    #[test]
    fn test_monochrome_is_idempotent() {
        let first = rasterize(&checkerboard(13, 7), 384, DEFAULT_THRESHOLD).unwrap();
        let again = rasterize(
            &DynamicImage::ImageLuma8(first.to_image()),
            384,
            DEFAULT_THRESHOLD,
        )
        .unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_empty_image_fails() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            rasterize(&img, 384, DEFAULT_THRESHOLD),
            Err(PrinterError::ImageLoadFailure(_))
        ));
    }

    #[test]
    fn test_frame_header_matches_dimensions() {
        let raster = rasterize(&checkerboard(17, 3), 384, DEFAULT_THRESHOLD).unwrap();
        let frame = raster.frame();
        assert_eq!(&frame[..4], &[0x1D, 0x76, 0x30, 0x00]);
        assert_eq!(&frame[4..8], &[3, 0, 3, 0]);
        assert_eq!(frame.len(), 8 + 3 * 3);
    }
}
