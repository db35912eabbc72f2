//! # Rendering Module
//!
//! Image handling for the receipt logo.
//!
//! ## Modules
//!
//! - [`loader`]: Fetch a logo from a URL or file and decode it
//! - [`raster`]: Downscale, threshold and bit-pack into a raster frame
//!
//! ## Usage Example
//!
//! ```
//! use blueslip::render::raster::{self, DEFAULT_THRESHOLD};
//! use image::{DynamicImage, Rgb, RgbImage};
//!
//! let logo = DynamicImage::ImageRgb8(RgbImage::from_pixel(600, 120, Rgb([0, 0, 0])));
//! let bitmap = raster::rasterize(&logo, 384, DEFAULT_THRESHOLD)?;
//! assert_eq!(bitmap.width, 384);
//! assert_eq!(bitmap.data.len(), 48 * bitmap.height as usize);
//!
//! // bitmap.frame() is ready to splice into a command stream
//! # Ok::<(), blueslip::PrinterError>(())
//! ```

pub mod loader;
pub mod raster;

pub use raster::{RasterImage, rasterize};
