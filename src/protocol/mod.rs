//! # ESC/POS Protocol Implementation
//!
//! Low-level byte builders for the printer control language.
//!
//! ## Module Structure
//!
//! - [`commands`]: Initialization, alignment, feed and cut
//! - [`graphics`]: Raster bit image frames (`GS v 0`)
//! - [`cp437`]: Single-byte text encoding for character table 0
//!
//! ## Usage Example
//!
//! ```
//! use blueslip::protocol::{commands, cp437};
//!
//! let mut data = Vec::new();
//! data.extend(commands::init());
//! data.extend(commands::align(commands::Alignment::Center));
//! data.extend(cp437::encode("RECEIPT\n"));
//! data.extend(commands::feed_and_cut());
//! ```

pub mod commands;
pub mod cp437;
pub mod graphics;
