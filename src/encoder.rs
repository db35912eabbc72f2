//! # Command Encoder
//!
//! Assembles the complete printer program for one print call.
//!
//! ## Stream Layout
//!
//! ```text
//! ESC @        reset
//! ESC t 0      character table 0 (PC437)
//! ESC R 0      international set 0
//! ESC ! 0      clear text format
//! ESC a 0      left
//! [ESC a 1     center          ┐
//!  GS v 0 ...  logo raster     │ only with a logo
//!  LF                          │
//!  ESC a 0]    left            ┘
//! text...      formatter output, PC437
//! LF LF LF     feed past the cutter
//! GS V 0       cut
//! ```
//!
//! The order is fixed. Several printer firmwares apply state changes as they
//! arrive and do not buffer them, so nothing here may be reordered.

use crate::protocol::commands::{self, Alignment, LF};
use crate::protocol::cp437;

/// Bytes per radio write. Matches the smallest transfer unit every BLE
/// stack guarantees (23-byte ATT MTU minus 3 bytes of header).
pub const CHUNK_SIZE: usize = 20;

/// Text of the diagnostic print.
pub const DIAGNOSTIC_TEXT: &str = "BLUESLIP TEST PRINT\nPrinter connection OK\n";

/// A complete, immutable printer program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStream(Vec<u8>);

/// One radio write's worth of a [`CommandStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferChunk<'a> {
    /// Zero-based position in transmission order
    pub index: usize,
    pub bytes: &'a [u8],
}

impl CommandStream {
    /// Wrap an already assembled program.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Split into ordered chunks of `size` bytes; only the last may be shorter.
    ///
    /// Chunks are produced lazily as the iterator is advanced.
    ///
    /// ```
    /// use blueslip::encoder::CommandStream;
    ///
    /// let stream = CommandStream::from_bytes((0..45).collect());
    /// let sizes: Vec<usize> = stream.chunks(20).map(|c| c.bytes.len()).collect();
    /// assert_eq!(sizes, vec![20, 20, 5]);
    /// ```
    pub fn chunks(&self, size: usize) -> impl Iterator<Item = TransferChunk<'_>> {
        self.0
            .chunks(size)
            .enumerate()
            .map(|(index, bytes)| TransferChunk { index, bytes })
    }

    /// Number of chunks [`chunks`](Self::chunks) yields for `size`.
    pub fn chunk_count(&self, size: usize) -> usize {
        self.0.len().div_ceil(size)
    }
}

impl AsRef<[u8]> for CommandStream {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Setup sequence every program starts with.
fn preamble() -> Vec<u8> {
    let mut out = commands::init();
    out.extend(commands::character_table(0));
    out.extend(commands::international_set(0));
    out.extend(commands::text_format_reset());
    out.extend(commands::align(Alignment::Left));
    out
}

/// Build the program for a formatted receipt.
///
/// `raster_frame` is a complete `GS v 0` frame (see
/// [`RasterImage::frame`](crate::render::RasterImage::frame)); it is copied
/// verbatim.
pub fn encode(text: &str, raster_frame: Option<&[u8]>) -> CommandStream {
    let mut out = preamble();

    if let Some(frame) = raster_frame {
        out.extend(commands::align(Alignment::Center));
        out.extend_from_slice(frame);
        out.push(LF);
        out.extend(commands::align(Alignment::Left));
    }

    out.extend(cp437::encode(text));
    out.extend(commands::feed_and_cut());
    CommandStream(out)
}

/// A minimal program (reset, short text, cut) for isolating link problems
/// from rendering problems.
pub fn diagnostic_stream() -> CommandStream {
    let mut out = commands::init();
    out.extend(cp437::encode(DIAGNOSTIC_TEXT));
    out.extend(commands::feed_and_cut());
    CommandStream(out)
}
