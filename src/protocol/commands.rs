//! # ESC/POS Protocol Commands
//!
//! Byte builders for the small subset of ESC/POS that receipt printing needs.
//! Nearly every Bluetooth LE thermal printer sold for point-of-sale use
//! understands this subset, even when the rest of its command set is
//! vendor-specific.
//!
//! ## Escape Sequence Structure
//!
//! Commands follow these patterns:
//! - Single byte: `LF`
//! - Two bytes: `ESC @`
//! - Multi-byte with parameters: `ESC a n`, `GS V m`, `GS v 0 m xL xH yL yH d...`
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - Extended command prefix
///
/// Used for graphics (`GS v 0`) and the cutter (`GS V`).
pub const GS: u8 = 0x1D;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

/// Line feeds emitted before the cut so the last line clears the blade.
pub const FEED_LINES_BEFORE_CUT: usize = 3;

// ============================================================================
// INITIALIZATION COMMANDS
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and restores power-on defaults.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | ASCII   | ESC @ |
/// | Hex     | 1B 40 |
///
/// ```
/// use blueslip::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Select Character Code Table (ESC t n)
///
/// Table 0 is PC437 on every printer we have seen, which is what
/// [`cp437::encode`](super::cp437::encode) produces.
#[inline]
pub fn character_table(n: u8) -> Vec<u8> {
    vec![ESC, b't', n]
}

/// # Select International Character Set (ESC R n)
///
/// Set 0 is U.S.A.; it leaves `#`, `$`, `@` and the brackets untouched.
#[inline]
pub fn international_set(n: u8) -> Vec<u8> {
    vec![ESC, b'R', n]
}

/// # Select Print Mode (ESC ! n)
///
/// `n = 0` clears emphasis, double height/width and font B in one go.
#[inline]
pub fn text_format_reset() -> Vec<u8> {
    vec![ESC, b'!', 0]
}

// ============================================================================
// ALIGNMENT
// ============================================================================

/// Horizontal justification for `ESC a n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left = 0,
    Center = 1,
    Right = 2,
}

/// # Select Justification (ESC a n)
///
/// | Alignment | Bytes    |
/// |-----------|----------|
/// | Left      | 1B 61 00 |
/// | Center    | 1B 61 01 |
/// | Right     | 1B 61 02 |
///
/// Applies to text and to raster images printed after it.
#[inline]
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, b'a', alignment as u8]
}

// ============================================================================
// PAPER FEED AND CUT
// ============================================================================

/// Feed `n` blank lines using plain `LF` bytes.
#[inline]
pub fn feed_lines(n: usize) -> Vec<u8> {
    vec![LF; n]
}

/// # Full Cut (GS V 0)
///
/// | Format  | Bytes    |
/// |---------|----------|
/// | ASCII   | GS V 0   |
/// | Hex     | 1D 56 00 |
///
/// Printers without a cutter ignore it.
#[inline]
pub fn cut() -> Vec<u8> {
    vec![GS, b'V', 0]
}

/// Feed past the cutter, then cut.
///
/// ```
/// use blueslip::protocol::commands;
///
/// assert_eq!(
///     commands::feed_and_cut(),
///     vec![0x0A, 0x0A, 0x0A, 0x1D, 0x56, 0x00]
/// );
/// ```
pub fn feed_and_cut() -> Vec<u8> {
    let mut cmd = feed_lines(FEED_LINES_BEFORE_CUT);
    cmd.extend(cut());
    cmd
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Encode a u16 value as little-endian bytes [low, high]
///
/// ```
/// use blueslip::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(48), [0x30, 0x00]);
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// TESTS
// ============================================================================
