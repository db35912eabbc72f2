//! # Code Page 437 Encoding
//!
//! Receipt text goes over the wire one byte per character. The stream selects
//! character table 0 (`ESC t 0`), which is PC437 on ESC/POS printers, so text
//! is encoded against that table here.
//!
//! ASCII passes through unchanged. Anything outside PC437 is replaced with
//! `?` and logged; keeping receipt text representable is the caller's job.

use tracing::warn;

/// Upper half of PC437: `HIGH_HALF[b - 0x80]` is the character printed for byte `b`.
const HIGH_HALF: [char; 128] = [
    // 0x80
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    // 0x90
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    // 0xA0
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    // 0xB0
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    // 0xC0
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    // 0xD0
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    // 0xE0
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    // 0xF0
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00A0}',
];

/// Map a character to its PC437 byte, if it has one.
pub fn to_byte(ch: char) -> Option<u8> {
    if ch.is_ascii() {
        return Some(ch as u8);
    }
    HIGH_HALF
        .iter()
        .position(|&c| c == ch)
        .map(|i| 0x80 + i as u8)
}

/// Whether every character of `s` survives encoding unchanged.
pub fn is_representable(s: &str) -> bool {
    s.chars().all(|ch| to_byte(ch).is_some())
}

/// Encode a Unicode string as PC437 bytes.
///
/// ```
/// use blueslip::protocol::cp437;
///
/// assert_eq!(cp437::encode("Café"), vec![0x43, 0x61, 0x66, 0x82]);
/// ```
pub fn encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        match to_byte(ch) {
            Some(byte) => out.push(byte),
            None => {
                warn!(
                    "cp437: unmapped character '{}' (U+{:04X}), replacing with '?'",
                    ch, ch as u32
                );
                out.push(b'?');
            }
        }
    }
    out
}
