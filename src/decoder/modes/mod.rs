//! QR code data mode decoders
//!
//! This module contains decoders for different QR data modes:
//! - Numeric: Efficient encoding for digits (0-9)
//! - Alphanumeric: Letters, numbers, and symbols
//! - Byte: 8-bit data (UTF-8, binary, etc.)
//! - Kanji: 13-bit packed Shift-JIS pairs

use crate::models::Version;

/// Alphanumeric mode (45-character set, 11 bits per pair)
pub mod alphanumeric;
/// Byte mode (raw 8-bit data)
pub mod byte;
/// Kanji mode (13-bit Shift-JIS)
pub mod kanji;
/// Numeric mode (10 bits per digit triple)
pub mod numeric;

/// Segment mode indicator (4 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// End of message
    Terminator,
    /// Digits, three per 10 bits
    Numeric,
    /// 45-character set, two per 11 bits
    Alphanumeric,
    /// Structured append header
    StructuredAppend,
    /// Raw 8-bit bytes
    Byte,
    /// GS1 FNC1 in first position
    Fnc1First,
    /// Extended channel interpretation
    Eci,
    /// Shift-JIS double-byte characters
    Kanji,
    /// AIM FNC1 in second position
    Fnc1Second,
}

impl Mode {
    /// Map a mode indicator to its mode, or `None` for reserved values
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0x0 => Some(Mode::Terminator),
            0x1 => Some(Mode::Numeric),
            0x2 => Some(Mode::Alphanumeric),
            0x3 => Some(Mode::StructuredAppend),
            0x4 => Some(Mode::Byte),
            0x5 => Some(Mode::Fnc1First),
            0x7 => Some(Mode::Eci),
            0x8 => Some(Mode::Kanji),
            0x9 => Some(Mode::Fnc1Second),
            _ => None,
        }
    }

    /// Width of the character count field for this mode at `version`
    pub fn char_count_bits(&self, version: Version) -> usize {
        let tier = match version.number() {
            1..=9 => 0,
            10..=26 => 1,
            _ => 2,
        };
        match self {
            Mode::Numeric => [10, 12, 14][tier],
            Mode::Alphanumeric => [9, 11, 13][tier],
            Mode::Byte => [8, 16, 16][tier],
            Mode::Kanji => [8, 10, 12][tier],
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_count_bits() {
        let v1 = Version::new(1).unwrap();
        let v10 = Version::new(10).unwrap();
        let v27 = Version::new(27).unwrap();
        assert_eq!(Mode::Byte.char_count_bits(v1), 8);
        assert_eq!(Mode::Byte.char_count_bits(v10), 16);
        assert_eq!(Mode::Numeric.char_count_bits(v27), 14);
        assert_eq!(Mode::Kanji.char_count_bits(v10), 10);
        assert_eq!(Mode::Eci.char_count_bits(v1), 0);
    }

    #[test]
    fn test_reserved_modes() {
        assert_eq!(Mode::from_bits(0b0100), Some(Mode::Byte));
        assert_eq!(Mode::from_bits(0b0110), None);
        assert_eq!(Mode::from_bits(0b1101), None);
    }
}
