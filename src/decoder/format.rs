/// Format information extraction from QR code
use crate::decoder::bch::FORMAT_CODE;
use crate::models::{BitMatrix, ECLevel, MaskPattern};

/// XOR mask applied to every format codeword
pub const FORMAT_MASK: u32 = 0x5412;

/// Format info is 15 bits (5 data + 10 ECC), stored twice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    /// Error correction level
    pub ec_level: ECLevel,
    /// Data mask
    pub mask_pattern: MaskPattern,
}

impl FormatInfo {
    /// Read the copy around the top-left finder, falling back to the split copy
    pub fn read(matrix: &BitMatrix) -> Option<Self> {
        let size = matrix.width();
        let [primary, secondary] = format_positions(size);
        let read_copy = |positions: &[(usize, usize); 15]| {
            positions
                .iter()
                .enumerate()
                .fold(0u32, |bits, (i, &(x, y))| bits | (matrix.get(x, y) as u32) << i)
        };

        let first = read_copy(&primary);
        if let Some(info) = Self::decode(first) {
            return Some(info);
        }
        let second = read_copy(&secondary);
        let info = Self::decode(second);
        log::trace!(
            "format copy 1 0b{first:015b} unreadable, copy 2 0b{second:015b} -> {info:?}"
        );
        info
    }

    /// Nearest valid format word within three bit errors
    pub fn decode(bits: u32) -> Option<Self> {
        let (data, _) = FORMAT_CODE.decode_nearest(bits, 0..32, |c| c ^ FORMAT_MASK)?;
        Some(Self {
            ec_level: ECLevel::from_format_bits((data >> 3) as u8),
            mask_pattern: MaskPattern::from_bits(data as u8),
        })
    }

    /// Masked 15-bit codeword for this format
    pub fn encode(&self) -> u32 {
        let data = ((self.ec_level.format_bits() as u32) << 3) | self.mask_pattern.bits() as u32;
        FORMAT_CODE.encode(data) ^ FORMAT_MASK
    }
}

/// Module `(x, y)` holding bit `i` (LSB = 0) of each format copy
///
/// Copy 1 wraps the top-left finder; copy 2 is split between the bottom-left
/// (bits 8..14) and top-right (bits 0..7) finders.
pub fn format_positions(size: usize) -> [[(usize, usize); 15]; 2] {
    let mut primary = [(0, 0); 15];
    let mut secondary = [(0, 0); 15];
    for (i, slot) in primary.iter_mut().enumerate() {
        *slot = match i {
            0..=5 => (8, i),
            6 => (8, 7),
            7 => (8, 8),
            8 => (7, 8),
            _ => (14 - i, 8),
        };
    }
    for (i, slot) in secondary.iter_mut().enumerate() {
        *slot = if i < 8 {
            (size - 1 - i, 8)
        } else {
            (8, size - 15 + i)
        };
    }
    [primary, secondary]
}
