/// Alphanumeric mode decoder (Mode 0010)
/// Alphanumeric character set: 0-9, A-Z, space, $%*+-./:
use crate::decoder::bitstream::BitReader;

const ALPHANUMERIC_TABLE: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Decode alphanumeric data
/// Pairs = 11 bits, single = 6 bits
pub struct AlphanumericDecoder;

impl AlphanumericDecoder {
    /// Append `count` characters to `out`; `None` on truncation or invalid values
    pub fn decode(reader: &mut BitReader<'_>, count: usize, out: &mut Vec<u8>) -> Option<()> {
        let mut remaining = count;
        while remaining >= 2 {
            let value = reader.read(11)? as usize;
            if value >= 45 * 45 {
                return None;
            }
            out.push(ALPHANUMERIC_TABLE[value / 45]);
            out.push(ALPHANUMERIC_TABLE[value % 45]);
            remaining -= 2;
        }
        if remaining == 1 {
            let value = reader.read(6)? as usize;
            out.push(*ALPHANUMERIC_TABLE.get(value)?);
        }
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphanumeric_decode() {
        // "AC-3": AC = 10*45+12 = 462 -> 00111001110, -3 = 41*45+3 = 1848 -> 11100111000
        let bytes = [0b0011_1001, 0b1101_1100, 0b1110_0000];
        let mut out = Vec::new();
        AlphanumericDecoder::decode(&mut BitReader::new(&bytes), 4, &mut out).unwrap();
        assert_eq!(out, b"AC-3");
    }

    #[test]
    fn test_single_trailing_character() {
        // 'Z' = 35 -> 100011
        let bytes = [0b1000_1100];
        let mut out = Vec::new();
        AlphanumericDecoder::decode(&mut BitReader::new(&bytes), 1, &mut out).unwrap();
        assert_eq!(out, b"Z");
    }

    #[test]
    fn test_rejects_invalid_single() {
        // 63 is outside the 45-character table
        let bytes = [0b1111_1100];
        let mut out = Vec::new();
        assert!(AlphanumericDecoder::decode(&mut BitReader::new(&bytes), 1, &mut out).is_none());
    }
}
