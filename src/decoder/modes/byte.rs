/// Byte mode decoder (Mode 0100)
/// Each character is 8 bits; the payload keeps the raw bytes
use crate::decoder::bitstream::BitReader;

/// Decodes 8-bit byte segments
pub struct ByteDecoder;

impl ByteDecoder {
    /// Append `count` raw bytes to `out`; `None` on truncation
    pub fn decode(reader: &mut BitReader<'_>, count: usize, out: &mut Vec<u8>) -> Option<()> {
        if reader.remaining() < count * 8 {
            return None;
        }
        out.reserve(count);
        for _ in 0..count {
            out.push(reader.read(8)? as u8);
        }
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_decode() {
        let bytes = b"Hi\xFF";
        let mut out = Vec::new();
        ByteDecoder::decode(&mut BitReader::new(bytes), 3, &mut out).unwrap();
        assert_eq!(out, b"Hi\xFF");
    }

    #[test]
    fn test_byte_truncated() {
        let mut out = Vec::new();
        assert!(ByteDecoder::decode(&mut BitReader::new(b"ab"), 3, &mut out).is_none());
        assert!(out.is_empty());
    }
}
