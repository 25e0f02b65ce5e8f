/// Kanji mode decoder (Mode 1000)
/// Each character is 13 bits, expanded back into a two-byte Shift-JIS code
use crate::decoder::bitstream::BitReader;

/// Decodes Kanji segments into Shift-JIS bytes
pub struct KanjiDecoder;

impl KanjiDecoder {
    /// Append `count` Shift-JIS pairs to `out`; `None` on truncation
    pub fn decode(reader: &mut BitReader<'_>, count: usize, out: &mut Vec<u8>) -> Option<()> {
        for _ in 0..count {
            let value = reader.read(13)?;
            let assembled = ((value / 0xC0) << 8) | (value % 0xC0);
            let sjis = if assembled < 0x1F00 {
                assembled + 0x8140
            } else {
                assembled + 0xC140
            };
            out.push((sjis >> 8) as u8);
            out.push(sjis as u8);
        }
        Some(())
    }
}
