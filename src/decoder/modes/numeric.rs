/// Numeric mode decoder (Mode 0001)
/// Groups of 3 digits = 10 bits, 2 digits = 7 bits, 1 digit = 4 bits
use crate::decoder::bitstream::BitReader;

/// Decodes numeric segments
pub struct NumericDecoder;

impl NumericDecoder {
    /// Append `count` ASCII digits to `out`; `None` on truncation or out-of-range groups
    pub fn decode(reader: &mut BitReader<'_>, count: usize, out: &mut Vec<u8>) -> Option<()> {
        let mut remaining = count;
        while remaining > 0 {
            let group = remaining.min(3);
            let (bits, limit) = match group {
                3 => (10, 1000),
                2 => (7, 100),
                _ => (4, 10),
            };
            let value = reader.read(bits)?;
            if value >= limit {
                return None;
            }
            let digits = format!("{:0width$}", value, width = group);
            out.extend_from_slice(digits.as_bytes());
            remaining -= group;
        }
        Some(())
    }
}
