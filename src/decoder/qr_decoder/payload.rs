use crate::decoder::bitstream::BitReader;
use crate::decoder::modes::Mode;
use crate::decoder::modes::alphanumeric::AlphanumericDecoder;
use crate::decoder::modes::byte::ByteDecoder;
use crate::decoder::modes::kanji::KanjiDecoder;
use crate::decoder::modes::numeric::NumericDecoder;
use crate::decoder::reed_solomon::ReedSolomonDecoder;
use crate::decoder::tables::EcBlockInfo;
use crate::error::DecodeError;
use crate::models::Version;

const GROUP_SEPARATOR: u8 = 0x1D;

/// Split interleaved codewords into RS blocks, correct each, and concatenate the data parts.
///
/// Returns the data codewords and the total number of corrected codewords.
pub(crate) fn deinterleave_and_correct(
    codewords: &[u8],
    info: &EcBlockInfo,
) -> Result<(Vec<u8>, usize), DecodeError> {
    if codewords.len() != info.total_codewords {
        return Err(DecodeError::InvalidData(
            "codeword count does not match the version",
        ));
    }

    let num_short_blocks = info.num_blocks - info.long_blocks();
    let short_len = info.short_block_data_len();
    let long_len = short_len + 1;
    let data_len = |b: usize| if b < num_short_blocks { short_len } else { long_len };

    let mut blocks: Vec<Vec<u8>> = (0..info.num_blocks)
        .map(|_| Vec::with_capacity(long_len + info.ecc_per_block))
        .collect();

    let mut stream = codewords.iter().copied();
    for i in 0..long_len {
        for (b, block) in blocks.iter_mut().enumerate() {
            if i < data_len(b) {
                block.extend(stream.next());
            }
        }
    }
    for _ in 0..info.ecc_per_block {
        for block in blocks.iter_mut() {
            block.extend(stream.next());
        }
    }

    let rs = ReedSolomonDecoder::new(info.ecc_per_block);
    let mut data_out = Vec::with_capacity(info.data_codewords());
    let mut corrected = 0;
    for (b, block) in blocks.iter_mut().enumerate() {
        match rs.decode(block) {
            Ok(fixed) => corrected += fixed,
            Err(reason) => {
                log::debug!("RS block {b} failed: {reason}");
                return Err(DecodeError::UncorrectableError { block: b });
            }
        }
        data_out.extend_from_slice(&block[..data_len(b)]);
    }

    Ok((data_out, corrected))
}

/// Decoded segment stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Segments {
    pub payload: Vec<u8>,
    pub eci: Option<u32>,
}

/// Parse mode segments until the terminator or the end of data
pub(crate) fn decode_segments(data: &[u8], version: Version) -> Result<Segments, DecodeError> {
    const TRUNCATED: DecodeError = DecodeError::InvalidData("truncated segment");

    let mut reader = BitReader::new(data);
    let mut segments = Segments::default();
    let mut gs1 = false;

    while reader.remaining() >= 4 {
        let bits = reader.read(4).ok_or(TRUNCATED)?;
        let mode = Mode::from_bits(bits).ok_or(DecodeError::InvalidData("unknown mode indicator"))?;
        let count = match mode.char_count_bits(version) {
            0 => 0,
            width => reader.read(width).ok_or(TRUNCATED)? as usize,
        };

        match mode {
            Mode::Terminator => break,
            Mode::Numeric => {
                NumericDecoder::decode(&mut reader, count, &mut segments.payload).ok_or(TRUNCATED)?
            }
            Mode::Alphanumeric => {
                let mut text = Vec::new();
                AlphanumericDecoder::decode(&mut reader, count, &mut text).ok_or(TRUNCATED)?;
                if gs1 {
                    text = expand_gs1_percent(&text);
                }
                segments.payload.extend(text);
            }
            Mode::Byte => {
                ByteDecoder::decode(&mut reader, count, &mut segments.payload).ok_or(TRUNCATED)?
            }
            Mode::Kanji => {
                KanjiDecoder::decode(&mut reader, count, &mut segments.payload).ok_or(TRUNCATED)?
            }
            Mode::Eci => {
                let designator = read_eci(&mut reader)?;
                log::trace!("ECI designator {designator}");
                segments.eci = Some(designator);
            }
            Mode::StructuredAppend => {
                // sequence (4), total (4), parity (8)
                reader.read(16).ok_or(TRUNCATED)?;
            }
            Mode::Fnc1First => gs1 = true,
            Mode::Fnc1Second => {
                reader.read(8).ok_or(TRUNCATED)?;
                gs1 = true;
            }
        }
    }

    Ok(segments)
}

fn read_eci(reader: &mut BitReader<'_>) -> Result<u32, DecodeError> {
    const TRUNCATED: DecodeError = DecodeError::InvalidData("truncated ECI designator");
    let first = reader.read(8).ok_or(TRUNCATED)?;
    if first & 0x80 == 0 {
        Ok(first)
    } else if first & 0xC0 == 0x80 {
        Ok(((first & 0x3F) << 8) | reader.read(8).ok_or(TRUNCATED)?)
    } else if first & 0xE0 == 0xC0 {
        Ok(((first & 0x1F) << 16) | reader.read(16).ok_or(TRUNCATED)?)
    } else {
        Err(DecodeError::InvalidData("bad ECI designator"))
    }
}

/// In GS1 mode `%` stands for FNC1 (GS) and `%%` for a literal percent sign
fn expand_gs1_percent(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        if text[i] == b'%' {
            if text.get(i + 1) == Some(&b'%') {
                out.push(b'%');
                i += 2;
                continue;
            }
            out.push(GROUP_SEPARATOR);
        } else {
            out.push(text[i]);
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::reed_solomon::ReedSolomonEncoder;
    use crate::decoder::tables::ec_block_info;
    use crate::models::ECLevel;

    /// Pack (value, width) fields MSB-first, padded with zero bits
    fn pack(fields: &[(u32, usize)]) -> Vec<u8> {
        let mut bits = Vec::new();
        for &(value, width) in fields {
            for i in (0..width).rev() {
                bits.push((value >> i) & 1 == 1);
            }
        }
        bits.chunks(8)
            .map(|c| c.iter().enumerate().fold(0u8, |acc, (i, &b)| acc | (b as u8) << (7 - i)))
            .collect()
    }

    fn v1() -> Version {
        Version::new(1).unwrap()
    }

    #[test]
    fn test_byte_segment() {
        let data = pack(&[(0b0100, 4), (2, 8), (b'h' as u32, 8), (b'i' as u32, 8), (0, 4)]);
        let segments = decode_segments(&data, v1()).unwrap();
        assert_eq!(segments.payload, b"hi");
        assert_eq!(segments.eci, None);
    }

    #[test]
    fn test_mixed_segments_with_eci() {
        let data = pack(&[
            (0b0111, 4),
            (26, 8), // ECI 26 = UTF-8
            (0b0001, 4),
            (3, 10),
            (123, 10),
            (0b0010, 4),
            (2, 9),
            (10 * 45 + 11, 11), // "AB"
            (0, 4),
        ]);
        let segments = decode_segments(&data, v1()).unwrap();
        assert_eq!(segments.payload, b"123AB");
        assert_eq!(segments.eci, Some(26));
    }

    #[test]
    fn test_gs1_alphanumeric_percent() {
        // FNC1 first, then "A%B" where % maps to GS
        let data = pack(&[
            (0b0101, 4),
            (0b0010, 4),
            (3, 9),
            (10 * 45 + 38, 11),
            (11, 6),
            (0, 4),
        ]);
        let segments = decode_segments(&data, v1()).unwrap();
        assert_eq!(segments.payload, vec![b'A', GROUP_SEPARATOR, b'B']);
    }

    #[test]
    fn test_structured_append_is_skipped() {
        let data = pack(&[
            (0b0011, 4),
            (0x12, 8),
            (0x34, 8),
            (0b0100, 4),
            (1, 8),
            (b'x' as u32, 8),
        ]);
        assert_eq!(decode_segments(&data, v1()).unwrap().payload, b"x");
    }

    #[test]
    fn test_unknown_mode_and_truncation() {
        let data = pack(&[(0b0110, 4), (0, 4)]);
        assert_eq!(
            decode_segments(&data, v1()),
            Err(DecodeError::InvalidData("unknown mode indicator"))
        );

        // Byte segment claiming 5 bytes with only 1 present
        let data = pack(&[(0b0100, 4), (5, 8), (b'a' as u32, 8)]);
        assert_eq!(
            decode_segments(&data, v1()),
            Err(DecodeError::InvalidData("truncated segment"))
        );
    }

    #[test]
    fn test_deinterleave_mixed_block_lengths() {
        // 5-Q: two blocks of 15 data codewords, then two of 16; 18 EC codewords each
        let version = Version::new(5).unwrap();
        let info = ec_block_info(version, ECLevel::Q);
        let data: Vec<u8> = (0..info.data_codewords() as u8).collect();
        let encoder = ReedSolomonEncoder::new(info.ecc_per_block);

        let mut blocks = Vec::new();
        let mut offset = 0;
        for b in 0..info.num_blocks {
            let len = if b < 2 { 15 } else { 16 };
            let block = data[offset..offset + len].to_vec();
            offset += len;
            let ecc = encoder.ecc(&block);
            blocks.push((block, ecc));
        }
        let mut stream = Vec::new();
        for i in 0..16 {
            for (block, _) in &blocks {
                if let Some(&c) = block.get(i) {
                    stream.push(c);
                }
            }
        }
        for i in 0..info.ecc_per_block {
            for (_, ecc) in &blocks {
                stream.push(ecc[i]);
            }
        }
        stream[3] ^= 0xFF;
        stream[100] ^= 0x01;

        let (decoded, corrected) = deinterleave_and_correct(&stream, &info).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(corrected, 2);
    }

    #[test]
    fn test_deinterleave_reports_failing_block() {
        let info = ec_block_info(v1(), ECLevel::L);
        let mut stream = vec![0u8; 26];
        for byte in stream.iter_mut().take(4) {
            *byte = 0x55;
        }
        assert_eq!(
            deinterleave_and_correct(&stream, &info),
            Err(DecodeError::UncorrectableError { block: 0 })
        );
    }
}
