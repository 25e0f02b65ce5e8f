//! Linear symbology decoders (EAN-13 / UPC-A, Code 128)

/// Code 128 code sets A/B/C
pub mod code128;
/// EAN-13 and its UPC-A subset
pub mod ean13;

use crate::error::{DecodeError, ErrorKind};
use crate::models::{BarcodeFormat, DecodedSymbol, LinearFormat, SymbolKind};
use crate::sampler::Scanline;

/// Decode a scanline, retrying in reverse run order when the forward read fails
pub fn decode_scanline(line: &Scanline) -> Result<DecodedSymbol, DecodeError> {
    let forward = decode_runs(line.format, &line.runs);
    let (format, payload) = match forward {
        Ok(decoded) => decoded,
        Err(forward_error) => {
            let mut reversed = line.runs.clone();
            reversed.reverse();
            decode_runs(line.format, &reversed).map_err(|reverse_error| {
                // A checksum failure means the bars were read; report it over a parse failure
                if reverse_error.kind() == ErrorKind::ChecksumMismatch {
                    reverse_error
                } else {
                    forward_error
                }
            })?
        }
    };

    Ok(DecodedSymbol {
        kind: SymbolKind::Linear,
        format,
        payload,
        error_correction: None,
        corrected_bytes: 0,
        polygon: line.polygon,
        confidence: line.confidence,
        version: None,
        eci: None,
    })
}

fn decode_runs(format: LinearFormat, runs: &[f32]) -> Result<(BarcodeFormat, Vec<u8>), DecodeError> {
    match format {
        LinearFormat::Ean13 => ean13::decode(runs),
        LinearFormat::Code128 => code128::decode(runs).map(|p| (BarcodeFormat::Code128, p)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;
    use crate::models::linear::{CODE128_PATTERNS, CODE128_START_B, CODE128_STOP};

    fn line(format: LinearFormat, runs: Vec<f32>) -> Scanline {
        Scanline {
            runs,
            format,
            polygon: [
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 5.0),
                Point::new(0.0, 5.0),
            ],
            confidence: 0.75,
        }
    }

    fn code128_runs(values: &[u8]) -> Vec<f32> {
        values
            .iter()
            .flat_map(|&v| CODE128_PATTERNS[v as usize].iter().map(|&w| w as f32))
            .chain(CODE128_STOP.iter().map(|&w| w as f32))
            .collect()
    }

    #[test]
    fn test_reversed_code128() {
        // "Hi" with check 84, read from the stop end
        let mut runs = code128_runs(&[CODE128_START_B, 40, 73, 84]);
        runs.reverse();
        let symbol = decode_scanline(&line(LinearFormat::Code128, runs)).unwrap();
        assert_eq!(symbol.payload, b"Hi");
        assert_eq!(symbol.format, BarcodeFormat::Code128);
        assert_eq!(symbol.kind, SymbolKind::Linear);
        assert_eq!(symbol.confidence, 0.75);
    }

    #[test]
    fn test_checksum_error_preferred() {
        let runs = code128_runs(&[CODE128_START_B, 40, 73, 85]);
        let err = decode_scanline(&line(LinearFormat::Code128, runs)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ChecksumMismatch);
    }
}
