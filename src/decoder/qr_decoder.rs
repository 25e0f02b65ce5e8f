use crate::decoder::bitstream::BitstreamExtractor;
use crate::decoder::function_mask::FunctionMask;
use crate::decoder::tables::ec_block_info;
use crate::decoder::unmask::unmask;
/// Main QR code decoder - wires everything together
use crate::error::DecodeError;
use crate::models::{BarcodeFormat, DecodedSymbol, SymbolKind};
use crate::sampler::SymbolGrid;

/// Block de-interleaving, Reed-Solomon correction and segment parsing
pub(crate) mod payload;

/// Main QR decoder that turns a sampled grid into a payload
pub struct QrDecoder;

impl QrDecoder {
    /// Unmask, read codewords, correct and parse the segments of `grid`
    pub fn decode(grid: &SymbolGrid) -> Result<DecodedSymbol, DecodeError> {
        let version = grid.version();
        let ec_level = grid.ec_level();
        let func = FunctionMask::new(version);

        let mut modules = grid.modules().clone();
        unmask(&mut modules, grid.mask(), &func);

        let codewords = BitstreamExtractor::codewords(&modules, &func);
        let info = ec_block_info(version, ec_level);
        let (data, corrected) = payload::deinterleave_and_correct(&codewords, &info)?;
        let segments = payload::decode_segments(&data, version)?;

        log::debug!(
            "QR v{} {:?} mask {}: {} bytes, {corrected} corrected",
            version.number(),
            ec_level,
            grid.mask().bits(),
            segments.payload.len()
        );

        let capacity = info.correction_capacity().max(1) as f32;
        let confidence = grid.confidence() * (1.0 - 0.5 * corrected as f32 / capacity);
        Ok(DecodedSymbol {
            kind: if version.has_version_info() {
                SymbolKind::MatrixLarge
            } else {
                SymbolKind::MatrixSmall
            },
            format: BarcodeFormat::QrCode,
            payload: segments.payload,
            error_correction: Some(ec_level),
            corrected_bytes: corrected,
            polygon: grid.polygon(),
            confidence: confidence.clamp(0.0, 1.0),
            version: Some(version),
            eci: segments.eci,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BitMatrix, ECLevel, MaskPattern};
    use crate::tools::render::{QrRenderOptions, qr_modules};

    fn hello() -> BitMatrix {
        let options = QrRenderOptions {
            ec_level: ECLevel::L,
            mask: Some(MaskPattern::Pattern0),
            ..QrRenderOptions::default()
        };
        qr_modules(b"HELLO", &options).unwrap()
    }

    fn decode(modules: BitMatrix) -> Result<DecodedSymbol, DecodeError> {
        QrDecoder::decode(&SymbolGrid::from_modules(modules)?)
    }

    #[test]
    fn test_clean_hello() {
        let symbol = decode(hello()).unwrap();
        assert_eq!(symbol.payload, b"HELLO");
        assert_eq!(symbol.corrected_bytes, 0);
        assert_eq!(symbol.confidence, 1.0);
        assert_eq!(symbol.kind, SymbolKind::MatrixSmall);
        assert_eq!(symbol.error_correction, Some(ECLevel::L));
        assert_eq!(symbol.version.map(|v| v.number()), Some(1));
    }

    #[test]
    fn test_three_flipped_modules_in_distinct_codewords() {
        // First three upward pairs of the bottom-right column: codewords 0, 1, 2
        let mut modules = hello();
        for (x, y) in [(20, 20), (20, 16), (20, 12)] {
            modules.toggle(x, y);
        }
        let symbol = decode(modules).unwrap();
        assert_eq!(symbol.payload, b"HELLO");
        assert_eq!(symbol.corrected_bytes, 3);
        assert!(symbol.confidence < 1.0);
    }

    #[test]
    fn test_one_beyond_capacity() {
        // 1-L has 7 EC codewords: three are repairable, four are not
        let mut modules = hello();
        for (x, y) in [(20, 20), (20, 16), (20, 12), (18, 10)] {
            modules.toggle(x, y);
        }
        assert_eq!(
            decode(modules),
            Err(DecodeError::UncorrectableError { block: 0 })
        );
    }
}
