//! Symbol decoding modules
//!
//! This module contains all the logic for decoding symbols after sampling:
//! - Error correction (Reed-Solomon, BCH)
//! - Format and version information extraction
//! - Data mode decoding (numeric, alphanumeric, byte, kanji)
//! - Bitstream extraction and unmasking
//! - Linear symbologies (EAN-13 / UPC-A, Code 128)

/// BCH error correction for format and version info
pub mod bch;
/// Bitstream extraction from QR matrix
pub mod bitstream;
/// Format information extraction (mask pattern, EC level)
pub mod format;
/// Function module mask builder (finder/timing/format/alignment/version)
pub mod function_mask;
/// Linear symbology decoders
pub mod linear;
/// Data mode decoders (numeric, alphanumeric, byte, kanji)
pub mod modes;
/// Main QR decoder that orchestrates the decoding pipeline
pub mod qr_decoder;
/// Reed-Solomon error correction
pub mod reed_solomon;
/// QR specification tables (ECC codewords/blocks)
pub mod tables;
/// QR code unmasking (removes mask patterns)
pub mod unmask;
/// Version information extraction (versions 7-40)
pub mod version;

use crate::error::DecodeError;
use crate::models::DecodedSymbol;
use crate::sampler::Sample;

/// Decode a rectified sample with the decoder for its symbology
pub fn decode_sample(sample: &Sample) -> Result<DecodedSymbol, DecodeError> {
    match sample {
        Sample::Matrix(grid) => qr_decoder::QrDecoder::decode(grid),
        Sample::Linear(line) => linear::decode_scanline(line),
    }
}
