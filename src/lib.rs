//! rust_barcode - barcode decoding from grayscale buffers
//!
//! Finds and decodes QR codes (versions 1-40), EAN-13 / UPC-A and Code 128
//! symbols in an 8-bit luminance image. Every call is pure: configuration is
//! passed in as [`ScanOptions`] and nothing is cached between calls.
//!
//! ```no_run
//! use rust_barcode::{ImageBuffer, ScanOptions, decode};
//!
//! let samples = vec![255u8; 640 * 480];
//! let image = ImageBuffer::packed(&samples, 640, 480)?;
//! for symbol in decode(&image, &ScanOptions::default())? {
//!     println!("{}: {}", symbol.format, symbol.text());
//! }
//! # Ok::<(), rust_barcode::DecodeError>(())
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Duplicate merging and reading-order sort
pub mod aggregate;
/// Scan tunables
pub mod config;
/// Symbol decoding (format/version info, Reed-Solomon, segments, linear symbologies)
pub mod decoder;
/// Symbol location (finder patterns, grouping, alignment, linear guards)
pub mod detector;
/// Error types
pub mod error;
/// Core data structures (ImageBuffer, BitMatrix, DecodedSymbol, etc.)
pub mod models;
mod pipeline;
/// Rectification of located candidates into module grids and scanlines
pub mod sampler;
/// Result sinks and the append-only payload log
pub mod sink;
/// Image loading, statistics and the synthetic symbol renderer
pub mod tools;
/// Utility functions (binarization, geometry, run lengths)
pub mod utils;

pub use aggregate::aggregate;
pub use config::ScanOptions;
pub use decoder::decode_sample;
pub use detector::{CandidateShape, FinderCandidate, Locator, locate};
pub use error::{DecodeError, ErrorKind};
pub use models::{
    BarcodeFormat, BitMatrix, DecodedSymbol, ECLevel, ImageBuffer, LinearFormat, MaskPattern,
    Point, SymbolKind, Version,
};
pub use sampler::{Sample, Scanline, SymbolGrid, rectify};
pub use sink::{AppendLog, DedupPolicy, ResultSink, dispatch};
pub use utils::binarization::binarize;

use rayon::prelude::*;

/// Decode every symbol in `image`
///
/// Returns the decoded symbols in reading order; an image without symbols
/// yields an empty vector. Only unusable `options` fail the whole call;
/// candidates that cannot be decoded are logged and skipped.
pub fn decode(image: &ImageBuffer<'_>, options: &ScanOptions) -> Result<Vec<DecodedSymbol>, DecodeError> {
    options.validate()?;
    log::debug!(
        "decoding {}x{} image (stride {})",
        image.width(),
        image.height(),
        image.stride()
    );
    Ok(pipeline::scan(image, options))
}

/// Decode from a raw luminance slice with an explicit row stride
///
/// Fails with [`DecodeError::InvalidInput`] when the geometry does not match
/// the slice.
pub fn decode_raw(
    samples: &[u8],
    width: usize,
    height: usize,
    stride: usize,
    options: &ScanOptions,
) -> Result<Vec<DecodedSymbol>, DecodeError> {
    let image = ImageBuffer::new(samples, width, height, stride)?;
    decode(&image, options)
}

/// Decode independent images in parallel on the rayon pool
///
/// Results are returned in input order.
pub fn decode_batch(
    images: &[ImageBuffer<'_>],
    options: &ScanOptions,
) -> Vec<Result<Vec<DecodedSymbol>, DecodeError>> {
    images.par_iter().map(|image| decode(image, options)).collect()
}
