use crate::aggregate::aggregate;
use crate::config::ScanOptions;
use crate::decoder::decode_sample;
use crate::detector::{FinderCandidate, locate};
use crate::error::DecodeError;
use crate::models::{BitMatrix, DecodedSymbol, ImageBuffer};
use crate::sampler::rectify;
use crate::utils::binarization::binarize;

/// Binarize, locate, sample, decode and aggregate one frame
pub(crate) fn scan(image: &ImageBuffer<'_>, options: &ScanOptions) -> Vec<DecodedSymbol> {
    let binary = binarize(image, options);
    scan_binary(&binary, options)
}

/// Locate and decode every symbol in an already binarized frame
pub(crate) fn scan_binary(binary: &BitMatrix, options: &ScanOptions) -> Vec<DecodedSymbol> {
    let mut decoded = Vec::new();
    for (index, candidate) in locate(binary, options).enumerate() {
        match decode_candidate(binary, &candidate, options) {
            Ok(symbol) => {
                log::debug!(
                    "candidate {index}: {} '{}' (confidence {:.2})",
                    symbol.format,
                    symbol.text(),
                    symbol.confidence
                );
                decoded.push(symbol);
            }
            Err(e) => log::debug!("candidate {index} ({:?}) rejected: {e}", candidate.kind),
        }
    }
    let found = decoded.len();
    let results = aggregate(decoded, options.dedup_iou);
    log::debug!("{found} decoded, {} after aggregation", results.len());
    results
}

fn decode_candidate(
    binary: &BitMatrix,
    candidate: &FinderCandidate,
    options: &ScanOptions,
) -> Result<DecodedSymbol, DecodeError> {
    let sample = rectify(binary, candidate, options)?;
    decode_sample(&sample)
}
