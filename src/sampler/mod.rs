//! Perspective sampling of located candidates
//!
//! Matrix candidates become a [`SymbolGrid`] (modules plus format/version
//! bits), linear candidates a [`Scanline`] of normalised run widths.

/// Module grid sampling for matrix symbols
pub mod grid;
/// Run-width sampling for linear symbols
pub mod scanline;

pub use grid::SymbolGrid;
pub use scanline::Scanline;

use crate::config::ScanOptions;
use crate::detector::candidate::{CandidateShape, FinderCandidate};
use crate::decoder::version::VersionInfo;
use crate::error::DecodeError;
use crate::models::{BitMatrix, LinearFormat, Point};

/// Rectified symbol ready for decoding
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    /// Sampled matrix code
    Matrix(SymbolGrid),
    /// Sampled linear code
    Linear(Scanline),
}

/// Sample `candidate` from the binarized image
pub fn rectify(
    binary: &BitMatrix,
    candidate: &FinderCandidate,
    options: &ScanOptions,
) -> Result<Sample, DecodeError> {
    match candidate.shape {
        CandidateShape::Matrix { corners, dimension } => {
            rectify_matrix(binary, &corners, dimension, options).map(Sample::Matrix)
        }
        CandidateShape::Linear { start, end, format, .. } => Ok(Sample::Linear(rectify_linear(
            binary,
            candidate,
            start,
            end,
            format,
        ))),
    }
}

fn rectify_matrix(
    binary: &BitMatrix,
    corners: &[Point; 4],
    dimension: usize,
    options: &ScanOptions,
) -> Result<SymbolGrid, DecodeError> {
    let mut trials = vec![dimension];
    trials.extend(
        [dimension.wrapping_sub(4), dimension + 4]
            .into_iter()
            .filter(|d| (21..=177).contains(d)),
    );

    let mut last_error = DecodeError::FormatCorrupt("format information");
    for trial in trials {
        let Some(quad) = grid::retarget(corners, dimension, trial) else {
            continue;
        };
        let Some(transform) = grid::module_to_image(&quad, trial) else {
            continue;
        };
        let mut modules = grid::sample_modules(binary, &transform, trial, options.majority_vote);
        let mut quad = quad;

        if trial >= 45 {
            // Resample at the dimension the version bits declare
            if let Some(version) = VersionInfo::read(&modules)
                && version.size() != trial
            {
                log::trace!("resampling {trial} -> {} from version bits", version.size());
                if let Some(exact) = grid::retarget(&quad, trial, version.size())
                    && let Some(t) = grid::module_to_image(&exact, version.size())
                {
                    modules = grid::sample_modules(binary, &t, version.size(), options.majority_vote);
                    quad = exact;
                }
            }
        }

        match SymbolGrid::from_modules(modules) {
            Ok(grid) => return Ok(grid.with_polygon(quad)),
            Err(e) => {
                log::trace!("dimension {trial}: {e}");
                last_error = e;
            }
        }
    }
    Err(last_error)
}

fn rectify_linear(
    binary: &BitMatrix,
    candidate: &FinderCandidate,
    start: Point,
    end: Point,
    format: LinearFormat,
) -> Scanline {
    let runs = scanline::walk(binary, start, end, candidate.module_size);
    Scanline {
        runs: scanline::normalise(&runs, format, candidate.module_size),
        format,
        polygon: candidate.bounding_polygon(),
        confidence: candidate.confidence,
    }
}
