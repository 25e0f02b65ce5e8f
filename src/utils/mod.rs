//! Utility functions for image processing
//!
//! - Binarization (block-adaptive Otsu thresholds)
//! - Geometry (perspective transforms, polygon overlap)
//! - Run lengths and pattern matching over binary lines

/// Block-adaptive thresholding
pub mod binarization;
/// Perspective transforms and polygon helpers
pub mod geometry;
/// Run-length extraction and pattern variance
pub mod runs;
