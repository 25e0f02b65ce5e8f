//! Symbol detection modules
//!
//! This module contains all the logic for locating symbols in a binarized frame:
//! - Finder pattern detection (the three square markers)
//! - Grouping of finder centres into symbol triples
//! - Alignment pattern search (for larger QR codes)
//! - Start/stop guard search for linear symbols
//! - The lazy [`Locator`](locator::Locator) tying these together

/// Alignment pattern detection for QR versions 2+
pub mod alignment;
/// Located-but-undecoded symbol geometry
pub mod candidate;
/// Finder pattern detection using 1:1:3:1:1 ratio scanning
pub mod finder;
/// Finder triple selection
pub mod grouping;
/// EAN-13 and Code 128 guard search
pub mod linear;
/// Candidate iterator over a frame
pub mod locator;

pub use candidate::{CandidateShape, FinderCandidate};
pub use locator::{Locator, locate};
