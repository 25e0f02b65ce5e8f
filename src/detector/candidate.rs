use crate::models::{LinearFormat, Point, SymbolKind};
use crate::utils::geometry::{is_convex_quad, polygon_area};

/// Smallest quad area (in pixels) a matrix candidate may cover
pub const MIN_MATRIX_AREA: f32 = 21.0 * 21.0;

/// Largest side-length ratio of a matrix candidate's quad
pub const MAX_ASPECT_RATIO: f32 = 3.0;

/// Geometry of a located symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateShape {
    /// Symbol boundary, clockwise from top-left, plus its module dimension
    Matrix {
        /// Outer corners: top-left, top-right, bottom-right, bottom-left
        corners: [Point; 4],
        /// Modules per side (`17 + 4 * version`)
        dimension: usize,
    },
    /// Guard-to-guard segment oriented in reading direction
    Linear {
        /// Outer edge of the start guard
        start: Point,
        /// Outer edge of the end guard
        end: Point,
        /// Extent perpendicular to the scan direction over which hits agreed
        thickness: f32,
        /// Symbology indicated by the guards
        format: LinearFormat,
    },
}

/// A located but not yet decoded symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderCandidate {
    /// Coarse symbol class
    pub kind: SymbolKind,
    /// Where the symbol lies in the image
    pub shape: CandidateShape,
    /// Estimated module width in pixels
    pub module_size: f32,
    /// Detection confidence in [0, 1]
    pub confidence: f32,
}

impl FinderCandidate {
    /// Quad enclosing the candidate, clockwise from its top-left
    pub fn bounding_polygon(&self) -> [Point; 4] {
        match self.shape {
            CandidateShape::Matrix { corners, .. } => corners,
            CandidateShape::Linear {
                start,
                end,
                thickness,
                ..
            } => {
                let length = start.distance(&end).max(f32::EPSILON);
                // Unit normal pointing to the reader's left-hand side, i.e. "up"
                let nx = (end.y - start.y) / length * thickness / 2.0;
                let ny = -(end.x - start.x) / length * thickness / 2.0;
                [
                    start.translate(nx, ny),
                    end.translate(nx, ny),
                    end.translate(-nx, -ny),
                    start.translate(-nx, -ny),
                ]
            }
        }
    }

    /// Sanity checks on area, convexity and aspect ratio
    pub fn is_plausible(&self) -> bool {
        if !(0.0..=1.0).contains(&self.confidence) || self.module_size <= 0.0 {
            return false;
        }
        match self.shape {
            CandidateShape::Matrix { corners, dimension } => {
                if !(21..=177).contains(&dimension) || !is_convex_quad(&corners) {
                    return false;
                }
                let min_area = MIN_MATRIX_AREA.min(
                    (dimension as f32 * self.module_size).powi(2) / 4.0,
                );
                if polygon_area(&corners) < min_area {
                    return false;
                }
                let sides: Vec<f32> = (0..4)
                    .map(|i| corners[i].distance(&corners[(i + 1) % 4]))
                    .collect();
                let longest = sides.iter().copied().fold(0.0f32, f32::max);
                let shortest = sides.iter().copied().fold(f32::INFINITY, f32::min);
                shortest > 0.0 && longest / shortest <= MAX_ASPECT_RATIO
            }
            CandidateShape::Linear { start, end, .. } => start.distance(&end) > self.module_size,
        }
    }
}
