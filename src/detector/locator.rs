use super::alignment::find_alignment;
use super::candidate::{CandidateShape, FinderCandidate};
use super::finder::{FinderDetector, module_size_towards};
use super::grouping::{FinderTriple, group_triples};
use super::linear::find_linear;
use crate::config::ScanOptions;
use crate::models::{BitMatrix, Point, SymbolKind};
use crate::utils::geometry::PerspectiveTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Matrix,
    Linear,
    Done,
}

/// Lazy candidate stream over one binarized frame
///
/// Matrix candidates are computed on the first pull, linear candidates once
/// those are exhausted. The stream is finite and cannot be restarted.
pub struct Locator<'a> {
    matrix: &'a BitMatrix,
    options: ScanOptions,
    stage: Stage,
    pending: std::vec::IntoIter<FinderCandidate>,
    yielded: usize,
}

/// Start locating symbols in `matrix`
pub fn locate<'a>(matrix: &'a BitMatrix, options: &ScanOptions) -> Locator<'a> {
    Locator {
        matrix,
        options: *options,
        stage: Stage::Matrix,
        pending: Vec::new().into_iter(),
        yielded: 0,
    }
}

impl Iterator for Locator<'_> {
    type Item = FinderCandidate;

    fn next(&mut self) -> Option<FinderCandidate> {
        loop {
            if self.yielded >= self.options.max_candidates {
                if self.stage != Stage::Done {
                    log::debug!("candidate cap {} reached", self.options.max_candidates);
                    self.stage = Stage::Done;
                }
                return None;
            }
            if let Some(candidate) = self.pending.next() {
                if candidate.confidence < self.options.min_confidence {
                    log::debug!(
                        "dropping {:?} candidate: confidence {:.2}",
                        candidate.kind,
                        candidate.confidence
                    );
                    continue;
                }
                if !candidate.is_plausible() {
                    log::debug!("dropping {:?} candidate: implausible geometry", candidate.kind);
                    continue;
                }
                self.yielded += 1;
                return Some(candidate);
            }

            match self.stage {
                Stage::Matrix => {
                    self.stage = Stage::Linear;
                    if self.options.matrix {
                        self.pending = matrix_candidates(self.matrix, &self.options).into_iter();
                    }
                }
                Stage::Linear => {
                    self.stage = Stage::Done;
                    if self.options.linear {
                        let found = find_linear(self.matrix);
                        log::debug!("linear: {} candidates", found.len());
                        self.pending = found.into_iter();
                    }
                }
                Stage::Done => return None,
            }
        }
    }
}

fn matrix_candidates(matrix: &BitMatrix, options: &ScanOptions) -> Vec<FinderCandidate> {
    let patterns = FinderDetector::detect(matrix);
    let triples = group_triples(&patterns, options.max_finder_centers, |pattern, target| {
        module_size_towards(matrix, pattern, target)
    });
    log::debug!(
        "matrix: {} finder centres, {} triples",
        patterns.len(),
        triples.len()
    );
    triples
        .iter()
        .filter_map(|t| triple_candidate(matrix, t))
        .collect()
}

/// Outer corners of the symbol described by `triple`
fn triple_candidate(matrix: &BitMatrix, triple: &FinderTriple) -> Option<FinderCandidate> {
    let dim = triple.dimension;
    let d = dim as f32;
    let tl = triple.top_left.center;
    let tr = triple.top_right.center;
    let bl = triple.bottom_left.center;

    // Parallelogram estimate of the bottom-right finder-equivalent centre
    let mut bottom_right = (Point::new(d - 3.5, d - 3.5), tr.translate(bl.x - tl.x, bl.y - tl.y));

    if dim > 21 {
        // Bottom-right alignment centre sits 3 modules inside that corner
        let k = (d - 10.0) / (d - 7.0);
        let estimate = tl.translate((tr.x - tl.x + bl.x - tl.x) * k, (tr.y - tl.y + bl.y - tl.y) * k);
        match find_alignment(matrix, estimate, triple.module_size) {
            Some(found) => bottom_right = (Point::new(d - 6.5, d - 6.5), found),
            None => log::trace!("no alignment pattern near ({:.1}, {:.1})", estimate.x, estimate.y),
        }
    }

    let modules = [
        Point::new(3.5, 3.5),
        Point::new(d - 3.5, 3.5),
        bottom_right.0,
        Point::new(3.5, d - 3.5),
    ];
    let image = [tl, tr, bottom_right.1, bl];
    let transform = PerspectiveTransform::from_points(&modules, &image)?;
    let corners = [
        Point::new(0.0, 0.0),
        Point::new(d, 0.0),
        Point::new(d, d),
        Point::new(0.0, d),
    ]
    .map(|p| transform.transform(&p));

    Some(FinderCandidate {
        kind: if dim >= 45 {
            SymbolKind::MatrixLarge
        } else {
            SymbolKind::MatrixSmall
        },
        shape: CandidateShape::Matrix {
            corners,
            dimension: dim,
        },
        module_size: triple.module_size,
        confidence: triple.confidence(),
    })
}
