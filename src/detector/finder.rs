/// Finder pattern detection using 1:1:3:1:1 ratio scanning with cross-checks
use crate::models::{BitMatrix, Point};

/// Confirmed finder centres need at least this many row hits
pub const MIN_HITS: usize = 2;

/// A confirmed finder pattern centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderPattern {
    /// Centre of the 3x3 core in pixels
    pub center: Point,
    /// Estimated module width in pixels
    pub module_size: f32,
    /// Number of scan rows that confirmed this centre
    pub hits: usize,
}

impl FinderPattern {
    /// Pattern confirmed by a single row
    pub fn new(x: f32, y: f32, module_size: f32) -> Self {
        Self {
            center: Point::new(x, y),
            module_size,
            hits: 1,
        }
    }

    /// Same centre and module size within tolerance
    fn about_equals(&self, module_size: f32, center: &Point) -> bool {
        let close = (center.x - self.center.x).abs() <= module_size
            && (center.y - self.center.y).abs() <= module_size;
        let size_diff = (module_size - self.module_size).abs();
        close && (size_diff <= 1.0 || size_diff <= self.module_size)
    }

    /// Hit-weighted average with another observation
    fn combine(&self, other: &FinderPattern) -> Self {
        let total = (self.hits + other.hits) as f32;
        let w = self.hits as f32;
        let v = other.hits as f32;
        Self {
            center: Point::new(
                (self.center.x * w + other.center.x * v) / total,
                (self.center.y * w + other.center.y * v) / total,
            ),
            module_size: (self.module_size * w + other.module_size * v) / total,
            hits: self.hits + other.hits,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Row scanner for finder patterns
pub struct FinderDetector;

impl FinderDetector {
    /// All finder centres confirmed by at least [`MIN_HITS`] rows, most-hit first
    pub fn detect(matrix: &BitMatrix) -> Vec<FinderPattern> {
        let width = matrix.width();
        let height = matrix.height();
        let mut centres: Vec<FinderPattern> = Vec::new();

        for y in 0..height {
            // Early termination: skip rows with no edges
            if !Self::has_significant_edges(matrix, y, width) {
                continue;
            }
            for hit in Self::scan_row(matrix, y, width) {
                Self::merge_candidate(&mut centres, hit);
            }
        }

        centres.retain(|c| c.hits >= MIN_HITS);
        centres.sort_by(|a, b| b.hits.cmp(&a.hits));
        log::trace!("finder: {} confirmed centres", centres.len());
        centres
    }

    /// Check if row has enough edge transitions to potentially contain patterns
    fn has_significant_edges(matrix: &BitMatrix, y: usize, width: usize) -> bool {
        let mut transitions = 0;
        let mut prev_color = matrix.get(0, y);
        for x in 1..width {
            let color = matrix.get(x, y);
            if color != prev_color {
                transitions += 1;
                prev_color = color;
                if transitions >= 4 {
                    return true;
                }
            }
        }
        false
    }

    /// Cross-checked pattern hits along row `y`
    fn scan_row(matrix: &BitMatrix, y: usize, width: usize) -> Vec<FinderPattern> {
        let mut candidates = Vec::new();
        let mut run_lengths: Vec<usize> = Vec::new();
        let mut run_colors: Vec<bool> = Vec::new();
        let mut run_start = 0usize;
        let mut current_color = matrix.get(0, y);

        // x == width closes the final run
        for x in 1..=width {
            let color = if x < width { matrix.get(x, y) } else { !current_color };
            if color == current_color {
                continue;
            }
            run_lengths.push(x - run_start);
            run_colors.push(current_color);
            run_start = x;
            current_color = color;

            let n = run_colors.len();
            if n < 5 {
                continue;
            }
            let colors = &run_colors[n - 5..];
            let lengths = &run_lengths[n - 5..];
            // Pattern should be: black-white-black-white-black
            if !(colors[0] && !colors[1] && colors[2] && !colors[3] && colors[4]) {
                continue;
            }
            if !Self::check_ratios(lengths) {
                continue;
            }
            let center_x = x as f32 - lengths[4] as f32 - lengths[3] as f32 - lengths[2] as f32 / 2.0;
            let total: usize = lengths.iter().sum();
            if let Some(pattern) = Self::confirm(matrix, center_x, y, lengths[2], total) {
                candidates.push(pattern);
            }
        }

        candidates
    }

    /// Run lengths within half a module of 1:1:3:1:1
    fn check_ratios(lengths: &[usize]) -> bool {
        if lengths.len() != 5 {
            return false;
        }
        let total: usize = lengths.iter().sum();
        if total < 7 {
            return false;
        }
        let unit = total as f32 / 7.0;
        let tol = unit / 2.0;
        let expected = [1.0, 1.0, 3.0, 1.0, 1.0];
        lengths
            .iter()
            .zip(expected)
            .all(|(&len, e)| (len as f32 - e * unit).abs() < e * tol)
    }

    /// Vertical cross-check through the row hit, then a horizontal re-check at the refined row
    fn confirm(
        matrix: &BitMatrix,
        center_x: f32,
        y: usize,
        center_run: usize,
        row_total: usize,
    ) -> Option<FinderPattern> {
        let cx = center_x as usize;
        let (center_y, vertical_total) =
            Self::cross_check(matrix, cx, y, Axis::Vertical, center_run, row_total)?;
        let (refined_x, horizontal_total) = Self::cross_check(
            matrix,
            cx,
            center_y as usize,
            Axis::Horizontal,
            center_run,
            row_total,
        )?;
        let module_size = (vertical_total + horizontal_total) as f32 / 14.0;
        Some(FinderPattern::new(refined_x, center_y, module_size))
    }

    /// Count the five runs through `(x, y)` along `axis`
    ///
    /// Returns the refined centre coordinate along the axis and the pattern's
    /// total length, or `None` when the runs do not form a finder pattern of
    /// roughly `expected_total` pixels.
    fn cross_check(
        matrix: &BitMatrix,
        x: usize,
        y: usize,
        axis: Axis,
        max_count: usize,
        expected_total: usize,
    ) -> Option<(f32, usize)> {
        let (origin, limit) = match axis {
            Axis::Horizontal => (x, matrix.width()),
            Axis::Vertical => (y, matrix.height()),
        };
        let black = |i: usize| match axis {
            Axis::Horizontal => matrix.get(i, y),
            Axis::Vertical => matrix.get(x, i),
        };
        if origin >= limit || !black(origin) {
            return None;
        }

        let mut counts = [0usize; 5];

        // Towards 0: centre, inner white, outer black
        let mut i = origin as isize;
        while i >= 0 && black(i as usize) {
            counts[2] += 1;
            i -= 1;
        }
        if i < 0 {
            return None;
        }
        while i >= 0 && !black(i as usize) && counts[1] <= max_count {
            counts[1] += 1;
            i -= 1;
        }
        if i < 0 || counts[1] > max_count {
            return None;
        }
        while i >= 0 && black(i as usize) && counts[0] <= max_count {
            counts[0] += 1;
            i -= 1;
        }
        if counts[0] > max_count {
            return None;
        }

        // Away from 0
        let mut j = origin + 1;
        while j < limit && black(j) {
            counts[2] += 1;
            j += 1;
        }
        if j == limit {
            return None;
        }
        while j < limit && !black(j) && counts[3] <= max_count {
            counts[3] += 1;
            j += 1;
        }
        if j == limit || counts[3] > max_count {
            return None;
        }
        while j < limit && black(j) && counts[4] <= max_count {
            counts[4] += 1;
            j += 1;
        }
        if counts[4] > max_count {
            return None;
        }

        let total: usize = counts.iter().sum();
        // Reject when the perpendicular extent differs wildly from the row's
        if 5 * total.abs_diff(expected_total) >= 2 * expected_total {
            return None;
        }
        if !Self::check_ratios(&counts) {
            return None;
        }
        let center = (j - counts[4] - counts[3]) as f32 - counts[2] as f32 / 2.0;
        Some((center, total))
    }

    /// Fold `hit` into an existing centre or start a new one
    fn merge_candidate(centres: &mut Vec<FinderPattern>, hit: FinderPattern) {
        match centres
            .iter_mut()
            .find(|c| c.about_equals(hit.module_size, &hit.center))
        {
            Some(existing) => *existing = existing.combine(&hit),
            None => centres.push(hit),
        }
    }
}

/// Module size measured along the line from `pattern` towards `target`
///
/// Walks the core, inner ring and outer ring of the pattern in both
/// directions along that line, so the estimate follows the symbol's own axes
/// rather than the image's. `None` when either walk leaves the pattern
/// without crossing all three.
pub fn module_size_towards(matrix: &BitMatrix, pattern: &FinderPattern, target: Point) -> Option<f32> {
    let (dx, dy) = (target.x - pattern.center.x, target.y - pattern.center.y);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 || pattern.module_size <= 0.0 {
        return None;
    }
    let (ux, uy) = (dx / len, dy / len);
    // Axis-measured size overestimates by at most sqrt(2)
    let limit = 6.0 * pattern.module_size;
    let forward = edge_distance(matrix, pattern.center, ux, uy, limit)?;
    let backward = edge_distance(matrix, pattern.center, -ux, -uy, limit)?;
    Some((forward + backward) / 7.0)
}

/// Distance from `from` to the outer edge of the finder along unit vector `(ux, uy)`
fn edge_distance(matrix: &BitMatrix, from: Point, ux: f32, uy: f32, limit: f32) -> Option<f32> {
    // One pixel per step along the dominant axis
    let step = 1.0 / ux.abs().max(uy.abs());
    let (width, height) = (matrix.width() as f32, matrix.height() as f32);
    // 0: core, 1: inner white ring, 2: outer black ring
    let mut state = 0u8;
    let mut t = 0.0f32;
    while t <= limit {
        t += step;
        let x = from.x + ux * t;
        let y = from.y + uy * t;
        if x < 0.0 || y < 0.0 || x >= width || y >= height {
            return (state == 2).then_some(t - step / 2.0);
        }
        if matrix.get(x as usize, y as usize) != (state != 1) {
            state += 1;
            if state == 3 {
                return Some(t - step / 2.0);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Finder pattern of `unit` px modules rotated by `degrees` about (30, 30)
    fn rotated_finder(unit: f32, degrees: f32) -> (BitMatrix, Point) {
        let centre = Point::new(30.0, 30.0);
        let (sin, cos) = degrees.to_radians().sin_cos();
        let matrix = BitMatrix::from_fn(60, 60, |x, y| {
            let dx = x as f32 + 0.5 - centre.x;
            let dy = y as f32 + 0.5 - centre.y;
            let u = (cos * dx + sin * dy) / unit;
            let v = (-sin * dx + cos * dy) / unit;
            let ring = u.abs().max(v.abs());
            ring < 1.5 || (2.5..3.5).contains(&ring)
        });
        (matrix, centre)
    }

    /// 7x7 finder pattern with its top-left module at (ox, oy)
    fn draw_finder(matrix: &mut BitMatrix, ox: usize, oy: usize, unit: usize) {
        for my in 0..7 {
            for mx in 0..7 {
                let ring = (mx as i32 - 3).abs().max((my as i32 - 3).abs());
                if ring != 2 {
                    for py in 0..unit {
                        for px in 0..unit {
                            matrix.set(ox + mx * unit + px, oy + my * unit + py, true);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_finder() {
        let unit = 3;
        let mut matrix = BitMatrix::new(40, 40);
        draw_finder(&mut matrix, 5, 8, unit);

        let patterns = FinderDetector::detect(&matrix);
        assert_eq!(patterns.len(), 1, "{patterns:?}");
        let p = patterns[0];
        let expected = 5.0 + 3.5 * unit as f32;
        assert!((p.center.x - expected).abs() < 1.0);
        assert!((p.center.y - (8.0 + 3.5 * unit as f32)).abs() < 1.0);
        assert!((p.module_size - unit as f32).abs() < 0.5);
        assert!(p.hits >= MIN_HITS);
    }

    #[test]
    fn test_single_row_is_not_a_finder() {
        // Black(3) - White(3) - Black(9) - White(3) - Black(3) on one row only
        let mut matrix = BitMatrix::new(25, 10);
        for x in [2, 3, 4, 8, 9, 10, 11, 12, 13, 14, 15, 16, 20, 21, 22] {
            matrix.set(x, 5, true);
        }
        assert!(FinderDetector::detect(&matrix).is_empty());
    }

    #[test]
    fn test_check_ratios() {
        assert!(FinderDetector::check_ratios(&[3, 3, 9, 3, 3]));
        assert!(FinderDetector::check_ratios(&[4, 3, 8, 3, 3]));
        assert!(!FinderDetector::check_ratios(&[3, 3, 3, 3, 3]));
        assert!(!FinderDetector::check_ratios(&[1, 3, 9, 3, 3]));
        assert!(!FinderDetector::check_ratios(&[1, 1, 3, 1]));
    }

    #[test]
    fn test_module_size_along_symbol_axis() {
        let unit = 4.0;
        for degrees in [0.0f32, 30.0, 45.0] {
            let (matrix, centre) = rotated_finder(unit, degrees);
            // Axis runs through a rotated pattern are up to sqrt(2) too long
            let pattern = FinderPattern::new(centre.x, centre.y, unit * 1.4);
            let (sin, cos) = degrees.to_radians().sin_cos();
            let along = Point::new(centre.x + 50.0 * cos, centre.y + 50.0 * sin);
            let across = Point::new(centre.x - 50.0 * sin, centre.y + 50.0 * cos);
            for target in [along, across] {
                let size = module_size_towards(&matrix, &pattern, target).unwrap();
                assert!((size - unit).abs() < 0.5, "{degrees} degrees: {size}");
            }
        }
    }

    #[test]
    fn test_module_size_needs_full_pattern() {
        let matrix = BitMatrix::new(40, 40);
        let pattern = FinderPattern::new(20.0, 20.0, 3.0);
        assert_eq!(module_size_towards(&matrix, &pattern, Point::new(35.0, 20.0)), None);
        assert_eq!(module_size_towards(&matrix, &pattern, pattern.center), None);
    }

    #[test]
    fn test_three_finders() {
        let mut matrix = BitMatrix::new(120, 120);
        draw_finder(&mut matrix, 10, 10, 4);
        draw_finder(&mut matrix, 80, 10, 4);
        draw_finder(&mut matrix, 10, 80, 4);
        assert_eq!(FinderDetector::detect(&matrix).len(), 3);
    }
}
