//! Run-length encoding of binary lines and width-pattern matching.

use crate::models::BitMatrix;

/// A maximal stretch of same-coloured pixels along a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    /// Index of the first pixel
    pub start: usize,
    /// Number of pixels
    pub len: usize,
    /// Colour (true = black)
    pub black: bool,
}

impl Run {
    /// One past the last pixel
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Run-length encode `line` into `out` (cleared first)
pub fn runs_of(line: &[bool], out: &mut Vec<Run>) {
    out.clear();
    let mut iter = line.iter().enumerate();
    let Some((_, &first)) = iter.next() else {
        return;
    };
    let mut current = Run {
        start: 0,
        len: 1,
        black: first,
    };
    for (i, &bit) in iter {
        if bit == current.black {
            current.len += 1;
        } else {
            out.push(current);
            current = Run {
                start: i,
                len: 1,
                black: bit,
            };
        }
    }
    out.push(current);
}

/// Runs of row `y` restricted to columns `x0..x1`
pub fn row_runs(matrix: &BitMatrix, y: usize, x0: usize, x1: usize, out: &mut Vec<Run>) {
    let line: Vec<bool> = (x0..x1).map(|x| matrix.get(x, y)).collect();
    runs_of(&line, out);
    for run in out.iter_mut() {
        run.start += x0;
    }
}

/// Runs of column `x` restricted to rows `y0..y1`
pub fn column_runs(matrix: &BitMatrix, x: usize, y0: usize, y1: usize, out: &mut Vec<Run>) {
    let line: Vec<bool> = (y0..y1).map(|y| matrix.get(x, y)).collect();
    runs_of(&line, out);
    for run in out.iter_mut() {
        run.start += y0;
    }
}

/// Average deviation of `widths` from `pattern`, scaled to the pattern's unit
///
/// Returns `f32::INFINITY` when any single element deviates by more than
/// `max_individual` units, or when the inputs cannot be compared.
pub fn pattern_variance(widths: &[f32], pattern: &[u8], max_individual: f32) -> f32 {
    if widths.len() != pattern.len() {
        return f32::INFINITY;
    }
    let total: f32 = widths.iter().sum();
    let pattern_total: u32 = pattern.iter().map(|&p| p as u32).sum();
    if total <= 0.0 || pattern_total == 0 {
        return f32::INFINITY;
    }
    let unit = total / pattern_total as f32;
    let max_individual = max_individual * unit;

    let mut variance = 0.0;
    for (&width, &expected) in widths.iter().zip(pattern) {
        let deviation = (width - expected as f32 * unit).abs();
        if deviation > max_individual {
            return f32::INFINITY;
        }
        variance += deviation;
    }
    variance / total
}

/// Index and variance of the closest pattern in `patterns`
pub fn best_pattern<const N: usize>(
    widths: &[f32],
    patterns: &[[u8; N]],
    max_individual: f32,
) -> Option<(usize, f32)> {
    patterns
        .iter()
        .enumerate()
        .map(|(i, p)| (i, pattern_variance(widths, p, max_individual)))
        .filter(|(_, v)| v.is_finite())
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_of() {
        let line = [true, true, false, true, false, false, false];
        let mut runs = Vec::new();
        runs_of(&line, &mut runs);
        assert_eq!(runs.len(), 4);
        assert_eq!(runs[0], Run { start: 0, len: 2, black: true });
        assert_eq!(runs[3], Run { start: 4, len: 3, black: false });
        assert_eq!(runs[3].end(), 7);

        runs_of(&[], &mut runs);
        assert!(runs.is_empty());
    }

    #[test]
    fn test_row_runs_offsets() {
        let matrix = BitMatrix::from_fn(10, 1, |x, _| (3..5).contains(&x));
        let mut runs = Vec::new();
        row_runs(&matrix, 0, 2, 8, &mut runs);
        assert_eq!(runs[0], Run { start: 2, len: 1, black: false });
        assert_eq!(runs[1], Run { start: 3, len: 2, black: true });
        assert_eq!(runs[2].end(), 8);
    }

    #[test]
    fn test_pattern_variance() {
        // Exact match at twice the scale
        assert_eq!(pattern_variance(&[2.0, 2.0, 6.0, 2.0, 2.0], &[1, 1, 3, 1, 1], 0.7), 0.0);
        // One element far off
        assert!(pattern_variance(&[2.0, 2.0, 2.0, 2.0, 6.0], &[1, 1, 3, 1, 1], 0.7).is_infinite());
        // Length mismatch
        assert!(pattern_variance(&[1.0], &[1, 1], 0.7).is_infinite());
    }

    #[test]
    fn test_best_pattern() {
        let patterns = [[1u8, 1, 2], [2, 1, 1]];
        let (index, variance) = best_pattern(&[4.1, 2.0, 1.9], &patterns, 0.7).unwrap();
        assert_eq!(index, 1);
        assert!(variance < 0.05);
    }
}
