use crate::models::linear::{EAN13_MODULES, EAN13_RUNS};
use crate::models::{BitMatrix, LinearFormat, Point};
use crate::utils::runs::{Run, runs_of};

/// Quiet margin walked beyond each guard, in modules
const MARGIN_MODULES: f32 = 2.0;

/// Bar/space widths along a linear symbol, in module units
///
/// The first run is a bar and runs are in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct Scanline {
    /// Alternating bar/space widths
    pub runs: Vec<f32>,
    /// Symbology indicated by the guards
    pub format: LinearFormat,
    /// Bounding polygon of the scanned area, clockwise from top-left
    pub polygon: [Point; 4],
    /// Detection confidence in [0, 1]
    pub confidence: f32,
}

impl Scanline {
    /// Widths in reverse order, as read from the other end
    pub fn reversed(&self) -> Self {
        let mut runs = self.runs.clone();
        runs.reverse();
        Self {
            runs,
            ..self.clone()
        }
    }
}

/// Walk `start -> end` one pixel at a time and return the pixel runs between the outer bars
pub(crate) fn walk(binary: &BitMatrix, start: Point, end: Point, module_size: f32) -> Vec<Run> {
    let length = start.distance(&end);
    if length <= 0.0 {
        return Vec::new();
    }
    let (ux, uy) = ((end.x - start.x) / length, (end.y - start.y) / length);
    let margin = MARGIN_MODULES * module_size;
    let from = start.translate(-ux * margin, -uy * margin);
    let steps = (length + 2.0 * margin).ceil() as usize;

    let line: Vec<bool> = (0..steps)
        .map(|t| {
            let p = from.translate(ux * (t as f32 + 0.5), uy * (t as f32 + 0.5));
            p.x >= 0.0 && p.y >= 0.0 && binary.get(p.x as usize, p.y as usize)
        })
        .collect();

    let mut runs = Vec::new();
    runs_of(&line, &mut runs);
    if runs.first().is_some_and(|r| !r.black) {
        runs.remove(0);
    }
    if runs.last().is_some_and(|r| !r.black) {
        runs.pop();
    }
    runs
}

/// Express pixel runs in modules, using the total width implied by the format
pub(crate) fn normalise(runs: &[Run], format: LinearFormat, module_size: f32) -> Vec<f32> {
    let pixels: usize = runs.iter().map(|r| r.len).sum();
    let modules = match format {
        LinearFormat::Ean13 if runs.len() == EAN13_RUNS => Some(EAN13_MODULES),
        // k six-run symbols of 11 modules plus the 7-run, 13-module stop
        LinearFormat::Code128 if runs.len() >= 13 && (runs.len() - 7) % 6 == 0 => {
            Some((runs.len() - 7) / 6 * 11 + 13)
        }
        _ => None,
    };
    let unit = match modules {
        Some(m) if pixels > 0 => pixels as f32 / m as f32,
        _ => module_size.max(f32::EPSILON),
    };
    runs.iter().map(|r| r.len as f32 / unit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_trims_quiet_zone() {
        // bars at 10..12 and 16..20 on row 3
        let binary = BitMatrix::from_fn(40, 8, |x, _| (10..12).contains(&x) || (16..20).contains(&x));
        let runs = walk(&binary, Point::new(10.0, 3.5), Point::new(20.0, 3.5), 2.0);
        let lens: Vec<usize> = runs.iter().map(|r| r.len).collect();
        assert_eq!(lens, vec![2, 4, 4]);
        assert!(runs[0].black);
    }

    #[test]
    fn test_normalise_code128_width() {
        // 13 runs = start + stop = 24 modules over 48 pixels
        let runs: Vec<Run> = (0..13)
            .map(|i| Run {
                start: i * 4,
                len: if i == 0 { 4 } else { 3 } + (i % 2),
                black: i % 2 == 0,
            })
            .collect();
        let pixels: usize = runs.iter().map(|r| r.len).sum();
        let widths = normalise(&runs, LinearFormat::Code128, 1.0);
        let total: f32 = widths.iter().sum();
        assert!((total - 24.0).abs() < 1e-4, "{pixels} px -> {total}");
    }

    #[test]
    fn test_reversed() {
        let line = Scanline {
            runs: vec![1.0, 2.0, 3.0],
            format: LinearFormat::Code128,
            polygon: [Point::default(); 4],
            confidence: 1.0,
        };
        assert_eq!(line.reversed().runs, vec![3.0, 2.0, 1.0]);
    }
}
