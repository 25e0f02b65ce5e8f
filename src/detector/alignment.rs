/// Alignment pattern detection
/// Alignment patterns appear in QR codes version 2 and above: a single dark
/// module inside a light ring inside a dark ring, 5x5 modules in all.
use crate::models::{BitMatrix, Point};
use crate::utils::runs::{Run, column_runs, row_runs};

/// Search radius around the estimate, in modules
pub const SEARCH_RADIUS_MODULES: f32 = 4.0;

/// Closest alignment centre to `estimate` within the search radius
pub fn find_alignment(matrix: &BitMatrix, estimate: Point, module_size: f32) -> Option<Point> {
    if module_size <= 0.0 {
        return None;
    }
    let radius = SEARCH_RADIUS_MODULES * module_size;
    let x0 = (estimate.x - radius).max(0.0) as usize;
    let x1 = ((estimate.x + radius).ceil() as usize).min(matrix.width());
    let y0 = (estimate.y - radius).max(0.0) as usize;
    let y1 = ((estimate.y + radius).ceil() as usize).min(matrix.height());
    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    let mut runs = Vec::new();
    let mut best: Option<(f32, Point)> = None;
    for y in y0..y1 {
        row_runs(matrix, y, x0, x1, &mut runs);
        for window in runs.windows(5) {
            let Some(cx) = centre_of(window, module_size) else {
                continue;
            };
            let Some(cy) = cross_check_vertical(matrix, cx as usize, y, module_size) else {
                continue;
            };
            let found = Point::new(cx, cy);
            let distance = found.distance(&estimate);
            if distance <= radius && best.is_none_or(|(d, _)| distance < d) {
                best = Some((distance, found));
            }
        }
    }
    best.map(|(_, p)| p)
}

/// Centre of a B W B W B window whose middle three runs are about one module each
fn centre_of(window: &[Run], module_size: f32) -> Option<f32> {
    let tolerance = (module_size * 0.5).max(1.0);
    let colours_ok = window[0].black
        && !window[1].black
        && window[2].black
        && !window[3].black
        && window[4].black;
    let sizes_ok = window[1..4]
        .iter()
        .all(|r| (r.len as f32 - module_size).abs() <= tolerance);
    (colours_ok && sizes_ok).then(|| window[2].start as f32 + window[2].len as f32 / 2.0)
}

fn cross_check_vertical(matrix: &BitMatrix, x: usize, y: usize, module_size: f32) -> Option<f32> {
    let span = (3.0 * module_size).ceil() as usize + 1;
    let y0 = y.saturating_sub(span);
    let y1 = (y + span + 1).min(matrix.height());
    let mut runs = Vec::new();
    column_runs(matrix, x, y0, y1, &mut runs);
    let i = runs.iter().position(|r| r.start <= y && y < r.end())?;
    if i < 2 || i + 2 >= runs.len() {
        return None;
    }
    centre_of(&runs[i - 2..=i + 2], module_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Data-like noise with an alignment pattern centred on module (mx, my)
    fn grid_with_alignment(mx: usize, my: usize, unit: usize) -> BitMatrix {
        BitMatrix::from_fn(30 * unit, 30 * unit, |x, y| {
            let (gx, gy) = (x / unit, y / unit);
            let ring = (gx as i32 - mx as i32).abs().max((gy as i32 - my as i32).abs());
            match ring {
                0 | 2 => true,
                1 => false,
                _ => (gx * 7 + gy * 3) % 5 == 0,
            }
        })
    }

    #[test]
    fn test_finds_nearby_alignment() {
        let unit = 4;
        let matrix = grid_with_alignment(18, 18, unit);
        let truth = Point::new(18.5 * unit as f32, 18.5 * unit as f32);
        let estimate = truth.translate(5.0, -6.0);
        let found = find_alignment(&matrix, estimate, unit as f32).unwrap();
        assert!(found.distance(&truth) < 1.0, "{found:?}");
    }

    #[test]
    fn test_nothing_in_blank_region() {
        let matrix = BitMatrix::new(100, 100);
        assert_eq!(find_alignment(&matrix, Point::new(50.0, 50.0), 4.0), None);
    }
}
