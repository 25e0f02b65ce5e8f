/// Geometry utilities for perspective transformations and polygon overlap
use crate::models::Point;

/// Perspective transformation matrix (3x3)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveTransform {
    a11: f64,
    a12: f64,
    a13: f64,
    a21: f64,
    a22: f64,
    a23: f64,
    a31: f64,
    a32: f64,
    a33: f64,
}

impl PerspectiveTransform {
    /// Create transform from 4 source points to 4 destination points
    pub fn from_points(src: &[Point; 4], dst: &[Point; 4]) -> Option<Self> {
        // Direct linear transform with a33 fixed to 1
        let mut a = [[0.0f64; 8]; 8];
        let mut b = [0.0f64; 8];

        for i in 0..4 {
            let (sx, sy) = (src[i].x as f64, src[i].y as f64);
            let (dx, dy) = (dst[i].x as f64, dst[i].y as f64);

            let row = i * 2;
            a[row] = [sx, sy, 1.0, 0.0, 0.0, 0.0, -dx * sx, -dx * sy];
            b[row] = dx;
            a[row + 1] = [0.0, 0.0, 0.0, sx, sy, 1.0, -dy * sx, -dy * sy];
            b[row + 1] = dy;
        }

        solve_linear_system(&a, &b).map(|s| Self {
            a11: s[0],
            a12: s[1],
            a13: s[2],
            a21: s[3],
            a22: s[4],
            a23: s[5],
            a31: s[6],
            a32: s[7],
            a33: 1.0,
        })
    }

    /// Transform a point using this perspective matrix
    ///
    /// Points on the line at infinity map to the origin.
    pub fn transform(&self, p: &Point) -> Point {
        let x = p.x as f64;
        let y = p.y as f64;

        let denominator = self.a31 * x + self.a32 * y + self.a33;
        if denominator.abs() < 1e-12 {
            return Point::new(0.0, 0.0);
        }

        let x_new = (self.a11 * x + self.a12 * y + self.a13) / denominator;
        let y_new = (self.a21 * x + self.a22 * y + self.a23) / denominator;

        Point::new(x_new as f32, y_new as f32)
    }
}

/// Solve 8x8 linear system using Gaussian elimination with partial pivoting
#[allow(clippy::needless_range_loop)]
fn solve_linear_system(a: &[[f64; 8]; 8], b: &[f64; 8]) -> Option<[f64; 8]> {
    let mut a = *a;
    let mut b = *b;
    let n = 8;

    for i in 0..n {
        let mut max_val = a[i][i].abs();
        let mut max_row = i;
        for k in (i + 1)..n {
            if a[k][i].abs() > max_val {
                max_val = a[k][i].abs();
                max_row = k;
            }
        }

        if max_val < 1e-12 {
            return None;
        }

        if max_row != i {
            a.swap(i, max_row);
            b.swap(i, max_row);
        }

        for k in (i + 1)..n {
            let factor = a[k][i] / a[i][i];
            b[k] -= factor * b[i];
            for j in i..n {
                a[k][j] -= factor * a[i][j];
            }
        }
    }

    let mut x = [0.0f64; 8];
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum -= a[i][j] * x[j];
        }
        x[i] = sum / a[i][i];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// Signed shoelace area; positive for clockwise order on screen (y down)
pub fn signed_area(polygon: &[Point]) -> f32 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| {
            let p = polygon[i];
            let q = polygon[(i + 1) % n];
            p.x * q.y - q.x * p.y
        })
        .sum();
    twice * 0.5
}

/// Absolute polygon area
pub fn polygon_area(polygon: &[Point]) -> f32 {
    signed_area(polygon).abs()
}

/// Mean of the vertices
pub fn centroid(polygon: &[Point]) -> Point {
    if polygon.is_empty() {
        return Point::default();
    }
    let n = polygon.len() as f32;
    let (sx, sy) = polygon
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Point::new(sx / n, sy / n)
}

/// True when the quad is strictly convex (and therefore simple)
pub fn is_convex_quad(quad: &[Point; 4]) -> bool {
    let mut sign = 0.0f32;
    for i in 0..4 {
        let turn = quad[i].cross(&quad[(i + 1) % 4], &quad[(i + 2) % 4]);
        if turn.abs() < 1e-6 {
            return false;
        }
        if sign == 0.0 {
            sign = turn.signum();
        } else if turn.signum() != sign {
            return false;
        }
    }
    true
}

/// Intersection of two convex polygons (Sutherland-Hodgman clipping)
pub fn convex_intersection(subject: &[Point], clip: &[Point]) -> Vec<Point> {
    let clip = oriented(clip);
    let mut output = oriented(subject);

    for i in 0..clip.len() {
        if output.is_empty() {
            break;
        }
        let edge_start = clip[i];
        let edge_end = clip[(i + 1) % clip.len()];
        let input = std::mem::take(&mut output);

        for j in 0..input.len() {
            let current = input[j];
            let previous = input[(j + input.len() - 1) % input.len()];
            let current_inside = edge_start.cross(&edge_end, &current) >= 0.0;
            let previous_inside = edge_start.cross(&edge_end, &previous) >= 0.0;

            if current_inside {
                if !previous_inside {
                    output.extend(line_intersection(previous, current, edge_start, edge_end));
                }
                output.push(current);
            } else if previous_inside {
                output.extend(line_intersection(previous, current, edge_start, edge_end));
            }
        }
    }

    output
}

/// Intersection-over-union of two convex polygons
pub fn polygon_iou(a: &[Point], b: &[Point]) -> f32 {
    let area_a = polygon_area(a);
    let area_b = polygon_area(b);
    if area_a <= 0.0 || area_b <= 0.0 {
        return 0.0;
    }
    let inter = polygon_area(&convex_intersection(a, b));
    let union = area_a + area_b - inter;
    if union <= 0.0 { 0.0 } else { inter / union }
}

/// Copy of `polygon` with clockwise (positive signed area) winding
fn oriented(polygon: &[Point]) -> Vec<Point> {
    let mut out = polygon.to_vec();
    if signed_area(&out) < 0.0 {
        out.reverse();
    }
    out
}

/// Segment p-q against the infinite line a-b
fn line_intersection(p: Point, q: Point, a: Point, b: Point) -> Option<Point> {
    let dp = Point::new(q.x - p.x, q.y - p.y);
    let de = Point::new(b.x - a.x, b.y - a.y);
    let denom = dp.x * de.y - dp.y * de.x;
    if denom.abs() < 1e-9 {
        return None;
    }
    let t = ((a.x - p.x) * de.y - (a.y - p.y) * de.x) / denom;
    Some(Point::new(p.x + t * dp.x, p.y + t * dp.y))
}
