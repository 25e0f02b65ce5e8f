/// 2D point with floating point coordinates
///
/// Image coordinates are continuous: pixel `(x, y)` covers `[x, x + 1) × [y, y + 1)`,
/// so the centre of that pixel is `(x + 0.5, y + 0.5)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Calculate squared distance (faster, no sqrt)
    pub fn distance_squared(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Translate point by (dx, dy)
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Point halfway between `self` and `other`
    pub fn midpoint(&self, other: &Point) -> Self {
        Self {
            x: (self.x + other.x) * 0.5,
            y: (self.y + other.y) * 0.5,
        }
    }

    /// Z component of `(a - self) × (b - self)`.
    ///
    /// Positive when `a -> b` turns clockwise on screen (y grows downwards).
    pub fn cross(&self, a: &Point, b: &Point) -> f32 {
        (a.x - self.x) * (b.y - self.y) - (a.y - self.y) * (b.x - self.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
        assert!((a.distance_squared(&b) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_cross_orientation() {
        // top-left, top-right, bottom-left in screen coordinates
        let tl = Point::new(0.0, 0.0);
        let tr = Point::new(10.0, 0.0);
        let bl = Point::new(0.0, 10.0);
        assert!(tl.cross(&tr, &bl) > 0.0);
        assert!(tl.cross(&bl, &tr) < 0.0);
    }

    #[test]
    fn test_midpoint_and_translate() {
        let p = Point::new(2.0, 4.0).midpoint(&Point::new(4.0, 8.0));
        assert_eq!(p, Point::new(3.0, 6.0));
        assert_eq!(p.translate(-1.0, 1.0), Point::new(2.0, 7.0));
    }
}
