use crate::decoder::format::FormatInfo;
use crate::decoder::version::VersionInfo;
use crate::error::DecodeError;
use crate::models::{BitMatrix, ECLevel, MaskPattern, Point, Version};
use crate::utils::geometry::PerspectiveTransform;

/// Square module grid with its format and version read from the fixed positions
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolGrid {
    modules: BitMatrix,
    version: Version,
    format: FormatInfo,
    polygon: [Point; 4],
    confidence: f32,
}

impl SymbolGrid {
    /// Validate a sampled module grid and read its format (and version) bits
    ///
    /// The polygon defaults to the grid's own extent; confidence is the share
    /// of finder and timing modules that match their fixed pattern.
    pub fn from_modules(modules: BitMatrix) -> Result<Self, DecodeError> {
        let dimension = modules.width();
        if modules.height() != dimension {
            return Err(DecodeError::InvalidData("module grid is not square"));
        }
        let version = Version::from_dimension(dimension)
            .ok_or(DecodeError::InvalidData("dimension is not 17 + 4 * version"))?;

        if version.has_version_info() {
            let read = VersionInfo::read(&modules)
                .ok_or(DecodeError::FormatCorrupt("version information"))?;
            if read != version {
                log::debug!(
                    "version information says {} but grid is {dimension}x{dimension}",
                    read.number()
                );
                return Err(DecodeError::FormatCorrupt(
                    "version information disagrees with dimension",
                ));
            }
        }

        let format =
            FormatInfo::read(&modules).ok_or(DecodeError::FormatCorrupt("format information"))?;
        let confidence = function_pattern_agreement(&modules);
        let extent = dimension as f32;
        Ok(Self {
            modules,
            version,
            format,
            polygon: [
                Point::new(0.0, 0.0),
                Point::new(extent, 0.0),
                Point::new(extent, extent),
                Point::new(0.0, extent),
            ],
            confidence,
        })
    }

    /// Attach the image-space boundary the grid was sampled from
    pub fn with_polygon(mut self, polygon: [Point; 4]) -> Self {
        self.polygon = polygon;
        self
    }

    /// Sampled modules (still masked)
    pub fn modules(&self) -> &BitMatrix {
        &self.modules
    }

    /// Modules per side
    pub fn dimension(&self) -> usize {
        self.modules.width()
    }

    /// Symbol version
    pub fn version(&self) -> Version {
        self.version
    }

    /// Error correction level from the format bits
    pub fn ec_level(&self) -> ECLevel {
        self.format.ec_level
    }

    /// Data mask from the format bits
    pub fn mask(&self) -> MaskPattern {
        self.format.mask_pattern
    }

    /// Outer boundary, clockwise from top-left
    pub fn polygon(&self) -> [Point; 4] {
        self.polygon
    }

    /// Sampling confidence in [0, 1]
    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}

/// Share of finder and timing modules that read as expected
fn function_pattern_agreement(modules: &BitMatrix) -> f32 {
    let size = modules.width();
    let mut total = 0u32;
    let mut matching = 0u32;
    let mut check = |x: usize, y: usize, dark: bool| {
        total += 1;
        matching += (modules.get(x, y) == dark) as u32;
    };

    for (ox, oy) in [(0, 0), (size - 7, 0), (0, size - 7)] {
        for dy in 0..7 {
            for dx in 0..7 {
                let ring = (dx as i32 - 3).abs().max((dy as i32 - 3).abs());
                check(ox + dx, oy + dy, ring != 2);
            }
        }
    }
    for i in 8..size - 8 {
        check(i, 6, i % 2 == 0);
        check(6, i, i % 2 == 0);
    }

    matching as f32 / total as f32
}

/// Transform from module coordinates (`0..dimension` on both axes) to the image
pub(crate) fn module_to_image(corners: &[Point; 4], dimension: usize) -> Option<PerspectiveTransform> {
    let d = dimension as f32;
    let square = [
        Point::new(0.0, 0.0),
        Point::new(d, 0.0),
        Point::new(d, d),
        Point::new(0.0, d),
    ];
    PerspectiveTransform::from_points(&square, corners)
}

/// Corners for `new_dimension` keeping the finder centres implied by `corners` at `dimension`
pub(crate) fn retarget(
    corners: &[Point; 4],
    dimension: usize,
    new_dimension: usize,
) -> Option<[Point; 4]> {
    if dimension == new_dimension {
        return Some(*corners);
    }
    let to_image = module_to_image(corners, dimension)?;
    let centres = |d: f32| {
        [
            Point::new(3.5, 3.5),
            Point::new(d - 3.5, 3.5),
            Point::new(d - 3.5, d - 3.5),
            Point::new(3.5, d - 3.5),
        ]
    };
    let old = centres(dimension as f32);
    let image_centres = old.map(|p| to_image.transform(&p));
    let retargeted = PerspectiveTransform::from_points(&centres(new_dimension as f32), &image_centres)?;
    let d = new_dimension as f32;
    Some(
        [
            Point::new(0.0, 0.0),
            Point::new(d, 0.0),
            Point::new(d, d),
            Point::new(0.0, d),
        ]
        .map(|p| retargeted.transform(&p)),
    )
}

/// Sample a `dimension`-square grid through `transform`
///
/// With `majority` every module is the vote of a 3x3 lattice inside it;
/// otherwise only its centre is read. Points outside the image read light.
pub(crate) fn sample_modules(
    binary: &BitMatrix,
    transform: &PerspectiveTransform,
    dimension: usize,
    majority: bool,
) -> BitMatrix {
    const LATTICE: [f32; 3] = [0.25, 0.5, 0.75];
    let pixel = |mx: f32, my: f32| {
        let p = transform.transform(&Point::new(mx, my));
        p.x >= 0.0 && p.y >= 0.0 && binary.get(p.x as usize, p.y as usize)
    };

    BitMatrix::from_fn(dimension, dimension, |x, y| {
        let (fx, fy) = (x as f32, y as f32);
        if majority {
            let votes = LATTICE
                .iter()
                .flat_map(|&dy| LATTICE.iter().map(move |&dx| (dx, dy)))
                .filter(|&(dx, dy)| pixel(fx + dx, fy + dy))
                .count();
            votes >= 5
        } else {
            pixel(fx + 0.5, fy + 0.5)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::render::{QrRenderOptions, qr_modules};

    #[test]
    fn test_from_modules_reads_format() {
        let options = QrRenderOptions {
            ec_level: ECLevel::Q,
            mask: Some(MaskPattern::Pattern5),
            ..QrRenderOptions::default()
        };
        let modules = qr_modules(b"grid", &options).unwrap();
        let grid = SymbolGrid::from_modules(modules).unwrap();
        assert_eq!(grid.version().number(), 1);
        assert_eq!(grid.ec_level(), ECLevel::Q);
        assert_eq!(grid.mask(), MaskPattern::Pattern5);
        assert_eq!(grid.confidence(), 1.0);
        assert_eq!(grid.polygon()[2], Point::new(21.0, 21.0));
    }

    #[test]
    fn test_large_grid_reads_version() {
        let options = QrRenderOptions {
            min_version: 7,
            ..QrRenderOptions::default()
        };
        let modules = qr_modules(b"seven", &options).unwrap();
        assert_eq!(modules.width(), 45);
        let grid = SymbolGrid::from_modules(modules).unwrap();
        assert_eq!(grid.version().number(), 7);
    }

    #[test]
    fn test_rejects_bad_dimension_and_blank_format() {
        assert_eq!(
            SymbolGrid::from_modules(BitMatrix::new(22, 22)),
            Err(DecodeError::InvalidData("dimension is not 17 + 4 * version"))
        );
        assert_eq!(
            SymbolGrid::from_modules(BitMatrix::new(21, 21)),
            Err(DecodeError::FormatCorrupt("format information"))
        );
    }

    #[test]
    fn test_sample_modules_identity_scale() {
        // 4 pixels per module, checkerboard of modules
        let binary = BitMatrix::from_fn(84, 84, |x, y| (x / 4 + y / 4) % 2 == 0);
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(84.0, 0.0),
            Point::new(84.0, 84.0),
            Point::new(0.0, 84.0),
        ];
        let transform = module_to_image(&corners, 21).unwrap();
        for majority in [false, true] {
            let grid = sample_modules(&binary, &transform, 21, majority);
            assert!(grid.get(0, 0));
            assert!(!grid.get(1, 0));
            assert!(grid.get(20, 20));
        }
    }

    #[test]
    fn test_retarget_keeps_finder_centres() {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        let moved = retarget(&corners, 25, 21).unwrap();
        let old = module_to_image(&corners, 25).unwrap();
        let new = module_to_image(&moved, 21).unwrap();
        let a = old.transform(&Point::new(21.5, 3.5));
        let b = new.transform(&Point::new(17.5, 3.5));
        assert!(a.distance(&b) < 1e-3);
    }
}
