use crate::decoder::tables::alignment_pattern_positions;
use crate::models::{BitMatrix, Version};

/// Function module mask for a specific QR version.
/// true = function module (not data), false = data module.
pub struct FunctionMask {
    mask: BitMatrix,
    version: Version,
}

impl FunctionMask {
    /// Mark finders, separators, timing, alignment, format, version and dark modules
    pub fn new(version: Version) -> Self {
        let size = version.size();
        let mut mask = BitMatrix::new(size, size);

        // Finder patterns + separators (8x8 areas, clipped to bounds)
        Self::mark_finder_area(&mut mask, 0, 0);
        Self::mark_finder_area(&mut mask, size - 7, 0);
        Self::mark_finder_area(&mut mask, 0, size - 7);

        // Timing patterns (row 6 and column 6)
        for i in 0..size {
            mask.set(6, i, true);
            mask.set(i, 6, true);
        }

        for (cx, cy) in alignment_centres(version) {
            for y in cy - 2..=cy + 2 {
                for x in cx - 2..=cx + 2 {
                    mask.set(x, y, true);
                }
            }
        }

        // Format info areas
        for i in 0..9 {
            if i != 6 {
                mask.set(8, i, true);
                mask.set(i, 8, true);
            }
        }
        for i in 0..8 {
            mask.set(size - 1 - i, 8, true);
            mask.set(8, size - 1 - i, true);
        }

        // Dark module
        mask.set(8, size - 8, true);

        // Version info blocks: 6x3 above the bottom-left finder, 3x6 left of the top-right one
        if version.has_version_info() {
            for a in 0..6 {
                for b in 0..3 {
                    mask.set(size - 11 + b, a, true);
                    mask.set(a, size - 11 + b, true);
                }
            }
        }

        Self { mask, version }
    }

    /// Side length in modules
    pub fn size(&self) -> usize {
        self.mask.width()
    }

    /// Version this mask was built for
    pub fn version(&self) -> Version {
        self.version
    }

    /// True for finder/timing/alignment/format/version modules
    pub fn is_function(&self, x: usize, y: usize) -> bool {
        self.mask.get(x, y)
    }

    /// Count of modules left for codewords
    pub fn data_modules_count(&self) -> usize {
        let size = self.size();
        size * size - self.mask.count_black()
    }

    /// Data module coordinates in codeword placement order
    ///
    /// Column pairs are walked right to left, skipping the vertical timing column,
    /// alternating upward and downward; within a pair the right column comes first.
    pub fn data_positions(&self) -> Vec<(usize, usize)> {
        let size = self.size();
        let mut positions = Vec::with_capacity(self.data_modules_count());
        let mut right = size as isize - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            let upward = ((right + 1) & 2) == 0;
            for vert in 0..size {
                let y = if upward { size - 1 - vert } else { vert };
                for dx in 0..2 {
                    let x = (right - dx) as usize;
                    if !self.is_function(x, y) {
                        positions.push((x, y));
                    }
                }
            }
            right -= 2;
        }
        positions
    }

    fn mark_finder_area(mask: &mut BitMatrix, x: usize, y: usize) {
        let size = mask.width();
        let start_x = x.saturating_sub(1);
        let start_y = y.saturating_sub(1);
        let end_x = (x + 8).min(size);
        let end_y = (y + 8).min(size);
        for yy in start_y..end_y {
            for xx in start_x..end_x {
                mask.set(xx, yy, true);
            }
        }
    }
}

/// Alignment pattern centres, excluding the three that would overlap finders
pub fn alignment_centres(version: Version) -> Vec<(usize, usize)> {
    let positions = alignment_pattern_positions(version);
    let n = positions.len();
    let mut centres = Vec::new();
    for (i, &cy) in positions.iter().enumerate() {
        for (j, &cx) in positions.iter().enumerate() {
            let overlaps_finder =
                (i == 0 && j == 0) || (i == 0 && j == n - 1) || (i == n - 1 && j == 0);
            if !overlaps_finder {
                centres.push((cx, cy));
            }
        }
    }
    centres
}
