use crate::config::ScanOptions;
use crate::models::{BitMatrix, ImageBuffer};

/// Convert a grayscale image to binary with block-adaptive thresholds
///
/// The image is split into `block_size` squares. A block whose histogram spans
/// at least `min_contrast` levels gets an Otsu split, with the threshold placed
/// halfway between the two class means; flat blocks fall back to the global
/// mean. Each pixel's threshold is bilinearly interpolated between the four
/// surrounding block centres, and the pixel is black iff `sample < threshold`.
pub fn binarize(image: &ImageBuffer<'_>, options: &ScanOptions) -> BitMatrix {
    let width = image.width();
    let height = image.height();
    let block = options.block_size.max(4);
    let blocks_x = width.div_ceil(block);
    let blocks_y = height.div_ceil(block);

    let global = global_mean(image);
    let mut thresholds = vec![global; blocks_x * blocks_y];
    let mut bimodal = 0usize;
    for by in 0..blocks_y {
        for bx in 0..blocks_x {
            let histogram = block_histogram(image, bx * block, by * block, block);
            if let Some(t) = block_threshold(&histogram, options.min_contrast) {
                thresholds[by * blocks_x + bx] = t;
                bimodal += 1;
            }
        }
    }
    log::trace!(
        "binarize {}x{}: {} of {} blocks bimodal, global mean {:.1}",
        width,
        height,
        bimodal,
        blocks_x * blocks_y,
        global
    );

    let columns: Vec<(usize, usize, f32)> = (0..width)
        .map(|x| interpolation_cell(x, block, blocks_x))
        .collect();

    let mut binary = BitMatrix::new(width, height);
    for y in 0..height {
        let (y0, y1, fy) = interpolation_cell(y, block, blocks_y);
        let row0 = &thresholds[y0 * blocks_x..(y0 + 1) * blocks_x];
        let row1 = &thresholds[y1 * blocks_x..(y1 + 1) * blocks_x];
        for (x, &sample) in image.row(y).iter().enumerate() {
            let (x0, x1, fx) = columns[x];
            let top = row0[x0] + (row0[x1] - row0[x0]) * fx;
            let bottom = row1[x0] + (row1[x1] - row1[x0]) * fx;
            let threshold = top + (bottom - top) * fy;
            if (sample as f32) < threshold {
                binary.set(x, y, true);
            }
        }
    }

    binary
}

/// Blocks on either side of coordinate `p` and the weight of the far one
fn interpolation_cell(p: usize, block: usize, blocks: usize) -> (usize, usize, f32) {
    // Position in units of blocks, measured from the first block centre
    let c = (p as f32 + 0.5) / block as f32 - 0.5;
    if c <= 0.0 {
        return (0, 0, 0.0);
    }
    let i0 = c.floor() as usize;
    if i0 + 1 >= blocks {
        return (blocks - 1, blocks - 1, 0.0);
    }
    (i0, i0 + 1, c - i0 as f32)
}

fn global_mean(image: &ImageBuffer<'_>) -> f32 {
    let sum: u64 = (0..image.height())
        .map(|y| image.row(y).iter().map(|&v| v as u64).sum::<u64>())
        .sum();
    sum as f32 / (image.width() * image.height()) as f32
}

fn block_histogram(image: &ImageBuffer<'_>, x0: usize, y0: usize, block: usize) -> [u32; 256] {
    let mut histogram = [0u32; 256];
    let x1 = (x0 + block).min(image.width());
    let y1 = (y0 + block).min(image.height());
    for y in y0..y1 {
        for &pixel in &image.row(y)[x0..x1] {
            histogram[pixel as usize] += 1;
        }
    }
    histogram
}

/// Midpoint of the Otsu class means, or `None` for a low-contrast block
fn block_threshold(histogram: &[u32; 256], min_contrast: u8) -> Option<f32> {
    let lo = histogram.iter().position(|&c| c > 0)?;
    let hi = histogram.iter().rposition(|&c| c > 0)?;
    if hi - lo < min_contrast as usize {
        return None;
    }
    let split = otsu_split(histogram)?;
    Some((split.dark_mean + split.light_mean) as f32 * 0.5)
}

/// Result of Otsu's method on a histogram
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OtsuSplit {
    /// Highest intensity assigned to the dark class
    pub threshold: u8,
    /// Mean intensity of the dark class
    pub dark_mean: f64,
    /// Mean intensity of the light class
    pub light_mean: f64,
}

/// Maximise between-class variance over all splits of `histogram`
///
/// Returns `None` when every sample falls in one class.
pub fn otsu_split(histogram: &[u32; 256]) -> Option<OtsuSplit> {
    let total: u64 = histogram.iter().map(|&c| c as u64).sum();
    let total_sum: u64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as u64 * c as u64)
        .sum();

    let mut dark_pixels = 0u64;
    let mut dark_sum = 0u64;
    let mut best: Option<(f64, OtsuSplit)> = None;

    for (intensity, &count) in histogram.iter().enumerate() {
        dark_pixels += count as u64;
        dark_sum += intensity as u64 * count as u64;
        let light_pixels = total - dark_pixels;
        if dark_pixels == 0 || light_pixels == 0 {
            continue;
        }

        let dark_mean = dark_sum as f64 / dark_pixels as f64;
        let light_mean = (total_sum - dark_sum) as f64 / light_pixels as f64;
        let variance = dark_pixels as f64 * light_pixels as f64 * (light_mean - dark_mean).powi(2);

        if best.is_none_or(|(v, _)| variance > v) {
            best = Some((
                variance,
                OtsuSplit {
                    threshold: intensity as u8,
                    dark_mean,
                    light_mean,
                },
            ));
        }
    }

    best.map(|(_, split)| split)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ScanOptions {
        ScanOptions::default()
    }

    #[test]
    fn test_otsu_split() {
        let mut histogram = [0u32; 256];
        histogram[50] = 50;
        histogram[200] = 50;
        let split = otsu_split(&histogram).unwrap();
        assert!(split.threshold >= 50 && split.threshold < 200);
        assert_eq!(split.dark_mean, 50.0);
        assert_eq!(split.light_mean, 200.0);

        let mut flat = [0u32; 256];
        flat[90] = 10;
        assert!(otsu_split(&flat).is_none());
    }

    #[test]
    fn test_two_class_image() {
        // Top half dark, bottom half light
        let mut gray = vec![50u8; 50];
        gray.extend(vec![200u8; 50]);
        let image = ImageBuffer::packed(&gray, 10, 10).unwrap();

        let binary = binarize(&image, &options());
        assert!(binary.get(0, 0));
        assert!(!binary.get(0, 7));
    }

    #[test]
    fn test_uniform_images_are_white() {
        for level in [0u8, 30, 128, 255] {
            let gray = vec![level; 64 * 48];
            let image = ImageBuffer::packed(&gray, 64, 48).unwrap();
            assert_eq!(binarize(&image, &options()).count_black(), 0);
        }
    }

    #[test]
    fn test_gradient_lighting() {
        // A checkerboard under a left-to-right illumination ramp stays a checkerboard
        let (w, h) = (128usize, 64usize);
        let mut gray = vec![0u8; w * h];
        for y in 0..h {
            for x in 0..w {
                let ramp = (x as f32 / w as f32 * 80.0) as u8;
                let dark = ((x / 8) + (y / 8)) % 2 == 0;
                gray[y * w + x] = if dark { 20 + ramp } else { 150 + ramp };
            }
        }
        let image = ImageBuffer::packed(&gray, w, h).unwrap();
        let binary = binarize(&image, &options());
        for y in (4..h).step_by(8) {
            for x in (4..w).step_by(8) {
                let dark = ((x / 8) + (y / 8)) % 2 == 0;
                assert_eq!(binary.get(x, y), dark, "mismatch at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_respects_stride() {
        // Padding bytes (0) must not leak into the output
        let samples = [255, 255, 0, 0, 0, 255, 0, 0];
        let image = ImageBuffer::new(&samples, 2, 2, 4).unwrap();
        let binary = binarize(&image, &options());
        assert!(!binary.get(0, 0));
        assert!(!binary.get(1, 0));
        assert!(binary.get(0, 1));
        assert!(!binary.get(1, 1));
    }
}
