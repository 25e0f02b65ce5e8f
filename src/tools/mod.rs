//! Helpers shared by the CLI, benches and integration tests.

/// Synthetic symbol generator
pub mod render;

use crate::models::BitMatrix;
use image::GrayImage;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn max_dim_from_env() -> Option<u32> {
    match env::var("SCAN_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Load an image file as 8-bit grayscale.
///
/// When `SCAN_MAX_DIM` is set, images whose longer side exceeds it are
/// downscaled first.
pub fn load_gray<P: AsRef<Path>>(path: P) -> Result<GrayImage, image::ImageError> {
    let img = image::open(path)?;
    let img = match max_dim_from_env() {
        Some(max_dim) if img.width().max(img.height()) > max_dim => {
            img.resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
        }
        _ => img,
    };
    Ok(img.to_luma8())
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Summary statistics for a binary matrix.
#[derive(Debug, Clone, Copy)]
pub struct BinaryStats {
    /// Count of black pixels.
    pub black_pixels: usize,
    /// Total pixels in the matrix.
    pub total_pixels: usize,
    /// Ratio of black pixels to total pixels.
    pub black_ratio: f64,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    let avg = if gray.is_empty() {
        0
    } else {
        (sum / gray.len() as u64) as u8
    };
    GrayStats { min, max, avg }
}

/// Compute black pixel stats for a binary matrix.
pub fn binary_stats(binary: &BitMatrix) -> BinaryStats {
    let black = binary.count_black();
    let total = binary.width() * binary.height();
    let ratio = if total == 0 {
        0.0
    } else {
        black as f64 / total as f64
    };
    BinaryStats {
        black_pixels: black,
        total_pixels: total,
        black_ratio: ratio,
    }
}

/// Image files under `root`, sorted, optionally truncated to `limit`.
pub fn image_files<P: AsRef<Path>>(root: P, limit: Option<usize>) -> Vec<PathBuf> {
    let mut stack = vec![root.as_ref().to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "bmp") {
                    images.push(path);
                }
            }
        }
    }

    images.sort();
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX epoch")
            .as_nanos();
        let sequence = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("rust_barcode_tools_{nanos}_{sequence}"));
        fs::create_dir_all(dir.join("nested")).expect("failed to create temp dir");
        dir
    }

    #[test]
    fn test_grayscale_stats() {
        let stats = grayscale_stats(&[10, 20, 30]);
        assert_eq!(
            stats,
            GrayStats {
                min: 10,
                max: 30,
                avg: 20
            }
        );
        assert_eq!(grayscale_stats(&[]).avg, 0);
    }

    #[test]
    fn test_binary_stats() {
        let matrix = BitMatrix::from_fn(4, 2, |x, _| x == 0);
        let stats = binary_stats(&matrix);
        assert_eq!(stats.black_pixels, 2);
        assert_eq!(stats.total_pixels, 8);
        assert!((stats.black_ratio - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_image_files_and_load_gray() {
        let dir = temp_dir();
        let image = GrayImage::from_pixel(3, 2, image::Luma([77]));
        image.save(dir.join("b.png")).unwrap();
        image.save(dir.join("nested").join("a.png")).unwrap();
        fs::write(dir.join("notes.txt"), "skip").unwrap();

        let files = image_files(&dir, None);
        assert_eq!(files.len(), 2);
        assert_eq!(image_files(&dir, Some(1)).len(), 1);

        let loaded = load_gray(&files[0]).unwrap();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.get_pixel(0, 0).0, [77]);
        let _ = fs::remove_dir_all(dir);
    }
}
