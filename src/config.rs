use crate::error::DecodeError;

/// Tunables for a decode call
///
/// Passed explicitly to every stage; nothing is cached process-wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanOptions {
    /// Side length of binarization blocks in pixels
    pub block_size: usize,
    /// Minimum intensity spread for a block to get its own threshold
    pub min_contrast: u8,
    /// Look for QR finder patterns
    pub matrix: bool,
    /// Look for EAN-13 / Code 128 guards
    pub linear: bool,
    /// Upper bound on candidates yielded per frame
    pub max_candidates: usize,
    /// Upper bound on finder centres considered for triple grouping
    pub max_finder_centers: usize,
    /// Sample each module with a 3x3 majority vote instead of its centre pixel
    pub majority_vote: bool,
    /// Candidates below this confidence are not yielded
    pub min_confidence: f32,
    /// Overlap above which identical results are merged
    pub dedup_iou: f32,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            block_size: 32,
            min_contrast: 24,
            matrix: true,
            linear: true,
            max_candidates: 32,
            max_finder_centers: 16,
            majority_vote: true,
            min_confidence: 0.3,
            dedup_iou: 0.5,
        }
    }
}

impl ScanOptions {
    /// Defaults overridden by `SCAN_*` environment variables
    ///
    /// Recognised: `SCAN_BLOCK_SIZE`, `SCAN_MIN_CONTRAST`, `SCAN_MATRIX`,
    /// `SCAN_LINEAR`, `SCAN_MAX_CANDIDATES`, `SCAN_MAX_FINDER_CENTERS`,
    /// `SCAN_MAJORITY_VOTE`, `SCAN_MIN_CONFIDENCE`, `SCAN_DEDUP_IOU`.
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            block_size: parse_env_usize("SCAN_BLOCK_SIZE", d.block_size).clamp(8, 256),
            min_contrast: parse_env_u8("SCAN_MIN_CONTRAST", d.min_contrast),
            matrix: parse_env_bool_u8("SCAN_MATRIX", d.matrix),
            linear: parse_env_bool_u8("SCAN_LINEAR", d.linear),
            max_candidates: parse_env_usize("SCAN_MAX_CANDIDATES", d.max_candidates).max(1),
            max_finder_centers: parse_env_usize("SCAN_MAX_FINDER_CENTERS", d.max_finder_centers)
                .clamp(3, 64),
            majority_vote: parse_env_bool_u8("SCAN_MAJORITY_VOTE", d.majority_vote),
            min_confidence: parse_env_f32("SCAN_MIN_CONFIDENCE", d.min_confidence).clamp(0.0, 1.0),
            dedup_iou: parse_env_f32("SCAN_DEDUP_IOU", d.dedup_iou).clamp(0.0, 1.0),
        }
    }
}

impl ScanOptions {
    /// Reject values no stage can work with
    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.block_size < 2 {
            return Err(DecodeError::InvalidInput(format!(
                "block size {} is below 2 pixels",
                self.block_size
            )));
        }
        for (name, value) in [
            ("min_confidence", self.min_confidence),
            ("dedup_iou", self.dedup_iou),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DecodeError::InvalidInput(format!(
                    "{name} {value} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_u8(name: &str, default: u8) -> u8 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .unwrap_or(default)
}

fn parse_env_f32(name: &str, default: f32) -> f32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn parse_env_bool_u8(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ScanOptions::default();
        assert_eq!(options.block_size, 32);
        assert!(options.matrix && options.linear);
        assert!((options.dedup_iou - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_validate() {
        assert!(ScanOptions::default().validate().is_ok());
        let tiny = ScanOptions {
            block_size: 1,
            ..ScanOptions::default()
        };
        assert!(matches!(tiny.validate(), Err(DecodeError::InvalidInput(_))));
        let nan = ScanOptions {
            dedup_iou: f32::NAN,
            ..ScanOptions::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_parse_helpers_fall_back() {
        assert_eq!(parse_env_usize("SCAN_TEST_UNSET_VARIABLE", 7), 7);
        assert!(parse_env_bool_u8("SCAN_TEST_UNSET_VARIABLE", true));
        assert_eq!(parse_env_f32("SCAN_TEST_UNSET_VARIABLE", 0.25), 0.25);
    }
}
