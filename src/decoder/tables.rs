use crate::models::{ECLevel, Version};

/// Reed-Solomon block layout for one version and EC level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcBlockInfo {
    /// Number of RS blocks
    pub num_blocks: usize,
    /// EC codewords in every block
    pub ecc_per_block: usize,
    /// Total codewords in the symbol (data + EC)
    pub total_codewords: usize,
}

impl EcBlockInfo {
    /// Data codewords across all blocks
    pub fn data_codewords(&self) -> usize {
        self.total_codewords - self.num_blocks * self.ecc_per_block
    }

    /// Codewords that can be repaired across the whole symbol
    pub fn correction_capacity(&self) -> usize {
        self.num_blocks * (self.ecc_per_block / 2)
    }

    /// Data length of the short blocks; long blocks hold one more
    pub fn short_block_data_len(&self) -> usize {
        self.data_codewords() / self.num_blocks
    }

    /// Number of blocks holding one extra data codeword (they come last)
    pub fn long_blocks(&self) -> usize {
        self.data_codewords() % self.num_blocks
    }
}

// Index: [ec_level][version]
const ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

const NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

/// Block layout for `version` at `ec_level`
pub fn ec_block_info(version: Version, ec_level: ECLevel) -> EcBlockInfo {
    let v = version.number() as usize;
    let idx = ec_level.ordinal();
    EcBlockInfo {
        num_blocks: NUM_ERROR_CORRECTION_BLOCKS[idx][v] as usize,
        ecc_per_block: ECC_CODEWORDS_PER_BLOCK[idx][v] as usize,
        total_codewords: raw_data_modules(version) / 8,
    }
}

/// Modules available for codewords once every function pattern is placed
pub fn raw_data_modules(version: Version) -> usize {
    let v = version.number() as usize;
    let mut modules = (16 * v + 128) * v + 64;
    if v >= 2 {
        let num_align = v / 7 + 2;
        modules -= (25 * num_align - 10) * num_align - 55;
        if v >= 7 {
            modules -= 36;
        }
    }
    modules
}

/// Alignment pattern centre coordinates (shared by both axes)
pub fn alignment_pattern_positions(version: Version) -> Vec<usize> {
    let v = version.number() as usize;
    if v == 1 {
        return Vec::new();
    }
    let num_align = v / 7 + 2;
    let step = (v * 8 + num_align * 3 + 5) / (num_align * 4 - 4) * 2;
    let mut positions = vec![6usize; num_align];
    let mut pos = version.size() - 7;
    for slot in positions.iter_mut().skip(1).rev() {
        *slot = pos;
        pos -= step;
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(n: u8) -> Version {
        Version::new(n).unwrap()
    }

    #[test]
    fn test_alignment_positions() {
        assert!(alignment_pattern_positions(v(1)).is_empty());
        assert_eq!(alignment_pattern_positions(v(2)), vec![6, 18]);
        assert_eq!(alignment_pattern_positions(v(7)), vec![6, 22, 38]);
        assert_eq!(alignment_pattern_positions(v(15)), vec![6, 26, 48, 70]);
        assert_eq!(alignment_pattern_positions(v(32)), vec![6, 34, 60, 86, 112, 138]);
        assert_eq!(
            alignment_pattern_positions(v(40)),
            vec![6, 30, 58, 86, 114, 142, 170]
        );
    }

    #[test]
    fn test_block_info() {
        let info = ec_block_info(v(1), ECLevel::L);
        assert_eq!(info.total_codewords, 26);
        assert_eq!(info.data_codewords(), 19);
        assert_eq!(info.correction_capacity(), 3);

        let info = ec_block_info(v(5), ECLevel::Q);
        assert_eq!(info.total_codewords, 134);
        assert_eq!(info.num_blocks, 4);
        assert_eq!(info.data_codewords(), 62);
        assert_eq!(info.short_block_data_len(), 15);
        assert_eq!(info.long_blocks(), 2);

        let info = ec_block_info(v(40), ECLevel::H);
        assert_eq!(info.total_codewords, 3706);
        assert_eq!(info.data_codewords(), 1276);
    }
}
