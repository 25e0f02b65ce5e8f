/// Version information extraction for QR codes v7+
use crate::decoder::bch::VERSION_CODE;
use crate::models::{BitMatrix, Version};

/// Version info is 18 bits (6 data + 12 ECC) for versions 7-40
pub struct VersionInfo;

impl VersionInfo {
    /// Read the top-right block, falling back to the bottom-left block
    pub fn read(matrix: &BitMatrix) -> Option<Version> {
        let size = matrix.width();
        if size < 45 {
            return None;
        }
        let [top_right, bottom_left] = version_positions(size);
        let read_block = |positions: &[(usize, usize); 18]| {
            positions
                .iter()
                .enumerate()
                .fold(0u32, |bits, (i, &(x, y))| bits | (matrix.get(x, y) as u32) << i)
        };

        Self::decode(read_block(&top_right)).or_else(|| Self::decode(read_block(&bottom_left)))
    }

    /// Nearest valid version word within three bit errors
    pub fn decode(bits: u32) -> Option<Version> {
        let (data, _) = VERSION_CODE.decode_nearest(bits, 7..=40, |c| c)?;
        Version::new(data as u8)
    }

    /// 18-bit codeword for `version`
    pub fn encode(version: Version) -> u32 {
        VERSION_CODE.encode(version.number() as u32)
    }
}

/// Module `(x, y)` holding bit `i` of the top-right and bottom-left blocks
pub fn version_positions(size: usize) -> [[(usize, usize); 18]; 2] {
    let mut top_right = [(0, 0); 18];
    let mut bottom_left = [(0, 0); 18];
    for i in 0..18 {
        let a = size - 11 + i % 3;
        let b = i / 3;
        top_right[i] = (a, b);
        bottom_left[i] = (b, a);
    }
    [top_right, bottom_left]
}
