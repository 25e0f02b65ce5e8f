/// Codeword extraction from an unmasked QR module matrix
use crate::decoder::function_mask::FunctionMask;
use crate::models::BitMatrix;

/// Reads codewords along the two-column zig-zag
pub struct BitstreamExtractor;

impl BitstreamExtractor {
    /// Data bits in placement order (excluding function patterns)
    pub fn extract(matrix: &BitMatrix, func: &FunctionMask) -> Vec<bool> {
        func.data_positions()
            .into_iter()
            .map(|(x, y)| matrix.get(x, y))
            .collect()
    }

    /// Data bits packed MSB-first into codewords; trailing remainder bits are dropped
    pub fn codewords(matrix: &BitMatrix, func: &FunctionMask) -> Vec<u8> {
        Self::extract(matrix, func)
            .chunks_exact(8)
            .map(|bits| bits.iter().fold(0u8, |acc, &b| (acc << 1) | b as u8))
            .collect()
    }
}

/// MSB-first reader over a byte slice
pub struct BitReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    /// Start reading at the first bit of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Bits not yet consumed
    pub fn remaining(&self) -> usize {
        self.bytes.len() * 8 - self.position
    }

    /// Read `count` (<= 32) bits, or `None` if fewer remain
    pub fn read(&mut self, count: usize) -> Option<u32> {
        if count > 32 || count > self.remaining() {
            return None;
        }
        let mut value = 0u32;
        for _ in 0..count {
            let byte = self.bytes[self.position / 8];
            let bit = (byte >> (7 - self.position % 8)) & 1;
            value = (value << 1) | bit as u32;
            self.position += 1;
        }
        Some(value)
    }
}
