/// BCH codes protecting QR format (15,5) and version (18,6) information
pub struct BchCode {
    /// Number of remainder bits
    ecc_bits: u32,
    /// Generator polynomial including its leading term
    generator: u32,
}

/// Format information code: generator x^10 + x^8 + x^5 + x^4 + x^2 + x + 1
pub const FORMAT_CODE: BchCode = BchCode {
    ecc_bits: 10,
    generator: 0x537,
};

/// Version information code: generator x^12 + x^11 + x^10 + x^9 + x^8 + x^5 + x^2 + 1
pub const VERSION_CODE: BchCode = BchCode {
    ecc_bits: 12,
    generator: 0x1F25,
};

/// Codewords further than this from every valid codeword are rejected
pub const MAX_CORRECTABLE_BITS: u32 = 3;

impl BchCode {
    /// Systematic codeword: `data` followed by the polynomial remainder
    pub const fn encode(&self, data: u32) -> u32 {
        let mut rem = data;
        let mut i = 0;
        while i < self.ecc_bits {
            rem = (rem << 1) ^ ((rem >> (self.ecc_bits - 1)) * self.generator);
            i += 1;
        }
        (data << self.ecc_bits) | rem
    }

    /// Data value of the codeword nearest to `received` among `candidates`
    ///
    /// `transform` maps a data value to the codeword as it appears on the symbol
    /// (for format information this applies the XOR mask).
    pub fn decode_nearest(
        &self,
        received: u32,
        candidates: impl IntoIterator<Item = u32>,
        transform: impl Fn(u32) -> u32,
    ) -> Option<(u32, u32)> {
        candidates
            .into_iter()
            .map(|data| (data, (transform(self.encode(data)) ^ received).count_ones()))
            .min_by_key(|&(_, distance)| distance)
            .filter(|&(_, distance)| distance <= MAX_CORRECTABLE_BITS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codewords() {
        // Unmasked format word for EC level M, mask 0 is all zeros
        assert_eq!(FORMAT_CODE.encode(0), 0);
        assert_eq!(FORMAT_CODE.encode(0b01000) ^ 0x5412, 0x77C4);
        assert_eq!(VERSION_CODE.encode(7), 0x07C94);
        assert_eq!(VERSION_CODE.encode(40), 0x28C69);
    }

    #[test]
    fn test_decode_nearest_corrects_three_bits() {
        let word = VERSION_CODE.encode(21);
        let damaged = word ^ 0b1000_0000_0100_0001;
        let (data, distance) = VERSION_CODE
            .decode_nearest(damaged, 7..=40, |c| c)
            .unwrap();
        assert_eq!((data, distance), (21, 3));

        let too_far = word ^ 0b1111;
        assert!(VERSION_CODE.decode_nearest(too_far, 7..=40, |c| c).is_none());
    }
}
