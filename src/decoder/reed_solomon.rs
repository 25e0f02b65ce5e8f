/// Reed-Solomon error correction for QR codes
/// QR codes use RS over GF(256) with primitive polynomial x^8 + x^4 + x^3 + x^2 + 1
/// GF(256) field operations using log/exp tables
pub struct Gf256;

const PRIMITIVE: u16 = 0x11D;

const fn build_exp_table() -> [u8; 512] {
    let mut table = [0u8; 512];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        table[i] = x as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    // Doubled so that log(a) + log(b) never needs a modulo
    while i < 512 {
        table[i] = table[i - 255];
        i += 1;
    }
    table
}

const fn build_log_table() -> [u8; 256] {
    let exp = build_exp_table();
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 255 {
        table[exp[i] as usize] = i as u8;
        i += 1;
    }
    table
}

static EXP_TABLE: [u8; 512] = build_exp_table();
static LOG_TABLE: [u8; 256] = build_log_table();

impl Gf256 {
    /// alpha^n
    pub fn exp(n: usize) -> u8 {
        EXP_TABLE[n % 255]
    }

    /// Product in GF(256)
    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        EXP_TABLE[LOG_TABLE[a as usize] as usize + LOG_TABLE[b as usize] as usize]
    }

    /// Quotient in GF(256); `b` must be non-zero
    pub fn div(a: u8, b: u8) -> u8 {
        debug_assert!(b != 0, "division by zero in GF(256)");
        if a == 0 || b == 0 {
            return 0;
        }
        EXP_TABLE[LOG_TABLE[a as usize] as usize + 255 - LOG_TABLE[b as usize] as usize]
    }

    /// Multiplicative inverse; `a` must be non-zero
    pub fn inv(a: u8) -> u8 {
        Self::div(1, a)
    }

    /// a^n
    pub fn pow(a: u8, n: usize) -> u8 {
        if n == 0 {
            return 1;
        }
        if a == 0 {
            return 0;
        }
        EXP_TABLE[(LOG_TABLE[a as usize] as usize * n) % 255]
    }
}

/// Evaluate a polynomial with coefficients in ascending order
fn poly_eval(poly: &[u8], x: u8) -> u8 {
    poly.iter().rev().fold(0u8, |acc, &c| Gf256::mul(acc, x) ^ c)
}

/// Computes EC codewords for a data block
pub struct ReedSolomonEncoder {
    /// Generator coefficients in descending order, leading 1 omitted
    divisor: Vec<u8>,
}

impl ReedSolomonEncoder {
    /// Encoder whose generator has roots alpha^0 .. alpha^(degree-1)
    pub fn new(degree: usize) -> Self {
        let mut divisor = vec![0u8; degree];
        if let Some(last) = divisor.last_mut() {
            *last = 1;
        }
        let mut root = 1u8;
        for _ in 0..degree {
            for j in 0..degree {
                divisor[j] = Gf256::mul(divisor[j], root);
                if j + 1 < degree {
                    divisor[j] ^= divisor[j + 1];
                }
            }
            root = Gf256::mul(root, 0x02);
        }
        Self { divisor }
    }

    /// Remainder of `data * x^degree` divided by the generator
    pub fn ecc(&self, data: &[u8]) -> Vec<u8> {
        let mut remainder = vec![0u8; self.divisor.len()];
        if remainder.is_empty() {
            return remainder;
        }
        for &byte in data {
            let factor = byte ^ remainder.remove(0);
            remainder.push(0);
            for (r, &d) in remainder.iter_mut().zip(&self.divisor) {
                *r ^= Gf256::mul(d, factor);
            }
        }
        remainder
    }
}

/// Corrects up to `num_ecc_codewords / 2` symbol errors per block
pub struct ReedSolomonDecoder {
    num_ecc_codewords: usize,
}

impl ReedSolomonDecoder {
    /// Decoder for blocks carrying `num_ecc_codewords` EC codewords
    pub fn new(num_ecc_codewords: usize) -> Self {
        Self { num_ecc_codewords }
    }

    /// Maximum number of correctable codewords
    pub fn capacity(&self) -> usize {
        self.num_ecc_codewords / 2
    }

    /// Correct `received` (data followed by EC codewords) in place.
    ///
    /// Returns the number of codewords repaired.
    pub fn decode(&self, received: &mut [u8]) -> Result<usize, &'static str> {
        let n = received.len();
        if self.num_ecc_codewords == 0 || n <= self.num_ecc_codewords || n > 255 {
            return Err("invalid block length");
        }

        let syndromes = self.syndromes(received);
        if syndromes.iter().all(|&s| s == 0) {
            return Ok(0);
        }

        let locator = berlekamp_massey(&syndromes);
        let errors = locator.len() - 1;
        if errors == 0 || errors > self.capacity() {
            return Err("too many errors");
        }

        let positions = chien_search(&locator, n);
        if positions.len() != errors {
            return Err("error locator degree does not match its roots");
        }

        let evaluator = error_evaluator(&syndromes, &locator);
        for &pos in &positions {
            let x = Gf256::exp(n - 1 - pos);
            let x_inv = Gf256::inv(x);
            let denominator = locator_derivative_at(&locator, x_inv);
            if denominator == 0 {
                return Err("zero derivative in Forney");
            }
            let magnitude = Gf256::mul(x, Gf256::div(poly_eval(&evaluator, x_inv), denominator));
            received[pos] ^= magnitude;
        }

        if self.syndromes(received).iter().any(|&s| s != 0) {
            return Err("residual syndrome after correction");
        }
        Ok(errors)
    }

    /// S_j = r(alpha^j) for j in 0..num_ecc
    fn syndromes(&self, received: &[u8]) -> Vec<u8> {
        (0..self.num_ecc_codewords)
            .map(|j| {
                let x = Gf256::exp(j);
                received.iter().fold(0u8, |acc, &c| Gf256::mul(acc, x) ^ c)
            })
            .collect()
    }
}

/// Error locator Lambda(x) (ascending, Lambda_0 = 1) of degree L
fn berlekamp_massey(syndromes: &[u8]) -> Vec<u8> {
    let mut current = vec![1u8];
    let mut previous = vec![1u8];
    let mut length = 0usize;
    let mut shift = 1usize;
    let mut last_discrepancy = 1u8;

    for n in 0..syndromes.len() {
        let mut discrepancy = syndromes[n];
        for i in 1..=length {
            if let Some(&c) = current.get(i) {
                discrepancy ^= Gf256::mul(c, syndromes[n - i]);
            }
        }

        if discrepancy == 0 {
            shift += 1;
            continue;
        }

        let coef = Gf256::div(discrepancy, last_discrepancy);
        let snapshot = current.clone();
        if current.len() < previous.len() + shift {
            current.resize(previous.len() + shift, 0);
        }
        for (i, &p) in previous.iter().enumerate() {
            current[i + shift] ^= Gf256::mul(coef, p);
        }

        if 2 * length <= n {
            length = n + 1 - length;
            previous = snapshot;
            last_discrepancy = discrepancy;
            shift = 1;
        } else {
            shift += 1;
        }
    }

    // A vanishing top coefficient shows up later as a root-count mismatch
    current.resize(length + 1, 0);
    current
}

/// Positions `pos` (index into the block) where Lambda(alpha^-(n-1-pos)) = 0
fn chien_search(locator: &[u8], n: usize) -> Vec<usize> {
    (0..n)
        .filter(|&pos| {
            let x_inv = Gf256::inv(Gf256::exp(n - 1 - pos));
            poly_eval(locator, x_inv) == 0
        })
        .collect()
}

/// Omega(x) = S(x) * Lambda(x) mod x^(2t)
fn error_evaluator(syndromes: &[u8], locator: &[u8]) -> Vec<u8> {
    let mut omega = vec![0u8; syndromes.len()];
    for (i, &s) in syndromes.iter().enumerate() {
        for (j, &l) in locator.iter().enumerate() {
            if i + j < omega.len() {
                omega[i + j] ^= Gf256::mul(s, l);
            }
        }
    }
    omega
}

/// Lambda'(x): in characteristic 2 only odd powers survive
fn locator_derivative_at(locator: &[u8], x: u8) -> u8 {
    locator
        .iter()
        .enumerate()
        .skip(1)
        .step_by(2)
        .fold(0u8, |acc, (i, &c)| acc ^ Gf256::mul(c, Gf256::pow(x, i - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rs_encode(data: &[u8], num_ecc: usize) -> Vec<u8> {
        let mut codeword = data.to_vec();
        codeword.extend(ReedSolomonEncoder::new(num_ecc).ecc(data));
        codeword
    }

    #[test]
    fn test_gf256_tables() {
        assert_eq!(Gf256::exp(0), 1);
        assert_eq!(Gf256::exp(8), 29);
        assert_eq!(Gf256::exp(255), 1);
        assert_eq!(LOG_TABLE[2], 1);
        assert_eq!(LOG_TABLE[29], 8);
    }

    #[test]
    fn test_gf256_basic() {
        assert_eq!(Gf256::mul(0, 5), 0);
        assert_eq!(Gf256::mul(5, 0), 0);
        assert_eq!(Gf256::div(0, 5), 0);
        assert_eq!(Gf256::div(7, 7), 1);
        assert_eq!(Gf256::div(123, 123), 1);
        for a in 1..=255u8 {
            assert_eq!(Gf256::mul(a, Gf256::inv(a)), 1);
        }
    }

    #[test]
    fn test_gf256_pow() {
        assert_eq!(Gf256::pow(2, 255), 1);
        assert_eq!(Gf256::pow(2, 256), 2);
        assert_eq!(Gf256::pow(2, 260), Gf256::pow(2, 5));
        assert_eq!(Gf256::pow(0, 10), 0);
        assert_eq!(Gf256::pow(0, 0), 1);
    }

    #[test]
    fn test_known_ecc() {
        // Version 1-M "01234567" example from the QR standard annex
        let data = [
            0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11,
            0xEC, 0x11,
        ];
        let ecc = ReedSolomonEncoder::new(10).ecc(&data);
        assert_eq!(
            ecc,
            vec![0xA5, 0x24, 0xD4, 0xC1, 0xED, 0x36, 0xC7, 0x87, 0x2C, 0x55]
        );
    }

    #[test]
    fn test_rs_encode_decode_no_errors() {
        let data = vec![0x10, 0x20, 0x30, 0x40, 0x50, 0x60];
        let mut codeword = rs_encode(&data, 10);
        assert_eq!(ReedSolomonDecoder::new(10).decode(&mut codeword), Ok(0));
        assert_eq!(&codeword[..data.len()], &data);
    }

    #[test]
    fn test_rs_correct_multiple_errors() {
        let data = vec![0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
        let mut codeword = rs_encode(&data, 10);
        codeword[0] ^= 0xFF;
        codeword[4] ^= 0x42;
        codeword[7] ^= 0x13;

        assert_eq!(ReedSolomonDecoder::new(10).decode(&mut codeword), Ok(3));
        assert_eq!(&codeword[..data.len()], &data);
    }

    #[test]
    fn test_rs_correct_errors_at_end() {
        let data = vec![0x01, 0x02, 0x03, 0x04, 0x05];
        let mut codeword = rs_encode(&data, 8);
        let total = codeword.len();
        codeword[total - 1] ^= 0xFF;
        codeword[total - 2] ^= 0x33;

        assert_eq!(ReedSolomonDecoder::new(8).decode(&mut codeword), Ok(2));
        assert_eq!(&codeword[..data.len()], &data);
    }

    #[test]
    fn test_rs_exact_capacity_and_beyond() {
        let data: Vec<u8> = (0..19u8).map(|i| i.wrapping_mul(37)).collect();
        let clean = rs_encode(&data, 7);
        let decoder = ReedSolomonDecoder::new(7);

        let mut three = clean.clone();
        for pos in [0, 10, 25] {
            three[pos] ^= 0x5A;
        }
        assert_eq!(decoder.decode(&mut three), Ok(3));
        assert_eq!(three, clean);

        let mut four = clean.clone();
        for pos in [0, 5, 10, 25] {
            four[pos] ^= 0x5A;
        }
        assert!(decoder.decode(&mut four).is_err());
    }

    #[test]
    fn test_rs_max_length_block() {
        let data: Vec<u8> = (0..225).map(|i| (i * 7 % 256) as u8).collect();
        let clean = rs_encode(&data, 30);
        let mut received = clean.clone();
        for pos in (0..255).step_by(17) {
            received[pos] ^= 0xA5;
        }
        assert_eq!(ReedSolomonDecoder::new(30).decode(&mut received), Ok(15));
        assert_eq!(received, clean);
    }
}
