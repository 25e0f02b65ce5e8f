/// EAN-13 / UPC-A decoding from normalised run widths
use crate::error::DecodeError;
use crate::models::BarcodeFormat;
use crate::models::linear::{
    EAN_FIRST_DIGIT_PARITY, EAN_L_PATTERNS, EAN13_RUNS, ean_check_digit, ean_g_pattern,
};
use crate::utils::runs::{best_pattern, pattern_variance};

const MAX_AVG_VARIANCE: f32 = 0.48;
const MAX_INDIVIDUAL_VARIANCE: f32 = 0.7;

const START_END_GUARD: [u8; 3] = [1, 1, 1];
const MIDDLE_GUARD: [u8; 5] = [1, 1, 1, 1, 1];

/// Decode 59 runs (bar first) into `(format, digits)`
///
/// Digits are ASCII. A leading zero marks a UPC-A symbol, reported with its
/// twelve UPC digits.
pub fn decode(runs: &[f32]) -> Result<(BarcodeFormat, Vec<u8>), DecodeError> {
    if runs.len() != EAN13_RUNS {
        return Err(DecodeError::InvalidData("EAN-13 needs 59 bar/space runs"));
    }
    let guards_ok = [
        (&runs[0..3], &START_END_GUARD[..]),
        (&runs[27..32], &MIDDLE_GUARD[..]),
        (&runs[56..59], &START_END_GUARD[..]),
    ]
    .iter()
    .all(|(widths, pattern)| {
        pattern_variance(widths, pattern, MAX_INDIVIDUAL_VARIANCE) <= MAX_AVG_VARIANCE
    });
    if !guards_ok {
        return Err(DecodeError::InvalidData("EAN-13 guard mismatch"));
    }

    // L-codes at 0..10, G-codes at 10..20
    let mut left_patterns = [[0u8; 4]; 20];
    for d in 0..10 {
        left_patterns[d] = EAN_L_PATTERNS[d];
        left_patterns[d + 10] = ean_g_pattern(d);
    }

    let mut digits = [0u8; 13];
    let mut parity = [false; 6];
    for i in 0..6 {
        let at = 3 + 4 * i;
        let index = match_digit(&runs[at..at + 4], &left_patterns)?;
        digits[i + 1] = (index % 10) as u8;
        parity[i] = index >= 10;
    }
    for i in 0..6 {
        let at = 32 + 4 * i;
        digits[i + 7] = match_digit(&runs[at..at + 4], &EAN_L_PATTERNS)? as u8;
    }

    digits[0] = EAN_FIRST_DIGIT_PARITY
        .iter()
        .position(|p| *p == parity)
        .ok_or(DecodeError::InvalidData("EAN-13 parity pattern"))? as u8;

    let expected = ean_check_digit(&digits);
    if expected != digits[12] {
        return Err(DecodeError::ChecksumMismatch {
            expected: expected as u32,
            found: digits[12] as u32,
        });
    }

    let text: Vec<u8> = digits.iter().map(|d| b'0' + d).collect();
    if digits[0] == 0 {
        Ok((BarcodeFormat::UpcA, text[1..].to_vec()))
    } else {
        Ok((BarcodeFormat::Ean13, text))
    }
}

fn match_digit(widths: &[f32], patterns: &[[u8; 4]]) -> Result<usize, DecodeError> {
    match best_pattern(widths, patterns, MAX_INDIVIDUAL_VARIANCE) {
        Some((index, variance)) if variance <= MAX_AVG_VARIANCE => Ok(index),
        _ => Err(DecodeError::InvalidData("unreadable EAN-13 digit")),
    }
}
