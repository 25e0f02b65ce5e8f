/// Code 128 decoding from normalised run widths
use crate::error::DecodeError;
use crate::models::linear::{
    CODE128_PATTERNS, CODE128_START_A, CODE128_START_B, CODE128_START_C, CODE128_STOP,
};
use crate::utils::runs::{best_pattern, pattern_variance};

const MAX_AVG_VARIANCE: f32 = 0.25;
const MAX_INDIVIDUAL_VARIANCE: f32 = 0.7;

const GROUP_SEPARATOR: u8 = 0x1D;

const FNC1: u8 = 102;
const CODE_A: u8 = 101;
const CODE_B: u8 = 100;
const CODE_C: u8 = 99;
const SHIFT: u8 = 98;
const FNC2: u8 = 97;
const FNC3: u8 = 96;
/// FNC4 shares its value with the CODE switch to its own set
const FNC4_IN_A: u8 = CODE_A;
const FNC4_IN_B: u8 = CODE_B;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    A,
    B,
    C,
}

/// Decode runs (bar first, stop pattern last) into payload bytes
///
/// FNC1 becomes a GS separator except in the first data position, where it
/// only flags GS1 data and is dropped. FNC4 lifts characters into 128..=255.
pub fn decode(runs: &[f32]) -> Result<Vec<u8>, DecodeError> {
    if runs.len() < 13 || (runs.len() - 7) % 6 != 0 {
        return Err(DecodeError::InvalidData("Code 128 run count"));
    }
    let (symbols, stop) = runs.split_at(runs.len() - 7);
    if pattern_variance(stop, &CODE128_STOP, MAX_INDIVIDUAL_VARIANCE) > MAX_AVG_VARIANCE {
        return Err(DecodeError::InvalidData("Code 128 stop pattern"));
    }

    let values = symbols
        .chunks_exact(6)
        .map(|widths| match best_pattern(widths, &CODE128_PATTERNS, MAX_INDIVIDUAL_VARIANCE) {
            Some((value, variance)) if variance <= MAX_AVG_VARIANCE => Ok(value as u8),
            _ => Err(DecodeError::InvalidData("unreadable Code 128 symbol")),
        })
        .collect::<Result<Vec<u8>, _>>()?;

    let (&start, rest) = values
        .split_first()
        .ok_or(DecodeError::InvalidData("empty Code 128 symbol"))?;
    let (&check, data) = rest
        .split_last()
        .ok_or(DecodeError::InvalidData("missing Code 128 check symbol"))?;
    let mut set = match start {
        CODE128_START_A => CodeSet::A,
        CODE128_START_B => CodeSet::B,
        CODE128_START_C => CodeSet::C,
        _ => return Err(DecodeError::InvalidData("missing Code 128 start")),
    };

    let expected = data
        .iter()
        .enumerate()
        .fold(start as u32, |sum, (i, &v)| sum + (i as u32 + 1) * v as u32)
        % 103;
    if expected != check as u32 {
        return Err(DecodeError::ChecksumMismatch {
            expected,
            found: check as u32,
        });
    }

    let mut out = Vec::with_capacity(data.len() * 2);
    let mut shifted = false;
    let mut fnc4_next = false;
    let mut fnc4_latched = false;
    let mut last_was_fnc4 = false;

    for (i, &value) in data.iter().enumerate() {
        if value >= CODE128_START_A {
            return Err(DecodeError::InvalidData("start code inside Code 128 data"));
        }
        let active = if shifted {
            match set {
                CodeSet::A => CodeSet::B,
                CodeSet::B => CodeSet::A,
                CodeSet::C => CodeSet::C,
            }
        } else {
            set
        };
        shifted = false;
        let fnc4_here = last_was_fnc4;
        last_was_fnc4 = false;

        if value == FNC1 {
            if i > 0 {
                out.push(GROUP_SEPARATOR);
            }
            continue;
        }

        match active {
            CodeSet::C => match value {
                0..=99 => {
                    out.push(b'0' + value / 10);
                    out.push(b'0' + value % 10);
                }
                CODE_B => set = CodeSet::B,
                CODE_A => set = CodeSet::A,
                _ => {}
            },
            CodeSet::A | CodeSet::B => {
                let character = match (active, value) {
                    (_, 0..=63) => Some(b' ' + value),
                    (CodeSet::A, 64..=95) => Some(value - 64),
                    (CodeSet::B, 64..=95) => Some(b' ' + value),
                    _ => None,
                };
                if let Some(c) = character {
                    let high = fnc4_latched != fnc4_next;
                    out.push(if high { c + 128 } else { c });
                    fnc4_next = false;
                    continue;
                }
                match (active, value) {
                    (_, FNC2 | FNC3) => {}
                    (_, SHIFT) => shifted = true,
                    (_, CODE_C) => set = CodeSet::C,
                    (CodeSet::A, FNC4_IN_A) | (CodeSet::B, FNC4_IN_B) => {
                        if fnc4_here {
                            // Two FNC4 in a row toggle extended mode
                            fnc4_latched = !fnc4_latched;
                            fnc4_next = false;
                        } else {
                            fnc4_next = true;
                            last_was_fnc4 = true;
                        }
                    }
                    (CodeSet::A, CODE_B) => set = CodeSet::B,
                    (CodeSet::B, CODE_A) => set = CodeSet::A,
                    _ => {}
                }
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ideal runs for start + data + computed check + stop
    fn runs_for(values: &[u8]) -> Vec<f32> {
        let check = values
            .iter()
            .enumerate()
            .fold(0u32, |sum, (i, &v)| sum + i.max(1) as u32 * v as u32)
            % 103;
        let mut runs: Vec<f32> = Vec::new();
        for &v in values.iter().chain([check as u8].iter()) {
            runs.extend(CODE128_PATTERNS[v as usize].iter().map(|&w| w as f32));
        }
        runs.extend(CODE128_STOP.iter().map(|&w| w as f32));
        runs
    }

    #[test]
    fn test_set_b_text() {
        // "Hi": H = 40, i = 73
        let runs = runs_for(&[CODE128_START_B, 40, 73]);
        assert_eq!(decode(&runs).unwrap(), b"Hi");
    }

    #[test]
    fn test_set_c_digits_and_switch() {
        // "123456" then CODE B "A"
        let runs = runs_for(&[CODE128_START_C, 12, 34, 56, CODE_B, 33]);
        assert_eq!(decode(&runs).unwrap(), b"123456A");
    }

    #[test]
    fn test_fnc1_positions() {
        // Leading FNC1 is dropped, later ones become GS
        let runs = runs_for(&[CODE128_START_C, FNC1, 1, 23, FNC1, 45]);
        assert_eq!(decode(&runs).unwrap(), b"0123\x1D45");
    }

    #[test]
    fn test_shift_and_control_characters() {
        // Set A: TAB (73 -> 0x09), SHIFT to B for 'a' (65), then 'A' (33)
        let runs = runs_for(&[CODE128_START_A, 73, SHIFT, 65, 33]);
        assert_eq!(decode(&runs).unwrap(), b"\taA");
    }

    #[test]
    fn test_fnc4_extends_one_character() {
        // FNC4 'A' -> 0xC1, then plain 'B'
        let runs = runs_for(&[CODE128_START_B, FNC4_IN_B, 33, 34]);
        assert_eq!(decode(&runs).unwrap(), vec![0xC1, b'B']);
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut runs = runs_for(&[CODE128_START_B, 40, 73]);
        // Replace the check symbol (84) with 85
        let at = 3 * 6;
        runs.splice(at..at + 6, CODE128_PATTERNS[85].iter().map(|&w| w as f32));
        assert_eq!(
            decode(&runs),
            Err(DecodeError::ChecksumMismatch {
                expected: 84,
                found: 85
            })
        );
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(decode(&[1.0; 12]).is_err());
        let mut runs = runs_for(&[CODE128_START_B, 40]);
        runs.reverse();
        assert!(decode(&runs).is_err());
    }
}
