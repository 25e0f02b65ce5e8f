//! Synthetic symbol generator used by tests, benches and `scantool render`.
//!
//! QR symbols are produced in byte mode with full Reed-Solomon block
//! interleaving at any EC level and mask. Linear symbols are EAN-13 / UPC-A
//! and Code 128 (sets B and C).

use crate::decoder::format::{FormatInfo, format_positions};
use crate::decoder::function_mask::{FunctionMask, alignment_centres};
use crate::decoder::modes::Mode;
use crate::decoder::reed_solomon::ReedSolomonEncoder;
use crate::decoder::tables::ec_block_info;
use crate::decoder::unmask::unmask;
use crate::decoder::version::{VersionInfo, version_positions};
use crate::models::linear::{
    CODE128_PATTERNS, CODE128_START_B, CODE128_START_C, CODE128_STOP, EAN_FIRST_DIGIT_PARITY,
    EAN_L_PATTERNS, ean_check_digit, ean_g_pattern,
};
use crate::models::{BitMatrix, ECLevel, MaskPattern, Version};
use image::{GrayImage, Luma, imageops};
use thiserror::Error;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Reasons a payload cannot be rendered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// No version from the requested minimum up to 40 holds the payload
    #[error("payload of {0} bytes does not fit a QR symbol")]
    PayloadTooLong(usize),
    /// Minimum version outside 1..=40
    #[error("invalid QR version {0}")]
    InvalidVersion(u8),
    /// EAN/UPC input is not 12/13 (or 11/12) decimal digits with a valid check digit
    #[error("invalid EAN/UPC digits: {0}")]
    InvalidDigits(String),
    /// Byte outside the Code 128 set B range
    #[error("byte 0x{0:02X} cannot be encoded in Code 128 set B")]
    Unencodable(u8),
}

/// QR rendering parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrRenderOptions {
    /// Error correction level
    pub ec_level: ECLevel,
    /// Fixed mask, or `None` to pick the lowest-penalty one
    pub mask: Option<MaskPattern>,
    /// Smallest version to consider
    pub min_version: u8,
    /// Pixels per module
    pub scale: u32,
    /// Quiet zone width in modules
    pub quiet: u32,
}

impl Default for QrRenderOptions {
    fn default() -> Self {
        Self {
            ec_level: ECLevel::L,
            mask: None,
            min_version: 1,
            scale: 4,
            quiet: 4,
        }
    }
}

/// Linear rendering parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearRenderOptions {
    /// Pixels per module
    pub scale: u32,
    /// Bar height in pixels
    pub height: u32,
    /// Quiet zone on every side, in modules
    pub quiet: u32,
}

impl Default for LinearRenderOptions {
    fn default() -> Self {
        Self {
            scale: 2,
            height: 60,
            quiet: 10,
        }
    }
}

/// Module grid (true = dark) of a byte-mode QR symbol holding `payload`
pub fn qr_modules(payload: &[u8], options: &QrRenderOptions) -> Result<BitMatrix, RenderError> {
    if !(1..=40).contains(&options.min_version) {
        return Err(RenderError::InvalidVersion(options.min_version));
    }
    let version = (options.min_version..=40)
        .filter_map(Version::new)
        .find(|&v| fits(payload.len(), v, options.ec_level))
        .ok_or(RenderError::PayloadTooLong(payload.len()))?;

    let data = data_codewords(payload, version, options.ec_level);
    let codewords = interleave(&data, version, options.ec_level);
    let func = FunctionMask::new(version);
    let mut modules = BitMatrix::new(version.size(), version.size());
    for (i, (x, y)) in func.data_positions().into_iter().enumerate() {
        let bit = codewords
            .get(i / 8)
            .is_some_and(|byte| (byte >> (7 - i % 8)) & 1 == 1);
        modules.set(x, y, bit);
    }
    draw_function_patterns(&mut modules, version);

    let masked = |mask: MaskPattern| {
        let mut grid = modules.clone();
        unmask(&mut grid, mask, &func);
        draw_format(&mut grid, options.ec_level, mask);
        grid
    };
    let grid = match options.mask {
        Some(mask) => masked(mask),
        None => MaskPattern::ALL
            .iter()
            .map(|&m| masked(m))
            .min_by_key(penalty)
            .unwrap_or_else(|| masked(MaskPattern::Pattern0)),
    };
    log::trace!(
        "rendered {} bytes as version {} ({} modules)",
        payload.len(),
        version.number(),
        grid.width()
    );
    Ok(grid)
}

/// QR symbol as a grayscale image with quiet zone
pub fn render_qr(payload: &[u8], options: &QrRenderOptions) -> Result<GrayImage, RenderError> {
    let modules = qr_modules(payload, options)?;
    let (scale, quiet) = (options.scale.max(1), options.quiet);
    let side = (modules.width() as u32 + 2 * quiet) * scale;
    Ok(GrayImage::from_fn(side, side, |px, py| {
        let (mx, my) = (px / scale, py / scale);
        let inside = (quiet..quiet + modules.width() as u32).contains(&mx)
            && (quiet..quiet + modules.height() as u32).contains(&my);
        if inside && modules.get((mx - quiet) as usize, (my - quiet) as usize) {
            DARK
        } else {
            LIGHT
        }
    }))
}

fn fits(len: usize, version: Version, ec_level: ECLevel) -> bool {
    let bits = 4 + Mode::Byte.char_count_bits(version) + 8 * len;
    len < 1 << Mode::Byte.char_count_bits(version)
        && bits <= ec_block_info(version, ec_level).data_codewords() * 8
}

fn data_codewords(payload: &[u8], version: Version, ec_level: ECLevel) -> Vec<u8> {
    let capacity = ec_block_info(version, ec_level).data_codewords();
    let mut bits = BitWriter::default();
    bits.push(0b0100, 4);
    bits.push(payload.len() as u32, Mode::Byte.char_count_bits(version));
    for &byte in payload {
        bits.push(byte as u32, 8);
    }
    let terminator = (capacity * 8 - bits.len).min(4);
    bits.push(0, terminator);

    let mut bytes = bits.into_bytes();
    for pad in [0xEC, 0x11].into_iter().cycle() {
        if bytes.len() >= capacity {
            break;
        }
        bytes.push(pad);
    }
    bytes
}

/// Split into RS blocks (short blocks first), append EC and interleave
fn interleave(data: &[u8], version: Version, ec_level: ECLevel) -> Vec<u8> {
    let info = ec_block_info(version, ec_level);
    let short_len = info.short_block_data_len();
    let short_blocks = info.num_blocks - info.long_blocks();
    let encoder = ReedSolomonEncoder::new(info.ecc_per_block);

    let mut blocks = Vec::with_capacity(info.num_blocks);
    let mut offset = 0;
    for b in 0..info.num_blocks {
        let len = if b < short_blocks { short_len } else { short_len + 1 };
        let block = &data[offset..offset + len];
        blocks.push((block, encoder.ecc(block)));
        offset += len;
    }

    let mut out = Vec::with_capacity(info.total_codewords);
    for i in 0..=short_len {
        out.extend(blocks.iter().filter_map(|(d, _)| d.get(i)));
    }
    for i in 0..info.ecc_per_block {
        out.extend(blocks.iter().map(|(_, e)| e[i]));
    }
    out
}

fn draw_function_patterns(grid: &mut BitMatrix, version: Version) {
    let size = version.size();
    for (ox, oy) in [(0, 0), (size - 7, 0), (0, size - 7)] {
        for dy in 0..7 {
            for dx in 0..7 {
                let ring = (dx as i32 - 3).abs().max((dy as i32 - 3).abs());
                grid.set(ox + dx, oy + dy, ring != 2);
            }
        }
    }
    for i in 8..size - 8 {
        grid.set(i, 6, i % 2 == 0);
        grid.set(6, i, i % 2 == 0);
    }
    for (cx, cy) in alignment_centres(version) {
        for dy in -2i32..=2 {
            for dx in -2i32..=2 {
                let ring = dx.abs().max(dy.abs());
                grid.set((cx as i32 + dx) as usize, (cy as i32 + dy) as usize, ring != 1);
            }
        }
    }
    grid.set(8, size - 8, true);

    if version.has_version_info() {
        let word = VersionInfo::encode(version);
        for block in version_positions(size) {
            for (i, (x, y)) in block.into_iter().enumerate() {
                grid.set(x, y, (word >> i) & 1 == 1);
            }
        }
    }
}

fn draw_format(grid: &mut BitMatrix, ec_level: ECLevel, mask_pattern: MaskPattern) {
    let word = FormatInfo {
        ec_level,
        mask_pattern,
    }
    .encode();
    for copy in format_positions(grid.width()) {
        for (i, (x, y)) in copy.into_iter().enumerate() {
            grid.set(x, y, (word >> i) & 1 == 1);
        }
    }
}

/// Mask selection penalty: long runs, 2x2 blocks, finder look-alikes, dark balance
fn penalty(grid: &BitMatrix) -> u32 {
    let size = grid.width();
    let mut score = 0u32;

    let lines = |transpose: bool| {
        (0..size).map(move |a| {
            (0..size)
                .map(|b| if transpose { grid.get(a, b) } else { grid.get(b, a) })
                .collect::<Vec<bool>>()
        })
    };
    const FINDER_LIKE: [[bool; 11]; 2] = [
        [true, false, true, true, true, false, true, false, false, false, false],
        [false, false, false, false, true, false, true, true, true, false, true],
    ];
    for line in lines(false).chain(lines(true)) {
        let mut run = 1;
        for i in 1..=size {
            if i < size && line[i] == line[i - 1] {
                run += 1;
            } else {
                if run >= 5 {
                    score += 3 + (run - 5);
                }
                run = 1;
            }
        }
        score += line
            .windows(11)
            .filter(|w| FINDER_LIKE.iter().any(|p| p.as_slice() == *w))
            .count() as u32
            * 40;
    }

    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let c = grid.get(x, y);
            if grid.get(x + 1, y) == c && grid.get(x, y + 1) == c && grid.get(x + 1, y + 1) == c {
                score += 3;
            }
        }
    }

    let dark = grid.count_black() * 100 / (size * size);
    score += (dark.abs_diff(50) / 5) as u32 * 10;
    score
}

#[derive(Default)]
struct BitWriter {
    bytes: Vec<u8>,
    len: usize,
}

impl BitWriter {
    fn push(&mut self, value: u32, count: usize) {
        for i in (0..count).rev() {
            if self.len % 8 == 0 {
                self.bytes.push(0);
            }
            if (value >> i) & 1 == 1
                && let Some(last) = self.bytes.last_mut()
            {
                *last |= 0x80 >> (self.len % 8);
            }
            self.len += 1;
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

fn parse_digits(text: &str) -> Option<Vec<u8>> {
    text.bytes()
        .map(|b| b.is_ascii_digit().then(|| b - b'0'))
        .collect()
}

/// Bar/space widths of an EAN-13 symbol, starting with the left guard bar
///
/// Accepts twelve digits (check digit appended) or thirteen (check digit verified).
pub fn ean13_widths(digits: &str) -> Result<Vec<u8>, RenderError> {
    let invalid = || RenderError::InvalidDigits(digits.to_string());
    let mut d = parse_digits(digits).ok_or_else(invalid)?;
    match d.len() {
        12 => d.push(ean_check_digit(&d)),
        13 if d[12] == ean_check_digit(&d) => {}
        _ => return Err(invalid()),
    }

    let mut widths = vec![1, 1, 1];
    let parity = EAN_FIRST_DIGIT_PARITY[d[0] as usize];
    for (i, &digit) in d[1..7].iter().enumerate() {
        let pattern = if parity[i] {
            ean_g_pattern(digit as usize)
        } else {
            EAN_L_PATTERNS[digit as usize]
        };
        widths.extend(pattern);
    }
    widths.extend([1, 1, 1, 1, 1]);
    for &digit in &d[7..] {
        widths.extend(EAN_L_PATTERNS[digit as usize]);
    }
    widths.extend([1, 1, 1]);
    Ok(widths)
}

/// Bar/space widths of a UPC-A symbol (eleven or twelve digits)
pub fn upca_widths(digits: &str) -> Result<Vec<u8>, RenderError> {
    if !(11..=12).contains(&digits.len()) {
        return Err(RenderError::InvalidDigits(digits.to_string()));
    }
    ean13_widths(&format!("0{digits}"))
}

/// Bar/space widths of a Code 128 symbol, stop pattern included
///
/// All-digit payloads of even length use set C, everything else set B.
pub fn code128_widths(payload: &[u8]) -> Result<Vec<u8>, RenderError> {
    let numeric = !payload.is_empty() && payload.len() % 2 == 0 && payload.iter().all(u8::is_ascii_digit);
    let mut values = Vec::with_capacity(payload.len() + 2);
    if numeric {
        values.push(CODE128_START_C);
        values.extend(payload.chunks(2).map(|p| (p[0] - b'0') * 10 + (p[1] - b'0')));
    } else {
        values.push(CODE128_START_B);
        for &byte in payload {
            if !(32..128).contains(&byte) {
                return Err(RenderError::Unencodable(byte));
            }
            values.push(byte - 32);
        }
    }
    let check = values
        .iter()
        .enumerate()
        .map(|(i, &v)| v as u32 * (i as u32).max(1))
        .sum::<u32>()
        % 103;
    values.push(check as u8);

    let mut widths: Vec<u8> = values
        .iter()
        .flat_map(|&v| CODE128_PATTERNS[v as usize])
        .collect();
    widths.extend(CODE128_STOP);
    Ok(widths)
}

/// Linear symbol image from widths that start with a bar
pub fn render_linear(widths: &[u8], options: &LinearRenderOptions) -> GrayImage {
    let scale = options.scale.max(1);
    let mut modules = Vec::new();
    for (i, &w) in widths.iter().enumerate() {
        modules.extend(std::iter::repeat_n(i % 2 == 0, w as usize));
    }
    let quiet = options.quiet * scale;
    let width = modules.len() as u32 * scale + 2 * quiet;
    let height = options.height + 2 * quiet;
    GrayImage::from_fn(width, height, |px, py| {
        let bar = px
            .checked_sub(quiet)
            .and_then(|x| modules.get((x / scale) as usize))
            .copied()
            .unwrap_or(false);
        if bar && (quiet..quiet + options.height).contains(&py) {
            DARK
        } else {
            LIGHT
        }
    })
}

/// Rotate by `quarter_turns` x 90 degrees clockwise
pub fn rotate(image: &GrayImage, quarter_turns: u8) -> GrayImage {
    match quarter_turns % 4 {
        1 => imageops::rotate90(image),
        2 => imageops::rotate180(image),
        3 => imageops::rotate270(image),
        _ => image.clone(),
    }
}

/// Rotate clockwise by `degrees` about the centre, nearest-neighbour
///
/// The canvas grows to the rotated bounding box; uncovered pixels are light.
pub fn rotate_degrees(image: &GrayImage, degrees: f32) -> GrayImage {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (w, h) = (image.width() as f32, image.height() as f32);
    let out_w = (w * cos.abs() + h * sin.abs()).round().max(1.0) as u32;
    let out_h = (w * sin.abs() + h * cos.abs()).round().max(1.0) as u32;
    let (cx, cy) = (w / 2.0, h / 2.0);
    let (ox, oy) = (out_w as f32 / 2.0, out_h as f32 / 2.0);
    GrayImage::from_fn(out_w, out_h, |px, py| {
        let dx = px as f32 + 0.5 - ox;
        let dy = py as f32 + 0.5 - oy;
        let sx = cos * dx + sin * dy + cx;
        let sy = cos * dy - sin * dx + cy;
        if sx >= 0.0 && sy >= 0.0 && sx < w && sy < h {
            *image.get_pixel(sx as u32, sy as u32)
        } else {
            LIGHT
        }
    })
}

/// Light canvas with each `(image, x, y)` pasted at its offset
pub fn compose(width: u32, height: u32, parts: &[(&GrayImage, i64, i64)]) -> GrayImage {
    let mut canvas = GrayImage::from_pixel(width, height, LIGHT);
    for &(part, x, y) in parts {
        imageops::replace(&mut canvas, part, x, y);
    }
    canvas
}
