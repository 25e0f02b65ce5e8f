/// Borrowed grayscale input image
pub mod image;
/// Linear symbology width tables
pub mod linear;
/// Binary matrix
pub mod matrix;
/// 2D point
pub mod point;
/// QR version, EC level and mask types
pub mod qr_code;
/// Decoded symbol result types
pub mod symbol;

pub use image::ImageBuffer;
pub use linear::LinearFormat;
pub use matrix::BitMatrix;
pub use point::Point;
pub use qr_code::{ECLevel, MaskPattern, Version};
pub use symbol::{BarcodeFormat, DecodedSymbol, SymbolKind};
