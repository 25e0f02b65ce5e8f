use super::{ECLevel, Point, Version};

/// Coarse class of a symbol, used for candidate routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// 1-D bar code read along a line
    Linear,
    /// Matrix code without version information blocks (dimension < 45)
    MatrixSmall,
    /// Matrix code carrying version information blocks (dimension >= 45)
    MatrixLarge,
}

/// Concrete symbology of a decoded result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarcodeFormat {
    /// QR Code Model 2
    QrCode,
    /// EAN-13
    Ean13,
    /// UPC-A (EAN-13 with a leading zero)
    UpcA,
    /// Code 128
    Code128,
}

impl BarcodeFormat {
    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            BarcodeFormat::QrCode => "QR_CODE",
            BarcodeFormat::Ean13 => "EAN_13",
            BarcodeFormat::UpcA => "UPC_A",
            BarcodeFormat::Code128 => "CODE_128",
        }
    }
}

impl std::fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A successfully decoded symbol
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSymbol {
    /// Symbol class
    pub kind: SymbolKind,
    /// Concrete symbology
    pub format: BarcodeFormat,
    /// Raw payload bytes
    pub payload: Vec<u8>,
    /// Error correction level (matrix codes only)
    pub error_correction: Option<ECLevel>,
    /// Codewords repaired by Reed-Solomon decoding
    pub corrected_bytes: usize,
    /// Bounding polygon in image coordinates, clockwise from the symbol's top-left
    pub polygon: [Point; 4],
    /// Confidence in [0, 1]
    pub confidence: f32,
    /// Version (matrix codes only)
    pub version: Option<Version>,
    /// Last ECI designator seen in the payload, if any
    pub eci: Option<u32>,
}

impl DecodedSymbol {
    /// Payload as text; invalid UTF-8 is replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    /// Mean of the polygon corners
    pub fn centroid(&self) -> Point {
        crate::utils::geometry::centroid(&self.polygon)
    }
}
