//! De-duplication and reading-order sort of decoded symbols.

use crate::models::DecodedSymbol;
use crate::utils::geometry::polygon_iou;

/// Merge duplicate detections and sort the survivors top-to-bottom, then left-to-right
///
/// Two results are duplicates when format and payload match and their
/// polygons overlap with IoU above `iou_threshold`; the more confident one is
/// kept.
pub fn aggregate(symbols: Vec<DecodedSymbol>, iou_threshold: f32) -> Vec<DecodedSymbol> {
    let mut kept: Vec<DecodedSymbol> = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let duplicate = kept.iter_mut().find(|k| {
            k.format == symbol.format
                && k.payload == symbol.payload
                && polygon_iou(&k.polygon, &symbol.polygon) > iou_threshold
        });
        match duplicate {
            Some(existing) => {
                if symbol.confidence > existing.confidence {
                    *existing = symbol;
                }
            }
            None => kept.push(symbol),
        }
    }

    kept.sort_by(|a, b| {
        let (ca, cb) = (a.centroid(), b.centroid());
        ca.y.total_cmp(&cb.y).then(ca.x.total_cmp(&cb.x))
    });
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BarcodeFormat, Point, SymbolKind};

    fn symbol(payload: &[u8], x: f32, y: f32, confidence: f32) -> DecodedSymbol {
        DecodedSymbol {
            kind: SymbolKind::Linear,
            format: BarcodeFormat::Code128,
            payload: payload.to_vec(),
            error_correction: None,
            corrected_bytes: 0,
            polygon: [
                Point::new(x, y),
                Point::new(x + 100.0, y),
                Point::new(x + 100.0, y + 40.0),
                Point::new(x, y + 40.0),
            ],
            confidence,
            version: None,
            eci: None,
        }
    }

    #[test]
    fn test_overlapping_duplicates_merge() {
        let merged = aggregate(
            vec![symbol(b"A", 0.0, 0.0, 0.6), symbol(b"A", 5.0, 2.0, 0.9)],
            0.5,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].confidence, 0.9);
    }

    #[test]
    fn test_distinct_payloads_and_distant_copies_survive() {
        let merged = aggregate(
            vec![
                symbol(b"A", 0.0, 0.0, 0.6),
                symbol(b"B", 0.0, 0.0, 0.6),
                symbol(b"A", 300.0, 0.0, 0.6),
            ],
            0.5,
        );
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_reading_order() {
        let merged = aggregate(
            vec![
                symbol(b"bottom", 0.0, 200.0, 1.0),
                symbol(b"right", 300.0, 0.0, 1.0),
                symbol(b"left", 0.0, 0.0, 1.0),
            ],
            0.5,
        );
        let order: Vec<&[u8]> = merged.iter().map(|s| s.payload.as_slice()).collect();
        assert_eq!(order, vec![&b"left"[..], b"right", b"bottom"]);
    }
}
