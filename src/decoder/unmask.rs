/// Unmask QR code by applying the mask pattern
use crate::decoder::function_mask::FunctionMask;
use crate::models::{BitMatrix, MaskPattern};

/// XOR the data modules of `matrix` with `mask_pattern`; function modules are untouched.
///
/// The operation is an involution, so the same call also applies a mask.
pub fn unmask(matrix: &mut BitMatrix, mask_pattern: MaskPattern, func: &FunctionMask) {
    let size = func.size();
    for y in 0..size {
        for x in 0..size {
            if !func.is_function(x, y) && mask_pattern.is_masked(y, x) {
                matrix.toggle(x, y);
            }
        }
    }
}
