use crate::error::DecodeError;

/// Borrowed 8-bit grayscale image
///
/// Geometry is validated on construction: `width, height >= 1`,
/// `stride >= width` and `samples.len() >= stride * height`. Every accessor can
/// therefore index without further checks.
#[derive(Debug, Clone, Copy)]
pub struct ImageBuffer<'a> {
    samples: &'a [u8],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a> ImageBuffer<'a> {
    /// Wrap `samples` with an explicit row stride
    pub fn new(
        samples: &'a [u8],
        width: usize,
        height: usize,
        stride: usize,
    ) -> Result<Self, DecodeError> {
        if width == 0 || height == 0 {
            return Err(DecodeError::InvalidInput(format!(
                "image dimensions must be non-zero, got {width}x{height}"
            )));
        }
        if stride < width {
            return Err(DecodeError::InvalidInput(format!(
                "stride {stride} is smaller than width {width}"
            )));
        }
        let needed = stride.checked_mul(height).ok_or_else(|| {
            DecodeError::InvalidInput(format!("stride {stride} x height {height} overflows"))
        })?;
        if samples.len() < needed {
            return Err(DecodeError::InvalidInput(format!(
                "sample buffer holds {} bytes, {stride}x{height} needs {needed}",
                samples.len()
            )));
        }
        Ok(Self {
            samples,
            width,
            height,
            stride,
        })
    }

    /// Wrap tightly packed samples (`stride == width`)
    pub fn packed(samples: &'a [u8], width: usize, height: usize) -> Result<Self, DecodeError> {
        Self::new(samples, width, height, width)
    }

    /// Borrow an `image` crate luma buffer
    pub fn from_gray(image: &'a image::GrayImage) -> Result<Self, DecodeError> {
        let (width, height) = image.dimensions();
        Self::packed(image.as_raw(), width as usize, height as usize)
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Distance in bytes between the starts of consecutive rows
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Luminance at (x, y); caller guarantees bounds
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.samples[y * self.stride + x]
    }

    /// The `width` samples of row `y`
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.stride;
        &self.samples[start..start + self.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_geometry() {
        let samples = vec![0u8; 100];
        assert!(ImageBuffer::new(&samples, 0, 10, 10).is_err());
        assert!(ImageBuffer::new(&samples, 10, 10, 9).is_err());
        assert!(ImageBuffer::new(&samples, 10, 11, 10).is_err());
        assert!(ImageBuffer::new(&samples, 10, 10, usize::MAX).is_err());
    }

    #[test]
    fn test_stride_addressing() {
        // 3x2 image stored with a stride of 4 (one padding byte per row)
        let samples = [1, 2, 3, 99, 4, 5, 6, 99];
        let image = ImageBuffer::new(&samples, 3, 2, 4).unwrap();
        assert_eq!(image.get(0, 1), 4);
        assert_eq!(image.row(1), &[4, 5, 6]);
        assert_eq!(image.stride(), 4);
    }

    #[test]
    fn test_from_gray() {
        let gray = image::GrayImage::from_pixel(4, 3, image::Luma([200]));
        let image = ImageBuffer::from_gray(&gray).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
        assert_eq!(image.get(3, 2), 200);
    }
}
