use crate::qrcode::QrSymbol;

use image::{ImageBuffer, Luma};

/*---- Utilities ----*/

/// Copies a finished symbol into an in-memory grayscale buffer, one pixel per module,
/// surrounded by `border` light modules.
///
/// # Example
///
/// ```
/// use qrstep::{helper::to_image_buffer, ErrorCorrectionLevel, QrSymbol, Version};
///
/// let qr = QrSymbol::encode("Hello, world!", ErrorCorrectionLevel::Low, Version::MIN, Version::MAX).unwrap();
/// let img = to_image_buffer(&qr, 4);
/// assert_eq!(img.dimensions(), (29, 29));
/// ```
pub fn to_image_buffer(qr: &QrSymbol, border: u32) -> ImageBuffer<Luma<u8>, Vec<u8>> {
    let border = border as i32;
    let size = (qr.size() + 2 * border) as u32;
    let mut img = ImageBuffer::new(size, size);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let qr_x = x as i32 - border;
        let qr_y = y as i32 - border;
        *pixel = if qr.get_module(qr_x, qr_y) {
            Luma([0u8]) // Black
        } else {
            Luma([255u8]) // White
        };
    }

    img
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorCorrectionLevel, Version};

    #[test]
    fn test_to_image_buffer() {
        let qr = QrSymbol::encode("Hello, world!", ErrorCorrectionLevel::Low, Version::MIN, Version::MAX).unwrap();
        let img = to_image_buffer(&qr, 4);

        // Version 1 with a border of 4 on each side is 29x29 pixels.
        assert_eq!(img.dimensions(), (29, 29));
        // Top left finder corner sits just inside the border.
        assert_eq!(img.get_pixel(4, 4), &Luma([0u8]));
        assert_eq!(img.get_pixel(0, 0), &Luma([255u8]));
    }
}
