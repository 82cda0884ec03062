//! Upload decoding
//!
//! Turns raw upload bytes into a 3-channel RGB pixel grid. Alpha is dropped,
//! grayscale and palette images are expanded.

use image::RgbImage;

use super::error::DomainError;

/// Decode an encoded image (PNG, JPEG, GIF, ...) into RGB pixels
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, DomainError> {
    if bytes.is_empty() {
        return Err(DomainError::decode("upload is empty"));
    }

    let image = image::load_from_memory(bytes)
        .map_err(|e| DomainError::decode(format!("cannot identify image file: {}", e)))?;

    Ok(image.to_rgb8())
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_decode_rgb_png() {
        let image = decode_rgb(&solid_rgb_png(7, 5, [10, 20, 30])).unwrap();

        assert_eq!(image.dimensions(), (7, 5));
        assert_eq!(image.get_pixel(3, 2).0, [10, 20, 30]);
    }

    #[test]
    fn test_decode_drops_alpha() {
        let image = decode_rgb(&solid_rgba_png(4, 4, [200, 100, 50, 0])).unwrap();

        assert_eq!(image.get_pixel(0, 0).0, [200, 100, 50]);
    }

    #[test]
    fn test_decode_expands_grayscale() {
        let image = decode_rgb(&gray_png(3, 3, 77)).unwrap();

        assert_eq!(image.get_pixel(1, 1).0, [77, 77, 77]);
    }

    #[test]
    fn test_decode_palette_gif() {
        let image = decode_rgb(&palette_gif(6, 6, [255, 0, 0])).unwrap();
        let pixel = image.get_pixel(2, 2).0;

        assert_eq!(image.dimensions(), (6, 6));
        assert!(pixel[0] > 200 && pixel[1] < 50 && pixel[2] < 50);
    }

    #[test]
    fn test_decode_jpeg() {
        let image = decode_rgb(&rgb_jpeg(16, 16, [0, 0, 255])).unwrap();

        assert_eq!(image.dimensions(), (16, 16));
    }

    #[test]
    fn test_decode_empty_upload() {
        let err = decode_rgb(&[]).unwrap_err();
        assert!(matches!(err, DomainError::Decode { .. }));
    }

    #[test]
    fn test_decode_plain_text() {
        let err = decode_rgb(b"this is not an image").unwrap_err();
        assert!(matches!(err, DomainError::Decode { .. }));
    }

    #[test]
    fn test_decode_truncated_png() {
        let png = solid_rgb_png(32, 32, [1, 2, 3]);
        let err = decode_rgb(&png[..png.len() / 2]).unwrap_err();

        assert!(matches!(err, DomainError::Decode { .. }));
    }
}
