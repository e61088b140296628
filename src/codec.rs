//! Base64 image decoding

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageReader, RgbImage};
use std::io::Cursor;

use crate::error::FrameError;

/// Decode a Base64 payload into an RGB bitmap.
///
/// Any alpha channel is discarded during the RGB conversion. Fails on
/// malformed Base64 or bytes that no supported image format can parse.
pub fn decode_base64_image(payload: &str) -> Result<RgbImage, FrameError> {
    let bytes = STANDARD.decode(payload.trim())?;
    let img = ImageReader::new(Cursor::new(&bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .decode()?;
    Ok(img.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba, RgbaImage};

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_base64_round_trip() {
        let original = b"not an image, just bytes".to_vec();
        let encoded = STANDARD.encode(&original);
        assert_eq!(STANDARD.decode(&encoded).unwrap(), original);
    }

    #[test]
    fn test_decodes_png_and_strips_alpha() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 128]));
        let encoded = STANDARD.encode(png_bytes(&img));

        let decoded = decode_base64_image(&encoded).unwrap();
        assert_eq!(decoded.dimensions(), (4, 4));
        // Transparency is dropped, color channels survive unchanged
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_rejects_malformed_base64() {
        let err = decode_base64_image("!!!not-base64!!!").unwrap_err();
        assert!(matches!(err, FrameError::Base64(_)));
    }

    #[test]
    fn test_rejects_non_image_bytes() {
        let encoded = STANDARD.encode(b"definitely not a PNG");
        let err = decode_base64_image(&encoded).unwrap_err();
        assert!(matches!(err, FrameError::Image(_)));
    }
}
