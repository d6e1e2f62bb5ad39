//! Photo transcoding for cloud sync.
//!
//! Photos travel base64-encoded inside remote rows, so uploads compress
//! them to a bounded JPEG first and downloads decode the text form back
//! to raw bytes.

use std::io::Cursor;

use base64::prelude::{Engine as _, BASE64_STANDARD};
use image::{codecs::jpeg::JpegEncoder, GenericImageView};

use crate::{Error, Result};

/// Configuration for photo compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    /// Maximum output width/height in pixels.
    pub max_dimension: u32,
    /// JPEG quality.
    pub jpeg_quality: u8,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_dimension: 1600,
            jpeg_quality: 80,
        }
    }
}

/// Compress photo bytes to a size-bounded JPEG.
///
/// The image is resized to fit within `max_dimension` on both axes while
/// preserving aspect ratio. Images already within bounds are not upscaled.
/// Best-effort size reduction, not a guaranteed byte ceiling.
pub fn compress_photo(source_bytes: &[u8], options: &CompressOptions) -> Result<Vec<u8>> {
    if source_bytes.is_empty() {
        return Err(Error::Transcode(
            "Photo source bytes cannot be empty".to_string(),
        ));
    }
    if options.max_dimension == 0 {
        return Err(Error::Transcode(
            "Photo max dimension must be greater than zero".to_string(),
        ));
    }

    let source = image::load_from_memory(source_bytes)
        .map_err(|error| Error::Transcode(format!("Failed to decode source photo: {error}")))?;

    let (source_width, source_height) = source.dimensions();
    let resized = if source_width <= options.max_dimension && source_height <= options.max_dimension
    {
        source
    } else {
        source.thumbnail(options.max_dimension, options.max_dimension)
    };

    // JPEG has no alpha channel; flatten before encoding
    let rgb = resized.into_rgb8();

    let mut cursor = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut cursor, options.jpeg_quality);
    encoder
        .encode_image(&rgb)
        .map_err(|error| Error::Transcode(format!("Failed to encode JPEG photo: {error}")))?;

    Ok(cursor.into_inner())
}

/// Encode bytes as standard base64 text.
pub fn encode_base64(bytes: &[u8]) -> String {
    BASE64_STANDARD.encode(bytes)
}

/// Decode standard base64 text back to bytes.
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    Ok(BASE64_STANDARD.decode(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};

    fn source_png(width: u32, height: u32) -> Vec<u8> {
        let image = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_fn(width, height, |_x, _y| {
            Rgba([120, 90, 240, 255])
        });

        let mut cursor = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut cursor, ImageFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    #[test]
    fn compress_photo_bounds_dimensions_and_preserves_ratio() {
        let source = source_png(800, 600);
        let compressed = compress_photo(
            &source,
            &CompressOptions {
                max_dimension: 200,
                jpeg_quality: 85,
            },
        )
        .unwrap();

        let decoded = image::load_from_memory(&compressed).unwrap();
        assert_eq!(decoded.dimensions(), (200, 150));
    }

    #[test]
    fn compress_photo_does_not_upscale_small_images() {
        let source = source_png(80, 40);
        let compressed = compress_photo(&source, &CompressOptions::default()).unwrap();

        let decoded = image::load_from_memory(&compressed).unwrap();
        assert_eq!(decoded.dimensions(), (80, 40));
    }

    #[test]
    fn compress_photo_is_deterministic() {
        let source = source_png(300, 300);
        let options = CompressOptions::default();

        let first = compress_photo(&source, &options).unwrap();
        let second = compress_photo(&source, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn compress_photo_rejects_invalid_source() {
        let err = compress_photo(b"not-an-image", &CompressOptions::default()).unwrap_err();
        match err {
            Error::Transcode(message) => assert!(message.contains("decode")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn base64_roundtrip_is_byte_identical() {
        let empty: Vec<u8> = Vec::new();
        assert_eq!(decode_base64(&encode_base64(&empty)).unwrap(), empty);

        let single = vec![0xAB];
        assert_eq!(decode_base64(&encode_base64(&single)).unwrap(), single);

        // A few megabytes of arbitrary binary content
        let large: Vec<u8> = (0..3 * 1024 * 1024u32).map(|i| (i % 251) as u8).collect();
        assert_eq!(decode_base64(&encode_base64(&large)).unwrap(), large);
    }

    #[test]
    fn decode_base64_rejects_invalid_text() {
        assert!(decode_base64("not base64!!").is_err());
    }
}
