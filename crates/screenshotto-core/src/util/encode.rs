//! Image encoding for saved screenshots
//!
//! Converts an [`ImageBuffer`] into the bytes of the file format implied by
//! the configured filename.
//!
//! - **PNG**: lossless, default compression, adaptive filtering
//! - **JPEG**: quality 90, alpha channel removed before encoding
//! - **WebP**: lossless only in image crate v0.25
//! - **BMP**: uncompressed RGBA

use std::io::Cursor;

use image::{
    ExtendedColorType, ImageEncoder,
    codecs::{
        bmp::BmpEncoder,
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
        webp::WebPEncoder,
    },
};

use crate::{
    capture::ImageBuffer,
    error::{AppError, AppResult},
    model::ImageFormat,
};

/// JPEG quality used for `.jpg`/`.jpeg` filenames
pub const JPEG_QUALITY: u8 = 90;

/// Encodes `buffer` in `format`
///
/// # Errors
///
/// [`AppError::EncodingFailed`] when the encoder rejects the image, including
/// zero-sized images.
pub fn encode_image(buffer: &ImageBuffer, format: ImageFormat) -> AppResult<Vec<u8>> {
    let (width, height) = buffer.dimensions();
    if width == 0 || height == 0 {
        return Err(AppError::EncodingFailed {
            format: format.as_str().to_string(),
            reason: "Image dimensions must be > 0".to_string(),
        });
    }

    let mut output = Vec::new();
    let cursor = Cursor::new(&mut output);

    let result = match format {
        ImageFormat::Png => {
            let rgba = buffer.to_rgba8();
            PngEncoder::new_with_quality(cursor, CompressionType::Default, FilterType::Adaptive)
                .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
        }
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = buffer.inner().to_rgb8();
            JpegEncoder::new_with_quality(cursor, JPEG_QUALITY).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
        ImageFormat::Webp => {
            let rgba = buffer.to_rgba8();
            WebPEncoder::new_lossless(cursor).write_image(
                rgba.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )
        }
        ImageFormat::Bmp => {
            let rgba = buffer.to_rgba8();
            let mut cursor = cursor;
            BmpEncoder::new(&mut cursor).write_image(
                rgba.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            )
        }
    };

    result.map_err(|e| AppError::EncodingFailed {
        format: format.as_str().to_string(),
        reason: e.to_string(),
    })?;

    Ok(output)
}
