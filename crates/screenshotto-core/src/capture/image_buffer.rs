//! Image buffer wrapper for screenshot data
//!
//! [`ImageBuffer`] wraps `image::DynamicImage` and adds the one composite
//! operation a full-desktop capture needs: pasting each monitor's image onto
//! a shared canvas.
//!
//! ```
//! use screenshotto_core::capture::ImageBuffer;
//!
//! let left = ImageBuffer::from_test_pattern(1920, 1080);
//! let right = ImageBuffer::from_test_pattern(1280, 1024);
//! let desktop = ImageBuffer::stitch(&[(0, 0, left), (1920, 0, right)]);
//! assert_eq!(desktop.dimensions(), (3200, 1080));
//! ```

use image::{GenericImageView, Rgba, RgbaImage};

/// Wrapper around `image::DynamicImage`
#[derive(Clone, Debug)]
pub struct ImageBuffer {
    inner: image::DynamicImage,
}

impl ImageBuffer {
    /// Creates a new ImageBuffer from a DynamicImage
    pub fn new(image: image::DynamicImage) -> Self {
        Self { inner: image }
    }

    /// Composes monitor images placed at virtual-desktop offsets
    ///
    /// Each tuple is `(x, y, image)` where `x`/`y` may be negative (a monitor
    /// left of or above the primary one). The canvas is the bounding box of
    /// all parts with its origin moved to the top-left-most monitor. Areas no
    /// monitor covers stay opaque black.
    ///
    /// A single part is returned unchanged. An empty slice yields a 1x1 image.
    pub fn stitch(parts: &[(i32, i32, ImageBuffer)]) -> Self {
        if let [(_, _, only)] = parts {
            return only.clone();
        }
        if parts.is_empty() {
            return Self::new(image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                1,
                1,
                Rgba([0, 0, 0, 255]),
            )));
        }

        let min_x = parts.iter().map(|(x, _, _)| i64::from(*x)).min().unwrap_or(0);
        let min_y = parts.iter().map(|(_, y, _)| i64::from(*y)).min().unwrap_or(0);
        let max_x = parts
            .iter()
            .map(|(x, _, img)| i64::from(*x) + i64::from(img.width()))
            .max()
            .unwrap_or(1);
        let max_y = parts
            .iter()
            .map(|(_, y, img)| i64::from(*y) + i64::from(img.height()))
            .max()
            .unwrap_or(1);

        let width = u32::try_from(max_x - min_x).unwrap_or(u32::MAX).max(1);
        let height = u32::try_from(max_y - min_y).unwrap_or(u32::MAX).max(1);

        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
        for (x, y, part) in parts {
            let rgba = part.to_rgba8();
            image::imageops::overlay(
                &mut canvas,
                &rgba,
                i64::from(*x) - min_x,
                i64::from(*y) - min_y,
            );
        }

        Self::new(image::DynamicImage::ImageRgba8(canvas))
    }

    /// Returns the dimensions of the image as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    /// Returns the image width in pixels
    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    /// Returns the image height in pixels
    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    /// Converts the image to RGBA8 format
    pub fn to_rgba8(&self) -> RgbaImage {
        self.inner.to_rgba8()
    }

    /// Returns a reference to the wrapped image
    pub fn inner(&self) -> &image::DynamicImage {
        &self.inner
    }

    /// Creates a test pattern image with the specified dimensions
    ///
    /// A vertical gradient from blue (top) to cyan (bottom).
    pub fn from_test_pattern(width: u32, height: u32) -> Self {
        let img = RgbaImage::from_fn(width, height, |_x, y| {
            let ratio = y as f32 / height.max(1) as f32;
            Rgba([0, (255.0 * ratio) as u8, 255, 255])
        });

        Self::new(image::DynamicImage::ImageRgba8(img))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> ImageBuffer {
        ImageBuffer::new(image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba(color),
        )))
    }

    #[test]
    fn test_stitch_single_part_is_identity() {
        let img = ImageBuffer::from_test_pattern(64, 32);
        let out = ImageBuffer::stitch(&[(100, 200, img.clone())]);
        assert_eq!(out.dimensions(), (64, 32));
    }

    #[test]
    fn test_stitch_side_by_side() {
        let red = solid(10, 10, [255, 0, 0, 255]);
        let green = solid(5, 20, [0, 255, 0, 255]);
        let out = ImageBuffer::stitch(&[(0, 0, red), (10, 0, green)]).to_rgba8();

        assert_eq!(out.dimensions(), (15, 20));
        assert_eq!(out.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(out.get_pixel(12, 15), &Rgba([0, 255, 0, 255]));
        // below the shorter left monitor
        assert_eq!(out.get_pixel(0, 15), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_stitch_negative_offsets_normalized() {
        let primary = solid(10, 10, [255, 0, 0, 255]);
        let left = solid(10, 10, [0, 0, 255, 255]);
        let out = ImageBuffer::stitch(&[(0, 0, primary), (-10, 5, left)]).to_rgba8();

        assert_eq!(out.dimensions(), (20, 15));
        assert_eq!(out.get_pixel(0, 5), &Rgba([0, 0, 255, 255]));
        assert_eq!(out.get_pixel(10, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_stitch_empty() {
        assert_eq!(ImageBuffer::stitch(&[]).dimensions(), (1, 1));
    }

    #[test]
    fn test_test_pattern_dimensions() {
        let img = ImageBuffer::from_test_pattern(1920, 1080);
        assert_eq!(img.dimensions(), (1920, 1080));
        assert_eq!(img.width(), 1920);
        assert_eq!(img.height(), 1080);
    }
}
