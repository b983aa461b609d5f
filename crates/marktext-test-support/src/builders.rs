//! Synthetic image builders for testing.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use marktext_core::domain::SourceImage;

/// Builder for creating synthetic source photos.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    /// Creates a uniform gray image.
    #[must_use]
    pub fn uniform_gray(width: u32, height: u32, value: u8) -> SourceImage {
        let img = GrayImage::from_fn(width, height, |_, _| Luma([value]));
        SourceImage::new("synthetic://uniform_gray", DynamicImage::ImageLuma8(img))
    }

    /// Creates a uniform RGB image.
    #[must_use]
    pub fn rgb_uniform(width: u32, height: u32, r: u8, g: u8, b: u8) -> SourceImage {
        let img = RgbImage::from_fn(width, height, |_, _| Rgb([r, g, b]));
        SourceImage::new("synthetic://rgb_uniform", DynamicImage::ImageRgb8(img))
    }

    /// Creates a fully transparent RGBA image.
    #[must_use]
    pub fn transparent(width: u32, height: u32) -> SourceImage {
        let img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        SourceImage::new("synthetic://transparent", DynamicImage::ImageRgba8(img))
    }

    /// Creates a high-contrast checkerboard.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32, cell_size: u32) -> SourceImage {
        let cell = cell_size.max(1);
        let img = GrayImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        SourceImage::new("synthetic://checkerboard", DynamicImage::ImageLuma8(img))
    }

    /// Creates a photo-like image and gives it a file name.
    ///
    /// Useful when the name's extension matters, e.g. for output sinks.
    #[must_use]
    pub fn named(name: &str, width: u32, height: u32) -> SourceImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            let v = ((x + y) % 256) as u8;
            Rgb([v, 128, 255 - v])
        });
        SourceImage::new(name, DynamicImage::ImageRgb8(img))
    }

    /// Creates `count` gray images of the same size, named `img0.png`, `img1.png`, ...
    #[must_use]
    pub fn batch(count: usize, width: u32, height: u32) -> Vec<SourceImage> {
        (0..count)
            .map(|i| {
                let mut img = Self::uniform_gray(width, height, 128);
                img.name = format!("img{i}.png");
                img
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_gray() {
        let img = SyntheticImageBuilder::uniform_gray(50, 40, 100);
        assert_eq!(img.width, 50);
        assert_eq!(img.height, 40);
        assert!(img.image.to_luma8().pixels().all(|p| p.0[0] == 100));
    }

    #[test]
    fn test_checkerboard_pattern() {
        let img = SyntheticImageBuilder::checkerboard(16, 16, 8);
        let luma = img.image.to_luma8();
        assert_eq!(luma.get_pixel(0, 0).0[0], 255);
        assert_eq!(luma.get_pixel(8, 0).0[0], 0);
    }

    #[test]
    fn test_rgb_uniform() {
        let img = SyntheticImageBuilder::rgb_uniform(10, 10, 255, 0, 128);
        let pixel = *img.image.to_rgb8().get_pixel(5, 5);
        assert_eq!(pixel.0, [255, 0, 128]);
    }

    #[test]
    fn test_named_and_batch() {
        let img = SyntheticImageBuilder::named("photo.jpg", 4, 3);
        assert_eq!(img.extension().as_deref(), Some("jpg"));

        let batch = SyntheticImageBuilder::batch(3, 8, 8);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[2].name, "img2.png");
    }
}
