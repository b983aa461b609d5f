//! Source and rendered image types.

use image::{DynamicImage, GenericImageView};

/// A photo to be labeled. The renderer only reads it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Display name, usually the file path.
    pub name: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Decoded image data.
    pub image: DynamicImage,
}

impl SourceImage {
    /// Wraps a decoded image, reading its dimensions.
    #[must_use]
    pub fn new(name: impl Into<String>, image: DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            name: name.into(),
            width,
            height,
            image,
        }
    }

    /// Path-like extension of the source name, lowercased.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
    }
}

/// A source image with its label composited on top.
///
/// Always the same pixel size as the source it was made from.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    /// Index of the source image in the input batch.
    pub source_index: usize,
    /// Index of the prefix block this image belongs to.
    pub block_index: usize,
    /// Name of the source image.
    pub source_name: String,
    /// Prefix used for this block.
    pub prefix: String,
    /// Full label text drawn onto the image.
    pub label: String,
    /// Whether this was the selected image of its block.
    pub selected: bool,
    /// Composited image data.
    pub image: DynamicImage,
}

impl RenderedImage {
    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
