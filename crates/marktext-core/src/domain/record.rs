//! Manifest entries for saved images.

use serde::{Deserialize, Serialize};

/// One saved output image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRecord {
    /// Source image name.
    pub source: String,
    /// Path the rendered image was written to.
    pub output: String,
    /// Label text drawn onto the image.
    pub label: String,
    /// Prefix of the block the image belongs to.
    pub prefix: String,
    /// Whether the image was the block's selected image.
    pub selected: bool,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Time the image was saved (RFC 3339).
    pub timestamp: String,
}
