//! Output port for persisting rendered images.

use std::path::PathBuf;

use crate::domain::RenderedImage;

/// Port for saving rendered images as new assets.
pub trait ImageSink: Send + Sync {
    /// Persists one rendered image and returns where it was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be encoded or written.
    fn save(&self, image: &RenderedImage) -> anyhow::Result<PathBuf>;
}
