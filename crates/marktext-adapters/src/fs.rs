//! Filesystem adapter for loading photos.

use anyhow::{Context, Result};
use marktext_core::{ImageSource, SourceImage};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Supported image extensions.
const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "gif"];

/// Default maximum batch size, matching the photo picker's selection limit.
pub const DEFAULT_BATCH_LIMIT: usize = 12;

/// Filesystem image source adapter.
///
/// Explicit files keep their argument order; directory contents are sorted
/// by path so batches are reproducible.
pub struct FsImageSource {
    paths: Vec<PathBuf>,
    recursive: bool,
    limit: Option<usize>,
}

impl FsImageSource {
    /// Creates a new filesystem image source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Files or directories to scan
    /// * `recursive` - Whether to recurse into subdirectories
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self {
            paths,
            recursive,
            limit: None,
        }
    }

    /// Caps the batch at `limit` images. `0` means no cap.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = if limit == 0 { None } else { Some(limit) };
        self
    }

    /// Collects all image files from the configured paths, applying the limit.
    #[must_use]
    pub fn collect_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for path in &self.paths {
            if path.is_file() {
                if is_supported_image(path) {
                    files.push(path.clone());
                } else {
                    warn!("Unsupported file type: {}", path.display());
                }
            } else if path.is_dir() {
                self.collect_from_dir(path, &mut files);
            } else {
                warn!("Path does not exist: {}", path.display());
            }
        }

        if let Some(limit) = self.limit {
            if files.len() > limit {
                warn!(
                    "Found {} images, only the first {limit} will be labeled",
                    files.len()
                );
                files.truncate(limit);
            }
        }

        files
    }

    fn collect_from_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };

        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_file() && is_supported_image(&path) {
                files.push(path);
            } else if path.is_dir() && self.recursive {
                self.collect_from_dir(&path, files);
            }
        }
    }
}

impl ImageSource for FsImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = Result<SourceImage>> + Send + '_> {
        let files = self.collect_files();
        debug!("Found {} image files", files.len());

        Box::new(files.into_iter().map(|path| load_image(&path)))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.collect_files().len())
    }
}

/// Checks if a path has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| RASTER_EXTENSIONS.contains(&e.as_str()))
}

/// Loads an image from the filesystem.
fn load_image(path: &Path) -> Result<SourceImage> {
    let image =
        image::open(path).with_context(|| format!("Failed to open image: {}", path.display()))?;

    Ok(SourceImage::new(path.to_string_lossy(), image))
}
