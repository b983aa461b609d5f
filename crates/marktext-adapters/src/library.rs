//! Directory-backed image library for saving rendered photos.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat};
use marktext_core::{ImageSink, RenderedImage};
use tracing::debug;

/// Extensions written as-is; anything else falls back to PNG.
const WRITABLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "gif"];

/// Longest label fragment kept in a file name, in characters.
const MAX_LABEL_CHARS: usize = 64;

/// Saves rendered images as new files in an output directory.
///
/// Files are named `{seq:03}-{label}.{ext}`, where `ext` follows the source
/// file and `seq` continues after the highest sequence already present in
/// the directory, starting at 1. Existing files are never overwritten.
pub struct FsImageLibrary {
    dir: PathBuf,
    next: AtomicUsize,
}

impl FsImageLibrary {
    /// Opens (creating if needed) the output directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        let next = highest_sequence(&dir)? + 1;
        debug!("Output {} continues at {next}", dir.display());
        Ok(Self {
            dir,
            next: AtomicUsize::new(next),
        })
    }

    /// The output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for the `seq`-th saved image.
    #[must_use]
    pub fn file_name(seq: usize, image: &RenderedImage) -> String {
        let ext = output_extension(&image.source_name);
        format!("{seq:03}-{}.{ext}", sanitize_label(&image.label))
    }
}

impl ImageSink for FsImageLibrary {
    fn save(&self, image: &RenderedImage) -> Result<PathBuf> {
        let ext = output_extension(&image.source_name);
        let format = ImageFormat::from_extension(&ext)
            .with_context(|| format!("Unsupported output format: {ext}"))?;

        // JPEG has no alpha channel
        let encoded: DynamicImage = if format == ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(image.image.to_rgb8())
        } else {
            image.image.clone()
        };

        let (path, file) = self.create_next(image)?;
        let mut writer = BufWriter::new(file);
        let written = encoded
            .write_to(&mut writer, format)
            .map_err(anyhow::Error::from)
            .and_then(|()| writer.flush().map_err(anyhow::Error::from));

        if let Err(e) = written {
            drop(writer);
            if let Err(remove) = std::fs::remove_file(&path) {
                debug!("Could not remove partial {}: {remove}", path.display());
            }
            return Err(e).with_context(|| format!("Failed to write {}", path.display()));
        }

        debug!("Saved {}", path.display());
        Ok(path)
    }
}

impl FsImageLibrary {
    /// Claims the next free file name, skipping names taken by other writers.
    fn create_next(&self, image: &RenderedImage) -> Result<(PathBuf, File)> {
        loop {
            let seq = self.next.fetch_add(1, Ordering::Relaxed);
            let path = self.dir.join(Self::file_name(seq, image));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("{} exists, trying next sequence", path.display());
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to create {}", path.display()))
                }
            }
        }
    }
}

/// Highest `NNN-` sequence prefix among the files in `dir`, or 0.
fn highest_sequence(dir: &Path) -> Result<usize> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read output directory {}", dir.display()))?;

    Ok(entries
        .flatten()
        .filter_map(|e| sequence_of(&e.file_name().to_string_lossy()))
        .max()
        .unwrap_or(0))
}

/// Parses the sequence prefix of a file name written by this library.
fn sequence_of(file_name: &str) -> Option<usize> {
    let (seq, _) = file_name.split_once('-')?;
    if seq.is_empty() || !seq.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    seq.parse().ok()
}

/// Output extension for a source name: its own when writable, else `png`.
fn output_extension(source_name: &str) -> String {
    Path::new(source_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .filter(|e| WRITABLE_EXTENSIONS.contains(&e.as_str()))
        .unwrap_or_else(|| "png".to_string())
}

/// Makes a label safe to use inside a file name.
fn sanitize_label(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(MAX_LABEL_CHARS)
        .collect();

    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "label".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("(班级)-(姓名)1"), "(班级)-(姓名)1");
        assert_eq!(sanitize_label("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_label("  "), "label");
        assert_eq!(sanitize_label("..."), "label");
        assert_eq!(sanitize_label(&"x".repeat(100)).chars().count(), MAX_LABEL_CHARS);
    }

    #[test]
    fn test_sequence_of() {
        assert_eq!(sequence_of("007-X-U1.png"), Some(7));
        assert_eq!(sequence_of("1234-a.jpg"), Some(1234));
        assert_eq!(sequence_of("notes-1.txt"), None);
        assert_eq!(sequence_of("-X.png"), None);
        assert_eq!(sequence_of("042.png"), None);
    }

    #[test]
    fn test_output_extension() {
        assert_eq!(output_extension("a/b.JPG"), "jpg");
        assert_eq!(output_extension("a.webp"), "webp");
        assert_eq!(output_extension("a.heic"), "png");
        assert_eq!(output_extension("synthetic://gray"), "png");
    }
}
