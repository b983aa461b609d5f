//! MarkText Adapters - External adapters for marktext.
//!
//! This crate provides adapters for:
//! - Filesystem image source
//! - Directory image library (output sink)
//! - Software raster canvas and font discovery
//! - Persistent user preferences

pub mod canvas;
pub mod fonts;
pub mod fs;
pub mod library;
pub mod prefs;

pub use canvas::{RasterCanvas, RasterCanvasFactory};
pub use fonts::{find_font, fonts_dir, resolve_font};
pub use fs::{FsImageSource, DEFAULT_BATCH_LIMIT};
pub use library::FsImageLibrary;
pub use prefs::{PreferenceStore, Preferences};
