//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the rendering core and
//! external adapters: drawing surfaces, image sources and output sinks.

mod canvas;
mod image_sink;
mod image_source;
mod progress;

pub use canvas::{Canvas, CanvasFactory, FontSpec, Point, Rect, TextSize};
pub use image_sink::ImageSink;
pub use image_source::ImageSource;
pub use progress::{NoopProgress, ProgressEvent, ProgressSink};
