//! MarkText Core - Label planning, layout and rendering.
//!
//! This crate contains the domain types, the port traits that separate the
//! renderer from drawing surfaces and I/O, and the [`LabelRenderer`] that
//! composites name placards onto batches of photos.

pub mod domain;
pub mod ports;
pub mod render;

pub use domain::{
    plan_labels, resolve_selected_index, LabelConfig, LabelLayout, LabelPlan, RenderRecord,
    RenderedImage, SourceImage, DEFAULT_PREFIX,
};
pub use ports::{
    Canvas, CanvasFactory, FontSpec, ImageSink, ImageSource, NoopProgress, Point, ProgressEvent,
    ProgressSink, Rect, TextSize,
};
pub use render::{LabelRenderer, RenderTask};
