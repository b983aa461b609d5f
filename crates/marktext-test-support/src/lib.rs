//! Test support utilities for marktext.
//!
//! Provides mocks for every core port, a recording canvas with
//! deterministic text metrics, and synthetic image builders.
//!
//! # Example
//!
//! ```
//! use marktext_core::{LabelConfig, LabelRenderer};
//! use marktext_test_support::{RecordingCanvasFactory, SyntheticImageBuilder};
//! use std::sync::Arc;
//!
//! let images = vec![SyntheticImageBuilder::uniform_gray(200, 100, 128)];
//! let factory = Arc::new(RecordingCanvasFactory::new());
//! let renderer = LabelRenderer::new(factory.clone());
//!
//! let out = renderer.render_batch(&images, &LabelConfig::single("X"));
//! assert_eq!(out.len(), 1);
//! assert_eq!(factory.drawn_texts(), vec!["X".to_string()]);
//! ```

mod builders;
mod canvas;
mod mocks;

pub use builders::SyntheticImageBuilder;
pub use canvas::{DrawCall, FailingCanvasFactory, RecordingCanvasFactory};
pub use mocks::{MockImageSink, MockImageSource, MockProgressSink};
