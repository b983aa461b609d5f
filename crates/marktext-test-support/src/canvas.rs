//! Recording canvas with deterministic text metrics.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{bail, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use marktext_core::ports::{Canvas, CanvasFactory, FontSpec, Point, Rect, TextSize};

/// Width of every character, as a fraction of the font size.
const CHAR_WIDTH_RATIO: f32 = 0.5;

/// One drawing command issued against a recording canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// A canvas was created.
    Create {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// An image was drawn.
    DrawImage {
        /// Position of the top-left corner.
        at: Point,
    },
    /// Text was measured.
    MeasureText {
        /// Text measured.
        text: String,
        /// Font used.
        font: FontSpec,
    },
    /// A rounded rectangle was filled.
    FillRoundedRect {
        /// Rectangle filled.
        rect: Rect,
        /// Corner radius.
        radius: f32,
        /// Fill colour.
        color: Rgba<u8>,
    },
    /// Text was drawn.
    DrawText {
        /// Text drawn.
        text: String,
        /// Top-left of the text box.
        at: Point,
        /// Font used.
        font: FontSpec,
        /// Text colour.
        color: Rgba<u8>,
    },
    /// The canvas was captured.
    Snapshot,
}

/// Canvas factory that logs every call.
///
/// Text measures `chars * size * 0.5` wide and `size` tall. Snapshots
/// return the drawn source image converted to RGBA, unmodified.
#[derive(Clone, Default)]
pub struct RecordingCanvasFactory {
    calls: Arc<Mutex<Vec<DrawCall>>>,
}

impl RecordingCanvasFactory {
    /// Creates a new factory with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every call issued so far, across all canvases.
    #[must_use]
    pub fn calls(&self) -> Vec<DrawCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the text of every `DrawText` call, in order.
    #[must_use]
    pub fn drawn_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                DrawCall::DrawText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Returns the number of canvases created.
    #[must_use]
    pub fn canvas_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, DrawCall::Create { .. }))
            .count()
    }

    /// Measures text the way recording canvases do.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn text_size(text: &str, font: &FontSpec) -> TextSize {
        TextSize {
            width: text.chars().count() as f32 * font.size * CHAR_WIDTH_RATIO,
            height: font.size,
        }
    }
}

impl CanvasFactory for RecordingCanvasFactory {
    fn create(&self, width: u32, height: u32) -> Result<Box<dyn Canvas>> {
        let log = Arc::clone(&self.calls);
        log.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(DrawCall::Create { width, height });
        Ok(Box::new(RecordingCanvas {
            buffer: RgbaImage::new(width, height),
            log,
        }))
    }
}

struct RecordingCanvas {
    buffer: RgbaImage,
    log: Arc<Mutex<Vec<DrawCall>>>,
}

impl RecordingCanvas {
    fn record(&self, call: DrawCall) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    fn draw_image(&mut self, image: &DynamicImage, at: Point) -> Result<()> {
        self.record(DrawCall::DrawImage { at });
        let rgba = image.to_rgba8();
        if rgba.dimensions() == self.buffer.dimensions() {
            self.buffer = rgba;
        }
        Ok(())
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> Result<TextSize> {
        self.record(DrawCall::MeasureText {
            text: text.to_string(),
            font: *font,
        });
        Ok(RecordingCanvasFactory::text_size(text, font))
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Rgba<u8>) -> Result<()> {
        self.record(DrawCall::FillRoundedRect {
            rect,
            radius,
            color,
        });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, at: Point, font: &FontSpec, color: Rgba<u8>) -> Result<()> {
        self.record(DrawCall::DrawText {
            text: text.to_string(),
            at,
            font: *font,
            color,
        });
        Ok(())
    }

    fn snapshot(&self) -> Result<DynamicImage> {
        self.record(DrawCall::Snapshot);
        Ok(DynamicImage::ImageRgba8(self.buffer.clone()))
    }
}

/// Canvas factory that fails for selected labels or sizes.
///
/// Canvases measure text like [`RecordingCanvasFactory`] but refuse to
/// measure any text containing one of the configured needles, and the
/// factory refuses to create canvases of the configured widths.
#[derive(Clone, Default)]
pub struct FailingCanvasFactory {
    fail_texts: Vec<String>,
    fail_widths: Vec<u32>,
}

impl FailingCanvasFactory {
    /// Creates a factory that never fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails text measurement for any label containing `needle`.
    #[must_use]
    pub fn failing_text(mut self, needle: impl Into<String>) -> Self {
        self.fail_texts.push(needle.into());
        self
    }

    /// Fails canvas creation for images of this width.
    #[must_use]
    pub fn failing_width(mut self, width: u32) -> Self {
        self.fail_widths.push(width);
        self
    }
}

impl CanvasFactory for FailingCanvasFactory {
    fn create(&self, width: u32, height: u32) -> Result<Box<dyn Canvas>> {
        if self.fail_widths.contains(&width) {
            bail!("refusing {width}x{height} surface");
        }
        Ok(Box::new(FailingCanvas {
            buffer: RgbaImage::new(width, height),
            fail_texts: self.fail_texts.clone(),
        }))
    }
}

struct FailingCanvas {
    buffer: RgbaImage,
    fail_texts: Vec<String>,
}

impl Canvas for FailingCanvas {
    fn size(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    fn draw_image(&mut self, _image: &DynamicImage, _at: Point) -> Result<()> {
        Ok(())
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> Result<TextSize> {
        if self.fail_texts.iter().any(|n| text.contains(n.as_str())) {
            bail!("cannot measure {text:?}");
        }
        Ok(RecordingCanvasFactory::text_size(text, font))
    }

    fn fill_rounded_rect(&mut self, _rect: Rect, _radius: f32, _color: Rgba<u8>) -> Result<()> {
        Ok(())
    }

    fn draw_text(&mut self, _text: &str, _at: Point, _font: &FontSpec, _c: Rgba<u8>) -> Result<()> {
        Ok(())
    }

    fn snapshot(&self) -> Result<DynamicImage> {
        Ok(DynamicImage::ImageRgba8(self.buffer.clone()))
    }
}
