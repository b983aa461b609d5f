//! Drawing surface port.
//!
//! The renderer never touches pixels directly. It asks a [`CanvasFactory`]
//! for a fresh surface per image and issues drawing commands against it.

use image::{DynamicImage, Rgba};

/// A point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

impl Point {
    /// The top-left corner.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };
}

/// An axis-aligned rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// Measured size of a line of text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextSize {
    /// Advance width.
    pub width: f32,
    /// Line height.
    pub height: f32,
}

/// Font request for measuring and drawing text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    /// Pixel size.
    pub size: f32,
    /// Bold weight.
    pub bold: bool,
}

impl FontSpec {
    /// A bold font of the given pixel size.
    #[must_use]
    pub const fn bold(size: f32) -> Self {
        Self { size, bold: true }
    }
}

/// A drawing surface owned by a single render.
pub trait Canvas {
    /// Surface size in pixels.
    fn size(&self) -> (u32, u32);

    /// Draws `image` with its top-left corner at `at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot draw the image.
    fn draw_image(&mut self, image: &DynamicImage, at: Point) -> anyhow::Result<()>;

    /// Measures a single line of text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be shaped with the requested font.
    fn measure_text(&self, text: &str, font: &FontSpec) -> anyhow::Result<TextSize>;

    /// Fills a rounded rectangle, blending `color` over existing pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be drawn on.
    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Rgba<u8>)
        -> anyhow::Result<()>;

    /// Draws a line of text with the top-left of its box at `at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be drawn.
    fn draw_text(
        &mut self,
        text: &str,
        at: Point,
        font: &FontSpec,
        color: Rgba<u8>,
    ) -> anyhow::Result<()>;

    /// Captures the current surface contents as an image.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be read back.
    fn snapshot(&self) -> anyhow::Result<DynamicImage>;
}

/// Creates independent drawing surfaces.
pub trait CanvasFactory: Send + Sync {
    /// Allocates a new, transparent surface of the given size.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated.
    fn create(&self, width: u32, height: u32) -> anyhow::Result<Box<dyn Canvas>>;
}
