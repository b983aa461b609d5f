//! Placard geometry.

use image::Rgba;

use crate::ports::{Point, Rect, TextSize};

/// Fill colour of the placard: white at 80% opacity.
pub const BACKGROUND_COLOR: Rgba<u8> = Rgba([255, 255, 255, 204]);

/// Colour of the label text.
pub const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Divisor applied to the image width to get the font size.
const FONT_SIZE_DIVISOR: f32 = 20.0;

/// Fixed horizontal nudge applied when centering the placard.
const CENTER_NUDGE: f32 = 10.0;

/// Relative vertical position of the placard.
const VERTICAL_POSITION: f32 = 0.6;

/// Where the placard and its text go on an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelLayout {
    /// Font size in pixels.
    pub font_size: f32,
    /// Rounded background rectangle.
    pub background: Rect,
    /// Corner radius of the background.
    pub corner_radius: f32,
    /// Top-left corner of the text box.
    pub text_origin: Point,
}

impl LabelLayout {
    /// Font size used for an image of the given width.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn font_size_for(image_width: u32) -> f32 {
        image_width as f32 / FONT_SIZE_DIVISOR
    }

    /// Computes the placard for a measured label.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(image_width: u32, image_height: u32, text: TextSize, font_size: f32) -> Self {
        let x = (image_width as f32 - text.width - CENTER_NUDGE) / 2.0;
        let y = (image_height as f32 - text.height) * VERTICAL_POSITION;

        Self {
            font_size,
            background: Rect {
                x,
                y,
                width: text.width + font_size * 2.0,
                height: text.height + font_size,
            },
            corner_radius: font_size,
            text_origin: Point {
                x: x + font_size,
                y: y + font_size / 2.0,
            },
        }
    }
}
