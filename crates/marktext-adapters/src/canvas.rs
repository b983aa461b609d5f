//! Software raster canvas.
//!
//! Draws into an RGBA8 buffer with straight (non-premultiplied) alpha and
//! source-over blending. Glyphs are rasterized with `rusttype`.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use marktext_core::{Canvas, CanvasFactory, FontSpec, Point, Rect, TextSize};
use rusttype::{point, Font, Scale};
use tracing::debug;

use crate::fonts::{load_font, looks_bold};

/// Font size per pixel of synthetic bold offset.
const SYNTHETIC_BOLD_DIVISOR: f32 = 24.0;

/// Creates [`RasterCanvas`] surfaces sharing one font.
#[derive(Clone)]
pub struct RasterCanvasFactory {
    font: Arc<Font<'static>>,
    synthetic_bold: bool,
}

impl RasterCanvasFactory {
    /// Creates a factory drawing text with `font`.
    #[must_use]
    pub fn new(font: Font<'static>) -> Self {
        Self {
            font: Arc::new(font),
            synthetic_bold: false,
        }
    }

    /// Loads the font at `path`. Fonts whose file name does not look bold
    /// get synthetic emboldening for bold requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the font cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let font = load_font(path)?;
        let synthetic_bold = !looks_bold(path);
        if synthetic_bold {
            debug!("{} is not a bold face, emboldening", path.display());
        }
        Ok(Self::new(font).with_synthetic_bold(synthetic_bold))
    }

    /// Draws bold text by overstriking when the font itself is not bold.
    #[must_use]
    pub const fn with_synthetic_bold(mut self, enabled: bool) -> Self {
        self.synthetic_bold = enabled;
        self
    }
}

impl CanvasFactory for RasterCanvasFactory {
    fn create(&self, width: u32, height: u32) -> Result<Box<dyn Canvas>> {
        if width == 0 || height == 0 {
            bail!("cannot create a {width}x{height} canvas");
        }
        Ok(Box::new(RasterCanvas {
            buffer: RgbaImage::new(width, height),
            font: Arc::clone(&self.font),
            synthetic_bold: self.synthetic_bold,
        }))
    }
}

/// An RGBA8 drawing surface.
pub struct RasterCanvas {
    buffer: RgbaImage,
    font: Arc<Font<'static>>,
    synthetic_bold: bool,
}

impl RasterCanvas {
    /// Extra horizontal strokes used to embolden text at this font.
    fn overstrike(&self, font: &FontSpec) -> u32 {
        if self.synthetic_bold && font.bold {
            (font.size / SYNTHETIC_BOLD_DIVISOR).round().max(1.0) as u32
        } else {
            0
        }
    }
}

impl Canvas for RasterCanvas {
    fn size(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    fn draw_image(&mut self, image: &DynamicImage, at: Point) -> Result<()> {
        let src = image.to_rgba8();
        let (ox, oy) = (at.x.round() as i64, at.y.round() as i64);
        let (bw, bh) = self.buffer.dimensions();

        for (sx, sy, pixel) in src.enumerate_pixels() {
            let x = ox + i64::from(sx);
            let y = oy + i64::from(sy);
            if x < 0 || y < 0 || x >= i64::from(bw) || y >= i64::from(bh) {
                continue;
            }
            blend(self.buffer.get_pixel_mut(x as u32, y as u32), *pixel, 1.0);
        }
        Ok(())
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> Result<TextSize> {
        let scale = scale_for(font)?;
        let v = self.font.v_metrics(scale);
        let width = advance_width(&self.font, text, scale) + self.overstrike(font) as f32;

        Ok(TextSize {
            width,
            height: v.ascent - v.descent + v.line_gap,
        })
    }

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Rgba<u8>) -> Result<()> {
        fill_rounded_rect(&mut self.buffer, rect, radius, color);
        Ok(())
    }

    fn draw_text(&mut self, text: &str, at: Point, font: &FontSpec, color: Rgba<u8>) -> Result<()> {
        let scale = scale_for(font)?;
        let baseline = at.y + self.font.v_metrics(scale).ascent;

        for offset in 0..=self.overstrike(font) {
            let start = point(at.x + offset as f32, baseline);
            for glyph in self.font.layout(text, scale, start) {
                let Some(bb) = glyph.pixel_bounding_box() else {
                    continue;
                };
                let buffer = &mut self.buffer;
                glyph.draw(|gx, gy, coverage| {
                    let px = gx as i32 + bb.min.x;
                    let py = gy as i32 + bb.min.y;
                    if px < 0 || py < 0 {
                        return;
                    }
                    let (px, py) = (px as u32, py as u32);
                    if px >= buffer.width() || py >= buffer.height() {
                        return;
                    }
                    blend(buffer.get_pixel_mut(px, py), color, coverage);
                });
            }
        }
        Ok(())
    }

    fn snapshot(&self) -> Result<DynamicImage> {
        Ok(DynamicImage::ImageRgba8(self.buffer.clone()))
    }
}

fn scale_for(font: &FontSpec) -> Result<Scale> {
    if !font.size.is_finite() || font.size <= 0.0 {
        bail!("invalid font size {}", font.size);
    }
    Ok(Scale::uniform(font.size))
}

/// Sum of kerned advance widths.
fn advance_width(font: &Font<'static>, text: &str, scale: Scale) -> f32 {
    let mut width = 0.0;
    let mut last = None;

    for ch in text.chars() {
        let glyph = font.glyph(ch).scaled(scale);
        if let Some(prev) = last {
            width += font.pair_kerning(scale, prev, glyph.id());
        }
        width += glyph.h_metrics().advance_width;
        last = Some(glyph.id());
    }

    width
}

/// Fills a rounded rectangle with anti-aliased edges, clipped to `buffer`.
pub(crate) fn fill_rounded_rect(buffer: &mut RgbaImage, rect: Rect, radius: f32, color: Rgba<u8>) {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return;
    }

    let r = radius.max(0.0).min(rect.width / 2.0).min(rect.height / 2.0);
    let (bw, bh) = buffer.dimensions();

    let x0 = (rect.x - 1.0).floor().max(0.0) as u32;
    let y0 = (rect.y - 1.0).floor().max(0.0) as u32;
    let x1 = ((rect.x + rect.width + 1.0).ceil().max(0.0) as u32).min(bw);
    let y1 = ((rect.y + rect.height + 1.0).ceil().max(0.0) as u32).min(bh);

    for py in y0..y1 {
        for px in x0..x1 {
            let coverage = rounded_rect_coverage(px as f32 + 0.5, py as f32 + 0.5, rect, r);
            if coverage > 0.0 {
                blend(buffer.get_pixel_mut(px, py), color, coverage);
            }
        }
    }
}

/// Coverage of the pixel centred at `(x, y)` by the rounded rectangle.
fn rounded_rect_coverage(x: f32, y: f32, rect: Rect, r: f32) -> f32 {
    let cx = clamp_inner(x, rect.x, rect.width, r);
    let cy = clamp_inner(y, rect.y, rect.height, r);
    let dist = (x - cx).hypot(y - cy);
    if dist == 0.0 {
        return 1.0;
    }
    (r + 0.5 - dist).clamp(0.0, 1.0)
}

/// Clamps `v` to the span `[start + r, start + len - r]`.
///
/// With `r == len / 2` the two ends can cross by one rounding step, so the
/// upper end never drops below the lower one.
fn clamp_inner(v: f32, start: f32, len: f32, r: f32) -> f32 {
    let lo = start + r;
    let hi = (start + len - r).max(lo);
    v.max(lo).min(hi)
}

/// Blends `src` over `dst` with extra `coverage`.
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f32) {
    let sa = f32::from(src[3]) / 255.0 * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);

    for c in 0..3 {
        let s = f32::from(src[c]) / 255.0;
        let d = f32::from(dst[c]) / 255.0;
        dst[c] = to_channel((s * sa + d * da * (1.0 - sa)) / out_a);
    }
    dst[3] = to_channel(out_a);
}

fn to_channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
