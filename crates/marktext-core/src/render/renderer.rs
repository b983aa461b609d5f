//! The label renderer.
//!
//! Turns a batch of source images and a [`LabelConfig`] into one block of
//! labeled images per prefix. Each output is drawn on its own canvas, so a
//! failure on one image never affects the rest of the batch.

use std::sync::Arc;

use anyhow::{Context, Result};
use image::DynamicImage;
use tracing::{debug, warn};

use crate::domain::{
    plan_labels, LabelConfig, LabelLayout, RenderedImage, SourceImage, BACKGROUND_COLOR,
    TEXT_COLOR,
};
use crate::ports::{CanvasFactory, FontSpec, NoopProgress, Point, ProgressEvent, ProgressSink};

/// Stateless batch renderer. Cheap to clone.
#[derive(Clone)]
pub struct LabelRenderer {
    factory: Arc<dyn CanvasFactory>,
}

impl LabelRenderer {
    /// Creates a renderer drawing on canvases from `factory`.
    #[must_use]
    pub fn new(factory: Arc<dyn CanvasFactory>) -> Self {
        Self { factory }
    }

    /// Renders every label for the batch.
    ///
    /// Output is `config.block_count()` consecutive blocks of
    /// `images.len()` images each, minus any images whose drawing failed.
    #[must_use]
    pub fn render_batch(&self, images: &[SourceImage], config: &LabelConfig) -> Vec<RenderedImage> {
        self.render_batch_with_progress(images, config, &NoopProgress)
    }

    /// Same as [`render_batch`](Self::render_batch), reporting progress.
    #[must_use]
    pub fn render_batch_with_progress(
        &self,
        images: &[SourceImage],
        config: &LabelConfig,
        progress: &dyn ProgressSink,
    ) -> Vec<RenderedImage> {
        let plans = plan_labels(images.len(), config);
        let total = plans.len();
        debug!(
            "Rendering {total} labels ({} images x {} prefixes)",
            images.len(),
            config.block_count()
        );

        let mut rendered = Vec::with_capacity(total);
        let mut skipped = 0usize;

        for (index, plan) in plans.into_iter().enumerate() {
            let source = &images[plan.source_index];

            progress.on_event(ProgressEvent::Started {
                label: plan.text.clone(),
                index,
                total,
            });

            match self.render_one(source, &plan.text) {
                Ok(image) => {
                    progress.on_event(ProgressEvent::Completed {
                        label: plan.text.clone(),
                        source: source.name.clone(),
                    });
                    rendered.push(RenderedImage {
                        source_index: plan.source_index,
                        block_index: plan.block_index,
                        source_name: source.name.clone(),
                        prefix: plan.prefix,
                        label: plan.text,
                        selected: plan.selected,
                        image,
                    });
                }
                Err(e) => {
                    warn!("Skipping label {:?} on {}: {e:#}", plan.text, source.name);
                    progress.on_event(ProgressEvent::Skipped {
                        label: plan.text,
                        reason: format!("{e:#}"),
                    });
                    skipped += 1;
                }
            }
        }

        progress.on_event(ProgressEvent::Finished {
            rendered: rendered.len(),
            skipped,
        });

        rendered
    }

    /// Draws a single placard onto a copy of `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if any canvas operation fails.
    pub fn render_one(&self, source: &SourceImage, label: &str) -> Result<DynamicImage> {
        let mut canvas = self
            .factory
            .create(source.width, source.height)
            .with_context(|| format!("Failed to create {}x{} canvas", source.width, source.height))?;

        canvas
            .draw_image(&source.image, Point::ORIGIN)
            .context("Failed to draw source image")?;

        let font = FontSpec::bold(LabelLayout::font_size_for(source.width));
        let text = canvas
            .measure_text(label, &font)
            .context("Failed to measure label")?;
        let layout = LabelLayout::compute(source.width, source.height, text, font.size);

        canvas
            .fill_rounded_rect(layout.background, layout.corner_radius, BACKGROUND_COLOR)
            .context("Failed to draw label background")?;
        canvas
            .draw_text(label, layout.text_origin, &font, TEXT_COLOR)
            .context("Failed to draw label text")?;

        canvas.snapshot().context("Failed to capture canvas")
    }
}

impl std::fmt::Debug for LabelRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelRenderer").finish_non_exhaustive()
    }
}
