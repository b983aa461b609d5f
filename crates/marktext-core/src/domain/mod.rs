//! Core domain types for label rendering.

mod config;
mod label;
mod layout;
mod photo;
mod record;

pub use config::{LabelConfig, DEFAULT_PREFIX, PREFIX_SEPARATOR};
pub use label::{plan_labels, resolve_selected_index, LabelPlan};
pub use layout::{LabelLayout, BACKGROUND_COLOR, TEXT_COLOR};
pub use photo::{RenderedImage, SourceImage};
pub use record::RenderRecord;
