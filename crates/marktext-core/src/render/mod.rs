//! Batch label rendering.

mod renderer;
mod task;

pub use renderer::LabelRenderer;
pub use task::RenderTask;
