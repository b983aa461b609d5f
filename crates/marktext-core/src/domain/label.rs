//! Label text planning.
//!
//! Decides which text goes on which image without touching any pixels.

use serde::Serialize;

use super::LabelConfig;

/// The label chosen for one output image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelPlan {
    /// Index of the prefix block.
    pub block_index: usize,
    /// Index of the source image.
    pub source_index: usize,
    /// Prefix of the block.
    pub prefix: String,
    /// Full label text.
    pub text: String,
    /// Whether the image is the block's selected image.
    pub selected: bool,
}

/// Resolves the selected source index for the prefix block at `block`.
///
/// Uses the entry at `block` when present, otherwise the last entry.
/// Returns `None` when no selection was made at all.
#[must_use]
pub fn resolve_selected_index(selected_indices: &[usize], block: usize) -> Option<usize> {
    selected_indices
        .get(block)
        .or_else(|| selected_indices.last())
        .copied()
}

/// Plans every label for a batch of `image_count` images.
///
/// Output is ordered block by block in prefix order, each block covering
/// every source image in order.
#[must_use]
pub fn plan_labels(image_count: usize, config: &LabelConfig) -> Vec<LabelPlan> {
    let mut plans = Vec::with_capacity(image_count * config.block_count());

    for (block_index, prefix) in config.prefixes().iter().enumerate() {
        let selected_index = resolve_selected_index(&config.selected_indices, block_index);
        let mut count = 0usize;

        for source_index in 0..image_count {
            let selected = selected_index == Some(source_index);
            let text = if selected {
                format!("{prefix}{}", config.selected_suffix)
            } else if config.auto_index {
                count += 1;
                format!("{prefix}{}{count}", config.unselected_suffix)
            } else {
                format!("{prefix}{}", config.unselected_suffix)
            };

            plans.push(LabelPlan {
                block_index,
                source_index,
                prefix: prefix.clone(),
                text,
                selected,
            });
        }
    }

    plans
}
