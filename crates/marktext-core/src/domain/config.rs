//! Labeling configuration.

use anyhow::{bail, Result};
use serde::Serialize;

/// Placeholder prefix shown when no preference has been stored yet.
pub const DEFAULT_PREFIX: &str = "(班级)-(姓名)";

/// Separator used to split the prefix text in multi-prefix mode.
pub const PREFIX_SEPARATOR: char = ';';

/// Resolved labeling configuration for one render.
///
/// `prefixes` is never empty. With multi-prefix disabled it holds exactly
/// one element; with it enabled each prefix produces its own output block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelConfig {
    prefixes: Vec<String>,
    /// Suffix appended to the prefix for the selected image.
    pub selected_suffix: String,
    /// Suffix appended to the prefix for every other image.
    pub unselected_suffix: String,
    /// Append a running 1-based counter to unselected labels.
    pub auto_index: bool,
    /// One selected source index per prefix block.
    pub selected_indices: Vec<usize>,
}

impl LabelConfig {
    /// Creates a configuration from an explicit prefix list.
    ///
    /// # Errors
    ///
    /// Returns an error if `prefixes` is empty.
    pub fn new(
        prefixes: Vec<String>,
        selected_suffix: impl Into<String>,
        unselected_suffix: impl Into<String>,
        auto_index: bool,
        selected_indices: Vec<usize>,
    ) -> Result<Self> {
        if prefixes.is_empty() {
            bail!("label configuration needs at least one prefix");
        }
        Ok(Self {
            prefixes,
            selected_suffix: selected_suffix.into(),
            unselected_suffix: unselected_suffix.into(),
            auto_index,
            selected_indices,
        })
    }

    /// Creates a single-prefix configuration with no suffixes and no selection.
    #[must_use]
    pub fn single(prefix: impl Into<String>) -> Self {
        Self {
            prefixes: vec![prefix.into()],
            selected_suffix: String::new(),
            unselected_suffix: String::new(),
            auto_index: false,
            selected_indices: Vec::new(),
        }
    }

    /// Builds a configuration from the raw prefix text as typed by the user.
    ///
    /// With `multi_prefix` off the whole text is the only prefix. With it on
    /// the text is split on `;` and empty segments are dropped; if nothing is
    /// left the whole text is used as-is.
    #[must_use]
    pub fn from_input(
        prefix_text: &str,
        multi_prefix: bool,
        selected_suffix: impl Into<String>,
        unselected_suffix: impl Into<String>,
        auto_index: bool,
        selected_indices: Vec<usize>,
    ) -> Self {
        Self {
            prefixes: split_prefixes(prefix_text, multi_prefix),
            selected_suffix: selected_suffix.into(),
            unselected_suffix: unselected_suffix.into(),
            auto_index,
            selected_indices,
        }
    }

    /// Sets the suffixes.
    #[must_use]
    pub fn with_suffixes(
        mut self,
        selected: impl Into<String>,
        unselected: impl Into<String>,
    ) -> Self {
        self.selected_suffix = selected.into();
        self.unselected_suffix = unselected.into();
        self
    }

    /// Enables or disables the running counter.
    #[must_use]
    pub const fn with_auto_index(mut self, auto_index: bool) -> Self {
        self.auto_index = auto_index;
        self
    }

    /// Sets the per-block selected indices.
    #[must_use]
    pub fn with_selected(mut self, indices: Vec<usize>) -> Self {
        self.selected_indices = indices;
        self
    }

    /// The prefixes, in output block order.
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Number of output blocks this configuration produces.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.prefixes.len()
    }
}

fn split_prefixes(text: &str, multi_prefix: bool) -> Vec<String> {
    if !multi_prefix {
        return vec![text.to_string()];
    }

    let parts: Vec<String> = text
        .split(PREFIX_SEPARATOR)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    if parts.is_empty() {
        vec![text.to_string()]
    } else {
        parts
    }
}
