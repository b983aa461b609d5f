//! Persistent user preferences.
//!
//! A small key/value TOML file remembering what was typed last time:
//!
//! ```toml
//! prefix = "(班级)-(姓名)"
//! selected-suffix = ""
//! unselected-suffix = ""
//! auto-index-on = false
//! multi-prefix = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use marktext_core::DEFAULT_PREFIX;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Stored preference values. Absent keys fall back to defaults.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Preferences {
    /// Prefix text, possibly `;`-separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Suffix for the selected image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_suffix: Option<String>,
    /// Suffix for every other image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unselected_suffix: Option<String>,
    /// Whether unselected labels get a running counter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_index_on: Option<bool>,
    /// Whether the prefix is split on `;`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_prefix: Option<bool>,
}

impl Preferences {
    /// Prefix, or the placeholder when unset.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(DEFAULT_PREFIX)
    }

    /// Selected suffix, or empty.
    #[must_use]
    pub fn selected_suffix(&self) -> &str {
        self.selected_suffix.as_deref().unwrap_or_default()
    }

    /// Unselected suffix, or empty.
    #[must_use]
    pub fn unselected_suffix(&self) -> &str {
        self.unselected_suffix.as_deref().unwrap_or_default()
    }

    /// Auto-index switch, off by default.
    #[must_use]
    pub fn auto_index_on(&self) -> bool {
        self.auto_index_on.unwrap_or(false)
    }

    /// Multi-prefix switch, off by default.
    #[must_use]
    pub fn multi_prefix(&self) -> bool {
        self.multi_prefix.unwrap_or(false)
    }
}

/// File-backed preference store.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Store at the default location.
    #[must_use]
    pub fn open_default() -> Self {
        Self::at(default_path())
    }

    /// Store at an explicit path.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads stored preferences.
    ///
    /// A missing or unreadable file yields empty preferences, so every value
    /// falls back to its default.
    #[must_use]
    pub fn load(&self) -> Preferences {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preferences at {}", self.path.display());
                return Preferences::default();
            }
            Err(e) => {
                warn!("Failed to read preferences {}: {e}", self.path.display());
                return Preferences::default();
            }
        };

        match toml::from_str(&content) {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!("Failed to parse preferences {}: {e}", self.path.display());
                Preferences::default()
            }
        }
    }

    /// Writes preferences, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be serialized or written.
    pub fn save(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string(prefs).context("Failed to serialize preferences")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write preferences {}", self.path.display()))?;
        debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }

    /// Deletes stored preferences. Succeeds if there were none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn reset(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove preferences {}", self.path.display())),
        }
    }
}

/// Default preference file location.
///
/// Uses `XDG_DATA_HOME/marktext/preferences.toml` or
/// `~/.local/share/marktext/preferences.toml`.
#[must_use]
pub fn default_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marktext")
        .join("preferences.toml")
}
