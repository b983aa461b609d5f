//! Configuration file support for marktext.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/marktext/config.toml` (lowest priority)
//! - Project-local: `.marktext.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)
//!
//! Label text (prefix, suffixes, switches) is not configured here; it lives
//! in the preference store so the last used values come back next time.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Output settings.
    pub output: OutputConfig,
    /// Preference store settings.
    pub preferences: PreferencesConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
    /// Maximum photos per batch (0 = unlimited).
    pub limit: Option<usize>,
}

/// Rendering configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Bold font file used for labels.
    pub font: Option<PathBuf>,
}

/// Output configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory rendered photos are written to.
    pub dir: Option<PathBuf>,
    /// Manifest format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON manifest.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

/// Preference store configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    /// Custom preference file.
    pub path: Option<PathBuf>,
    /// Remember the label settings of each render.
    pub save: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/marktext/config.toml`
    /// 2. Project-local: `.marktext.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), String> {
        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                return Err(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }

        if let Some(ref font) = self.render.font {
            if font.as_os_str().is_empty() {
                return Err("render.font must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // General
        self.general.recursive = other.general.recursive.or(self.general.recursive);
        self.general.limit = other.general.limit.or(self.general.limit);

        // Render
        self.render.font = other.render.font.or_else(|| self.render.font.take());

        // Output
        self.output.dir = other.output.dir.or_else(|| self.output.dir.take());
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);

        // Preferences
        self.preferences.path = other
            .preferences
            .path
            .or_else(|| self.preferences.path.take());
        self.preferences.save = other.preferences.save.or(self.preferences.save);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("marktext").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.marktext.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".marktext.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
