//! Font discovery and loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusttype::Font;
use tracing::{debug, info};

/// How deep to descend into font directories.
const MAX_SEARCH_DEPTH: usize = 4;

/// A font the renderer knows how to find.
#[derive(Debug, Clone)]
pub struct FontInfo {
    /// Human readable name.
    pub name: &'static str,
    /// File name to look for in font directories.
    pub filename: &'static str,
    /// Whether the face covers CJK text.
    pub cjk: bool,
}

/// Known bold faces, most preferred first.
///
/// CJK faces come first because the default prefix is Chinese.
pub const FONTS: &[FontInfo] = &[
    FontInfo {
        name: "Noto Sans CJK Bold",
        filename: "NotoSansCJK-Bold.ttc",
        cjk: true,
    },
    FontInfo {
        name: "Noto Sans SC Bold",
        filename: "NotoSansSC-Bold.otf",
        cjk: true,
    },
    FontInfo {
        name: "Source Han Sans SC Bold",
        filename: "SourceHanSansSC-Bold.otf",
        cjk: true,
    },
    FontInfo {
        name: "Microsoft YaHei Bold",
        filename: "msyhbd.ttc",
        cjk: true,
    },
    FontInfo {
        name: "WenQuanYi Zen Hei",
        filename: "wqy-zenhei.ttc",
        cjk: true,
    },
    FontInfo {
        name: "DejaVu Sans Bold",
        filename: "DejaVuSans-Bold.ttf",
        cjk: false,
    },
    FontInfo {
        name: "Liberation Sans Bold",
        filename: "LiberationSans-Bold.ttf",
        cjk: false,
    },
    FontInfo {
        name: "Arial Bold",
        filename: "Arial Bold.ttf",
        cjk: false,
    },
    FontInfo {
        name: "Arial Bold (Windows)",
        filename: "arialbd.ttf",
        cjk: false,
    },
];

/// Directory for user-supplied fonts.
///
/// Uses `XDG_DATA_HOME/marktext/fonts` or `~/.local/share/marktext/fonts`.
#[must_use]
pub fn fonts_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marktext")
        .join("fonts")
}

/// Directories searched for known fonts, in order.
#[must_use]
pub fn search_dirs() -> Vec<PathBuf> {
    let mut dirs_list = vec![fonts_dir()];
    if let Some(user) = dirs::font_dir() {
        dirs_list.push(user);
    }
    for system in [
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "/System/Library/Fonts",
        "C:\\Windows\\Fonts",
    ] {
        dirs_list.push(PathBuf::from(system));
    }
    dirs_list
}

/// Finds the first known font present on this machine.
#[must_use]
pub fn find_font() -> Option<PathBuf> {
    let dirs_list = search_dirs();
    FONTS
        .iter()
        .find_map(|f| locate(f.filename, &dirs_list))
}

/// Resolves the font to use: `explicit` if given, else the first known one.
///
/// # Errors
///
/// Returns an error if an explicit font does not exist or no known font is
/// installed.
pub fn resolve_font(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !path.is_file() {
            anyhow::bail!("Font file not found: {}", path.display());
        }
        return Ok(path.to_path_buf());
    }

    let found = find_font().with_context(|| {
        format!(
            "No usable bold font found. Pass --font or copy one into {}",
            fonts_dir().display()
        )
    })?;
    info!("Using font {}", found.display());
    Ok(found)
}

/// Loads a TrueType/OpenType font or collection (first face).
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a font.
pub fn load_font(path: &Path) -> Result<Font<'static>> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))?;
    Font::try_from_vec(data).with_context(|| format!("Not a usable font: {}", path.display()))
}

/// Whether a font file name suggests a bold face.
#[must_use]
pub fn looks_bold(path: &Path) -> bool {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    stem.contains("bold")
        || stem.contains("heavy")
        || stem.contains("black")
        || stem.ends_with("bd")
        || stem.contains("zenhei")
}

/// Lists known fonts with their location, if installed.
#[must_use]
pub fn list_fonts() -> Vec<(FontInfo, Option<PathBuf>)> {
    let dirs_list = search_dirs();
    FONTS
        .iter()
        .map(|f| (f.clone(), locate(f.filename, &dirs_list)))
        .collect()
}

fn locate(filename: &str, dirs_list: &[PathBuf]) -> Option<PathBuf> {
    dirs_list
        .iter()
        .filter(|d| d.is_dir())
        .find_map(|d| find_in_dir(d, filename, MAX_SEARCH_DEPTH))
}

fn find_in_dir(dir: &Path, filename: &str, depth: usize) -> Option<PathBuf> {
    let candidate = dir.join(filename);
    if candidate.is_file() {
        debug!("Found font {}", candidate.display());
        return Some(candidate);
    }
    if depth == 0 {
        return None;
    }

    let mut subdirs: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    subdirs.sort();

    subdirs
        .iter()
        .find_map(|d| find_in_dir(d, filename, depth - 1))
}
