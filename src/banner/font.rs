//! Font lookup by family name.
//!
//! A family matches a font file whose stem equals the family name, ignoring
//! case (`Arial` → `arial.ttf`, `Arial.TTF`, `ARIAL.otf`). Bold and italic
//! variants have their own stems (`arialbd.ttf`) and are never picked.

use ab_glyph::FontVec;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::BannerConfig;

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

/// System font directories for the current platform, plus the user font
/// directory when there is one.
pub fn default_font_dirs() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = if cfg!(target_os = "windows") {
        vec![PathBuf::from(r"C:\Windows\Fonts")]
    } else if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/Library/Fonts"),
            PathBuf::from("/System/Library/Fonts"),
            PathBuf::from("/System/Library/Fonts/Supplemental"),
        ]
    } else {
        vec![
            PathBuf::from("/usr/share/fonts"),
            PathBuf::from("/usr/local/share/fonts"),
        ]
    };

    if let Some(user) = dirs::font_dir() {
        candidates.push(user);
    }
    candidates
}

fn is_font_file(path: &Path, family: &str) -> bool {
    let extension_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| FONT_EXTENSIONS.contains(&e.to_lowercase().as_str()));
    let stem_ok = path
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.eq_ignore_ascii_case(family));
    extension_ok && stem_ok
}

/// Find the first file for `family` under `dirs`, searched in order and
/// recursively.
pub fn locate_font_file(family: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .filter(|dir| dir.is_dir())
        .flat_map(|dir| {
            WalkDir::new(dir)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
        })
        .map(|entry| entry.into_path())
        .find(|path| path.is_file() && is_font_file(path, family))
}

/// Locate and parse the configured banner font.
pub fn resolve_font(config: &BannerConfig) -> Result<FontVec> {
    let search = if config.font_dirs.is_empty() {
        default_font_dirs()
    } else {
        config.font_dirs.clone()
    };

    let path = locate_font_file(&config.font_family, &search).with_context(|| {
        format!(
            "Unable to locate font '{}' in {}",
            config.font_family,
            search
                .iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;
    log::debug!("Using font {}", path.display());

    let data = std::fs::read(&path)
        .with_context(|| format!("Failed to read font file {}", path.display()))?;
    FontVec::try_from_vec(data)
        .with_context(|| format!("Failed to parse font file {}", path.display()))
}
