use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level configuration for exif-banner.
///
/// Every section is optional in the file; missing sections and fields take
/// their defaults.
///
/// # Loading
///
/// ```rust,no_run
/// use exif_banner::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.replacements.insert("NIKON Z 6_2".into(), "Nikon Z6 II".into());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whose copyright gets rewritten, and what it gets rewritten to.
    pub owner: OwnerConfig,
    /// Raw camera/lens name → display name.
    pub replacements: Replacements,
    /// Banner look and font lookup.
    pub banner: BannerConfig,
    /// Output encoding and batch policy.
    pub output: OutputConfig,
}

/// Identity used by the copyright rewrite and the default copyright line.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OwnerConfig {
    /// Must appear in the Copyright tag for the rewrite to fire.
    pub first_name: String,
    /// Must also appear in the Copyright tag for the rewrite to fire.
    pub last_name: String,
    /// Written to Copyright, OwnerName and Artist.
    pub full_name: String,
    /// Written to Software.
    pub software: String,
}

impl Default for OwnerConfig {
    fn default() -> Self {
        Self {
            first_name: "Lasse".to_string(),
            last_name: "Karlsen".to_string(),
            full_name: "Lasse Vågsæther Karlsen".to_string(),
            software: "LVK Watermarker".to_string(),
        }
    }
}

/// Camera and lens display-name substitutions.
///
/// Keys are matched exactly (case-sensitive) against the coalesced
/// make/model string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Replacements(BTreeMap<String, String>);

impl Replacements {
    pub fn insert(&mut self, from: String, to: String) {
        self.0.insert(from, to);
    }

    /// The configured replacement, or `name` itself.
    pub fn apply(&self, name: String) -> String {
        match self.0.get(&name) {
            Some(replacement) => replacement.clone(),
            None => name,
        }
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Replacements {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Banner rendering settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    /// Font family, matched against font file names.
    pub font_family: String,
    /// Directories searched for the font. Empty means the platform defaults.
    pub font_dirs: Vec<PathBuf>,
    /// Gaussian blur sigma applied behind the text.
    pub blur_sigma: f32,
    /// Brightness multiplier applied behind the text.
    pub brightness: f32,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_dirs: Vec::new(),
            blur_sigma: 50.0,
            brightness: 0.5,
        }
    }
}

/// Output and batch behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JPEG quality, 1–100.
    pub quality: u8,
    /// If `true`, a failing file is logged and the batch moves on.
    /// If `false`, the first failure aborts the batch.
    pub continue_on_error: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: 85,
            continue_on_error: false,
        }
    }
}

impl Config {
    /// Resolve the config file path in the same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::debug!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }
}
