//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::messages::Locale;
use crate::model::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Default parameter values (used when CLI flags are not given).
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Speech-to-text settings.
    #[serde(default)]
    pub dictation: DictationConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Gemini API key.
    pub gemini: Option<String>,
}

/// Default parameter values from config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Image model name or alias.
    pub image_model: String,
    /// Text model used for random prompts.
    pub text_model: String,
    /// Aspect ratio token selected at start.
    pub aspect_ratio: Option<String>,
    /// Images per generation.
    pub count: u32,
    /// Output format for saved files.
    pub format: String,
    /// Message language.
    pub locale: Locale,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            aspect_ratio: None,
            count: 4,
            format: "jpeg".to_string(),
            locale: Locale::default(),
        }
    }
}

/// Speech-to-text settings.
#[derive(Debug, Default, Deserialize)]
pub struct DictationConfig {
    /// Shell command printing one transcript per line on stdout.
    pub command: Option<String>,
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the Gemini API key, preferring environment variables.
    #[must_use]
    pub fn gemini_key(&self) -> Option<String> {
        ["GEMINI_API_KEY", "API_KEY"]
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            .or_else(|| self.keys.gemini.clone())
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `IMAGEGRID_CONFIG` environment variable
/// 3. `~/.config/imagegrid/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("IMAGEGRID_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/imagegrid/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/imagegrid/config.toml")
    } else {
        PathBuf::from("imagegrid.toml")
    }
}
