//! Client configuration, persisted as TOML in `$XDG_CONFIG_HOME/basirah/config.toml`.
//!
//! Every field has a default so a missing file or a partial file is valid.
//! The backend URL can additionally be overridden through `BASIRAH_API_URL`.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Language;
use crate::client::SearchEndpoint;
use crate::paths::BasirahPaths;

/// Backend used when neither the config file nor the environment names one.
pub const DEFAULT_BASE_URL: &str = "https://basirah-project.onrender.com";

/// Environment variable overriding `base_url`.
pub const BASE_URL_ENV: &str = "BASIRAH_API_URL";

/// Smallest and largest number of topic search results a user may request.
pub const TOP_K_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Errors from loading the config file.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(basirah::config::read),
        help("Ensure the config file is readable, or remove it to fall back to defaults.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(basirah::config::parse),
        help("Check the TOML syntax. Run `basirah config` to print a valid configuration.")
    )]
    Parse { path: String, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasirahConfig {
    /// Root URL of the exegesis backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Which topic search route the backend exposes.
    #[serde(default)]
    pub search_endpoint: SearchEndpoint,
    /// Require a bearer token for every read operation.
    #[serde(default)]
    pub require_auth: bool,
    /// Directory holding `surah.json` and `quran.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_language")]
    pub default_language: Language,
    #[serde(default = "default_top_k")]
    pub default_top_k: u8,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_language() -> Language {
    Language::Arabic
}
fn default_top_k() -> u8 {
    3
}

impl Default for BasirahConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            search_endpoint: SearchEndpoint::default(),
            require_auth: false,
            data_dir: None,
            default_language: default_language(),
            default_top_k: default_top_k(),
        }
    }
}

impl BasirahConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    /// Load from a TOML file, or return defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Render as pretty TOML.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| e.to_string())
    }

    /// Apply `BASIRAH_API_URL` if it is set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_base_url_override(std::env::var(BASE_URL_ENV).ok())
    }

    /// Replace `base_url` when `value` is present and non-empty.
    pub fn with_base_url_override(mut self, value: Option<String>) -> Self {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        self
    }

    /// Directory the reference datasets are read from.
    pub fn data_dir(&self, paths: &BasirahPaths) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| paths.data_dir.clone())
    }

    /// `default_top_k` clamped into [`TOP_K_RANGE`].
    pub fn top_k(&self) -> u8 {
        self.default_top_k
            .clamp(*TOP_K_RANGE.start(), *TOP_K_RANGE.end())
    }
}
