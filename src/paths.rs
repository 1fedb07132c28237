//! XDG-compliant path resolution for basirah.
//!
//! Provides `BasirahPaths`: where the config file, the reference datasets
//! and the interactive-mode log file live, following the XDG Base Directory
//! Specification.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// File name of the surah index dataset inside the data directory.
pub const SURAH_INDEX_FILE: &str = "surah.json";
/// File name of the verse-text dataset inside the data directory.
pub const VERSE_FILE: &str = "quran.json";

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(basirah::paths::no_home),
        help("Set the HOME environment variable or ensure a valid user profile exists.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(basirah::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Global XDG-compliant directories for basirah.
#[derive(Debug, Clone)]
pub struct BasirahPaths {
    /// `$XDG_CONFIG_HOME/basirah/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/basirah/`, default home of `surah.json` and `quran.json`
    pub data_dir: PathBuf,
    /// `$XDG_STATE_HOME/basirah/`
    pub state_dir: PathBuf,
}

impl BasirahPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("basirah");

        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/share"))
            .join("basirah");

        let state_dir = std::env::var("XDG_STATE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/state"))
            .join("basirah");

        Ok(Self {
            config_dir,
            data_dir,
            state_dir,
        })
    }

    /// Path to the global config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Directory for log files written while the TUI owns the terminal.
    pub fn log_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    /// Create the log directory. Idempotent.
    pub fn ensure_log_dir(&self) -> PathResult<PathBuf> {
        let dir = self.log_dir();
        std::fs::create_dir_all(&dir).map_err(|e| PathError::CreateDir {
            path: dir.display().to_string(),
            source: e,
        })?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_paths_are_namespaced() {
        let paths = BasirahPaths::resolve().unwrap();
        assert!(
            paths.config_dir.to_string_lossy().contains("basirah"),
            "config_dir should contain 'basirah': {}",
            paths.config_dir.display()
        );
        assert!(paths.config_file().starts_with(&paths.config_dir));
    }

    #[test]
    fn derived_paths() {
        let paths = BasirahPaths {
            config_dir: PathBuf::from("/cfg/basirah"),
            data_dir: PathBuf::from("/data/basirah"),
            state_dir: PathBuf::from("/state/basirah"),
        };
        assert_eq!(
            paths.config_file(),
            PathBuf::from("/cfg/basirah/config.toml")
        );
        assert_eq!(paths.log_dir(), PathBuf::from("/state/basirah/logs"));
    }

    #[test]
    fn ensure_log_dir_is_idempotent() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = BasirahPaths {
            config_dir: dir.path().join("cfg"),
            data_dir: dir.path().join("data"),
            state_dir: dir.path().join("state"),
        };
        let first = paths.ensure_log_dir().unwrap();
        let second = paths.ensure_log_dir().unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
    }
}
