//! User configuration, read from `config.toml`.
//!
//! ```toml
//! [view]
//! h_stride = 8        # columns the window jumps when scrolling sideways
//! h_margin = 2        # columns kept free at the right edge
//! theme = "terminal"  # or "monochrome"
//!
//! [editor]
//! tab_width = 4
//!
//! [log]
//! level = "info"      # off, error, warn, info, debug, trace
//! file = "/tmp/meda.log"
//! ```
//!
//! Every key is optional. A missing file means all defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const APP_NAME: &str = "meda";

/// Default values.
pub mod defaults {
    pub const H_STRIDE: usize = 8;
    pub const H_MARGIN: usize = 2;
    pub const THEME: &str = "terminal";
    pub const TAB_WIDTH: usize = 4;
    pub const LOG_LEVEL: &str = "info";
}

/// All settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub view: ViewSettings,
    pub editor: EditorSettings,
    pub log: LogSettings,
}

/// Screen layout and colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Horizontal page stride.
    pub h_stride: usize,
    /// Columns reserved at the right edge for the truncation marker.
    pub h_margin: usize,
    /// Theme name.
    pub theme: String,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            h_stride: defaults::H_STRIDE,
            h_margin: defaults::H_MARGIN,
            theme: defaults::THEME.to_string(),
        }
    }
}

/// Text editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Tab stop width in spaces.
    pub tab_width: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            tab_width: defaults::TAB_WIDTH,
        }
    }
}

/// Logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Minimum level.
    pub level: String,
    /// Log file. Defaults to `meda.log` in the cache directory.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load from the default location, or defaults if there is no file.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`, or defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `$XDG_CONFIG_HOME/meda/config.toml` or the platform equivalent.
    #[must_use]
    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
    }

    /// The configured log file, or `meda.log` in the cache directory.
    #[must_use]
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log
            .file
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join(APP_NAME).join("meda.log")))
    }

    /// The configured log level, `info` if it is not a level name.
    #[must_use]
    pub fn log_level(&self) -> log::LevelFilter {
        self.log.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_config(text: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, text).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.view.h_stride, 8);
        assert_eq!(config.view.h_margin, 2);
        assert_eq!(config.editor.tab_width, 4);
        assert_eq!(config.view.theme, "terminal");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let (_dir, path) = write_config("[view]\nh_stride = 16\n\n[log]\nlevel = \"debug\"\n");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.view.h_stride, 16);
        assert_eq!(config.view.h_margin, 2);
        assert_eq!(config.editor.tab_width, 4);
        assert_eq!(config.log_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn malformed_file_reports_path() {
        let (_dir, path) = write_config("[view\n");
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn wrong_type_is_parse_error() {
        let (_dir, path) = write_config("[editor]\ntab_width = \"wide\"\n");
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let mut config = Config::default();
        config.log.level = "chatty".into();
        assert_eq!(config.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn explicit_log_file_wins() {
        let mut config = Config::default();
        config.log.file = Some(PathBuf::from("/tmp/x.log"));
        assert_eq!(config.log_file(), Some(PathBuf::from("/tmp/x.log")));
    }
}
