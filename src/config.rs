use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::eval::Mode;
use crate::rules::PatternError;

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// Where the user's configuration lives unless `--config` says otherwise.
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/cc-patterngate/config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub allow: Vec<PatternEntry>,
    #[serde(default)]
    pub deny: Vec<PatternEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    /// `smart`, `yolo`, or anything else for paranoid.
    #[serde(default = "default_mode")]
    pub mode: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: default_mode(),
        }
    }
}

fn default_mode() -> String {
    Mode::Smart.as_str().to_string()
}

/// One `[[allow]]` or `[[deny]]` table. Tables without `pattern` are ignored.
#[derive(Debug, Deserialize, Serialize)]
pub struct PatternEntry {
    #[serde(default)]
    pub pattern: Option<String>,
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Parse configuration text. `origin` only labels errors.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Resolve configuration with this order:
    /// 1. An explicit path, which must exist
    /// 2. `~/.config/cc-patterngate/config.toml`, if present
    /// 3. The embedded defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default_path = expand_path(DEFAULT_CONFIG_PATH);
        if default_path.is_file() {
            return Self::load(&default_path);
        }
        Ok(Self::default_config())
    }

    /// Allow patterns in configured order.
    pub fn allow_patterns(&self) -> Vec<&str> {
        self.allow.iter().filter_map(|e| e.pattern.as_deref()).collect()
    }

    /// Deny patterns in configured order.
    pub fn deny_patterns(&self) -> Vec<&str> {
        self.deny.iter().filter_map(|e| e.pattern.as_deref()).collect()
    }

    pub fn mode(&self) -> Mode {
        let mode = Mode::parse(&self.settings.mode);
        if mode == Mode::Paranoid && self.settings.mode != Mode::Paranoid.as_str() {
            warn!(
                "unknown mode {:?}, treating it as paranoid",
                self.settings.mode
            );
        }
        mode
    }
}
