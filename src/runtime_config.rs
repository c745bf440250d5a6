//! # Runtime Configuration Module
//!
//! Settings for the `lazyview` binary and for hosts that want the same
//! defaults.
//!
//! ## Sources
//!
//! Values are layered, later sources winning:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file ([`RuntimeConfig::from_file`])
//! 3. Environment variables
//! 4. Command-line flags (applied by the CLI)
//!
//! ## Environment Variables
//!
//! | Variable | Field |
//! |---|---|
//! | `LAZYVIEW_TEMPLATE_DIR` | `template_dir` |
//! | `LAZYVIEW_MANIFEST` | `manifest` |
//! | `LAZYVIEW_LOG_LEVEL` | `log_level` (default `info`) |
//!
//! ## Example File
//!
//! ```toml
//! template_dir = "templates"
//! manifest = "routes.yaml"
//! log_level = "debug"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

pub const ENV_TEMPLATE_DIR: &str = "LAZYVIEW_TEMPLATE_DIR";
pub const ENV_MANIFEST: &str = "LAZYVIEW_MANIFEST";
pub const ENV_LOG_LEVEL: &str = "LAZYVIEW_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Directory templates are loaded from; in-memory templates only when unset
    pub template_dir: Option<PathBuf>,
    /// Route manifest; the built-in demo routes when unset
    pub manifest: Option<PathBuf>,
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            template_dir: None,
            manifest: None,
            log_level: "info".to_owned(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config '{}': {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse config '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    /// Read a TOML file. Missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// File (when given) overridden by environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Apply `LAZYVIEW_*` overrides from `lookup`. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(dir) = get(ENV_TEMPLATE_DIR) {
            self.template_dir = Some(PathBuf::from(dir));
        }
        if let Some(manifest) = get(ENV_MANIFEST) {
            self.manifest = Some(PathBuf::from(manifest));
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
    }
}
