//! Checker configuration
//!
//! Settings that tune the type checker, loaded from TOML.
//!
//! # Configuration sources
//!
//! ```text
//! Priority (high → low):
//! 1. Explicit `CheckerConfig` passed by the caller
//! 2. A `mya.toml` file (`[checker]` table)
//! 3. Default values
//! ```
//!
//! # Usage
//!
//! ```rust
//! use mya::util::config::CheckerConfig;
//!
//! let config = CheckerConfig::from_toml_str("strict = false").unwrap();
//! assert!(!config.strict);
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::util::logger::LogLevel;

/// Type checker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Residual monomorphic type variables are errors
    #[serde(default = "default_strict")]
    pub strict: bool,
    /// Upper bound on second-pass rounds over deferred calls
    #[serde(default = "default_max_deferred_rounds")]
    pub max_deferred_rounds: usize,
    /// Log level used by [`crate::util::logger::init_from_config`]
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_strict() -> bool {
    true
}

fn default_max_deferred_rounds() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            strict: default_strict(),
            max_deferred_rounds: default_max_deferred_rounds(),
            log_level: default_log_level(),
        }
    }
}

/// Project file layout: the checker settings live under `[checker]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProjectConfig {
    #[serde(default)]
    checker: Option<CheckerConfig>,
}

impl CheckerConfig {
    /// Parse a bare checker table (`strict = false`, ...)
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::ParseError)
    }

    /// Load from a project file; a missing `[checker]` table yields defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(ConfigError::IoError)?;
        let project: ProjectConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(project.checker.unwrap_or_default())
    }

    /// Load from a project file, or defaults if it doesn't exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Serialize as a project file
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let project = ProjectConfig {
            checker: Some(self.clone()),
        };
        toml::to_string_pretty(&project).map_err(ConfigError::SerializeError)
    }

    /// Parsed log level; unknown names fall back to `Info`
    pub fn log_level(&self) -> LogLevel {
        LogLevel::parse(&self.log_level).unwrap_or(LogLevel::Info)
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(toml::de::Error),
    SerializeError(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Config parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Config serialize error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
