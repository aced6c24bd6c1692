//! Store configuration
//!
//! Loaded from a YAML file, then overridden by environment variables:
//! - `JSONDB_PATH`: backing file
//! - `JSONDB_INDENT`: pretty-print indent width

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};

pub const ENV_PATH: &str = "JSONDB_PATH";
pub const ENV_INDENT: &str = "JSONDB_INDENT";

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backing JSON file
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Indent width for pretty-printed writes
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Serialize read-modify-write cycles on the same path within this process
    #[serde(default = "default_true")]
    pub lock: bool,
}

fn default_path() -> PathBuf {
    PathBuf::from("jsondb.json")
}

fn default_indent() -> usize {
    4
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            indent: default_indent(),
            lock: true,
        }
    }
}

impl StoreConfig {
    /// Default configuration for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Apply `JSONDB_PATH` / `JSONDB_INDENT` from the process environment.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = lookup(ENV_PATH).filter(|p| !p.is_empty()) {
            self.path = PathBuf::from(path);
        }
        if let Some(indent) = lookup(ENV_INDENT) {
            self.indent = indent.trim().parse().map_err(|_| {
                StoreError::Config(format!("{} must be a positive integer, got '{}'", ENV_INDENT, indent))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.indent == 0 {
            return Err(StoreError::Config("indent must be at least 1".to_string()));
        }
        if self.path.as_os_str().is_empty() {
            return Err(StoreError::Config("path must not be empty".to_string()));
        }
        Ok(())
    }
}
