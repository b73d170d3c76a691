//! Configuration service.
//!
//! Loads `RootConfig` from `config.toml`. A missing or empty file means
//! defaults; a file that does not parse is a configuration error.

use crate::paths::ArchitectPaths;
use architect_core::config::RootConfig;
use architect_core::{ArchitectError, Result};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(paths: &ArchitectPaths) -> Result<Self> {
        Ok(Self {
            path: paths.config_file()?,
        })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<RootConfig> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No config file, using defaults");
            return Ok(RootConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(RootConfig::default());
        }

        toml::from_str(&content).map_err(|e| {
            ArchitectError::config(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}
