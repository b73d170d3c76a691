//! Unified path management for Profile Architect files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/profile-architect/        # Config directory
//! ├── config.toml                     # Model and storage settings
//! └── secret.json                     # API keys
//!
//! ~/.local/share/profile-architect/   # Data directory
//! └── sessions/                       # One record per session key
//! ```
//!
//! Passing a base directory roots everything under it instead, which keeps
//! tests off the real home directory.

use architect_core::{ArchitectError, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "profile-architect";

/// Resolves every path the application reads or writes.
#[derive(Debug, Clone, Default)]
pub struct ArchitectPaths {
    base: Option<PathBuf>,
}

impl ArchitectPaths {
    /// Creates a resolver. `None` uses the platform config/data directories.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the configuration directory (e.g., `~/.config/profile-architect/`).
    pub fn config_dir(&self) -> Result<PathBuf> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| ArchitectError::config("Cannot find config directory")),
        }
    }

    /// Returns the data directory (e.g., `~/.local/share/profile-architect/`).
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| ArchitectError::config("Cannot find data directory")),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Keep this file readable by the current user only.
    pub fn secret_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    pub fn sessions_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("sessions"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_override_roots_every_path() {
        let base = Path::new("/tmp/architect-test");
        let paths = ArchitectPaths::new(Some(base));
        assert_eq!(paths.config_file().unwrap(), base.join("config.toml"));
        assert_eq!(paths.secret_file().unwrap(), base.join("secret.json"));
        assert_eq!(paths.sessions_dir().unwrap(), base.join("sessions"));
    }
}
