//! Secret loading.
//!
//! The Gemini API key comes from the environment (`GEMINI_API_KEY`, then
//! `API_KEY`) or from `secret.json`.

use crate::paths::ArchitectPaths;
use architect_core::config::SecretConfig;
use architect_core::{ArchitectError, Result};
use std::fs;
use std::path::PathBuf;

const ENV_KEYS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone)]
pub struct SecretService {
    path: PathBuf,
}

impl SecretService {
    pub fn new(paths: &ArchitectPaths) -> Result<Self> {
        Ok(Self {
            path: paths.secret_file()?,
        })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Reads `secret.json`, returning an empty config when it is absent.
    pub fn load_secrets(&self) -> Result<SecretConfig> {
        if !self.path.exists() {
            return Ok(SecretConfig::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(SecretConfig::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Resolves the Gemini API key from the process environment or the file.
    pub fn gemini_api_key(&self) -> Result<String> {
        let secrets = self.load_secrets()?;
        resolve_api_key(&secrets, |name| std::env::var(name).ok())
    }
}

/// Environment variables win over the file; blank values are ignored.
pub fn resolve_api_key<F>(secrets: &SecretConfig, env: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    ENV_KEYS
        .into_iter()
        .filter_map(|name| env(name))
        .chain(secrets.gemini.as_ref().map(|g| g.api_key.clone()))
        .find(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            ArchitectError::config(
                "Gemini API key not found; set GEMINI_API_KEY or add gemini.api_key to secret.json",
            )
        })
}
