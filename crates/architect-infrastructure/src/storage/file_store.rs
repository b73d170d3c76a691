//! Directory-backed key-value store.

use super::atomic_file::AtomicTextFile;
use architect_core::Result;
use architect_core::storage::KeyValueStore;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

const RECORD_EXTENSION: &str = "json";

/// Longest file stem written as-is. Leaves room under the common 255-byte
/// name limit for the extension and the `.tmp`/`.lock` siblings.
const MAX_STEM_LEN: usize = 200;
/// Bytes of the normalized key kept in front of the digest for long keys.
const LONG_STEM_PREFIX: usize = 128;

/// Stores each key as one file in a directory.
///
/// Keys are normalized into file names: every character outside
/// `[A-Za-z0-9._-]` becomes `_`. Two keys with the same normalized form share
/// a file; that collision is not detected. Names longer than 200 bytes are
/// cut to a prefix followed by the SHA-256 of the full key.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, key: &str) -> AtomicTextFile {
        AtomicTextFile::new(
            self.dir
                .join(format!("{}.{RECORD_EXTENSION}", normalize_key(key))),
        )
    }
}

/// Maps a key to a file-system safe name of bounded length.
pub(crate) fn normalize_key(key: &str) -> String {
    let normalized: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if normalized.len() <= MAX_STEM_LEN {
        return normalized;
    }
    // Normalized keys are ASCII, so any byte offset is a char boundary.
    format!(
        "{}-{:x}",
        &normalized[..LONG_STEM_PREFIX],
        Sha256::digest(key.as_bytes())
    )
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.file_for(key).load()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let file = self.file_for(key);
        tracing::debug!(path = %file.path().display(), bytes = value.len(), "Writing record");
        file.save(value)
    }

    /// Returns normalized keys (file stems), since the original spelling is
    /// not recoverable from the file name.
    fn keys(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
