//! Key-value persistence collaborator.

use crate::error::Result;

/// A synchronous, string-keyed store scoped to one user's device.
///
/// Writes overwrite the whole value. There is no versioning and no merge:
/// the last writer wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// All keys currently stored, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;
}
