//! Session persistence over a key-value store.

use architect_core::Result;
use architect_core::session::Session;
use architect_core::storage::KeyValueStore;
use std::sync::Arc;

/// Namespace prefix keeping session records apart from unrelated data.
pub const SESSION_KEY_PREFIX: &str = "linkedin_ai_";

/// Reads and writes whole `Session` records.
///
/// The key is the prefix concatenated with the session id, unnormalized.
/// Every save overwrites the full record; the last writer wins.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn key_for(id: &str) -> String {
        format!("{SESSION_KEY_PREFIX}{id}")
    }

    /// Loads a session by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: No record, the caller should start a new session
    /// - `Err(_)`: The record could not be read or parsed
    pub fn load(&self, id: &str) -> Result<Option<Session>> {
        match self.store.get(&Self::key_for(id))? {
            Some(raw) => {
                let session: Session = serde_json::from_str(&raw)?;
                tracing::debug!(session_id = %id, "Loaded session record");
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        self.store.set(&Self::key_for(&session.id), &raw)
    }

    /// Ids of every stored session that can be read, sorted.
    ///
    /// Records that fail to parse are skipped with a warning.
    pub fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for key in self.store.keys()? {
            if !key.starts_with(SESSION_KEY_PREFIX) {
                continue;
            }
            let Some(raw) = self.store.get(&key)? else {
                continue;
            };
            match serde_json::from_str::<Session>(&raw) {
                Ok(session) => ids.push(session.id),
                Err(e) => tracing::warn!(key = %key, error = %e, "Skipping unreadable session record"),
            }
        }
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryKeyValueStore;

    #[test]
    fn key_is_exact_prefix_concatenation() {
        assert_eq!(SessionStore::key_for("Acme Corp"), "linkedin_ai_Acme Corp");
    }

    #[test]
    fn missing_record_is_not_an_error() {
        let store = SessionStore::new(Arc::new(InMemoryKeyValueStore::new()));
        assert!(store.load("nobody").unwrap().is_none());
    }

    #[test]
    fn malformed_record_is_a_serialization_error() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        kv.set("linkedin_ai_broken", "{not json").unwrap();
        let store = SessionStore::new(kv);

        let err = store.load("broken").unwrap_err();
        assert!(matches!(err, architect_core::ArchitectError::Serialization { .. }));
        assert!(store.list_ids().unwrap().is_empty());
    }

    #[test]
    fn list_ids_ignores_foreign_keys() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        kv.set("theme", "dark").unwrap();
        let store = SessionStore::new(kv);
        store.save(&Session::new("beta")).unwrap();
        store.save(&Session::new("Acme")).unwrap();

        assert_eq!(store.list_ids().unwrap(), vec!["Acme".to_string(), "beta".to_string()]);
    }
}
