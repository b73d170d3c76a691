pub mod config_service;
pub mod paths;
pub mod secret_service;
pub mod session_store;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::paths::ArchitectPaths;
pub use crate::secret_service::SecretService;
pub use crate::session_store::{SESSION_KEY_PREFIX, SessionStore};
pub use crate::storage::{FileKeyValueStore, InMemoryKeyValueStore};
