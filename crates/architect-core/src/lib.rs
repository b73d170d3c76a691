pub mod config;
pub mod error;
pub mod model_client;
pub mod persona;
pub mod profile;
pub mod section;
pub mod session;
pub mod storage;

// Re-export common error type
pub use error::{ArchitectError, Result};
