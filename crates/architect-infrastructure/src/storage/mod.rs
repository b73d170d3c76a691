//! Key-value store backends.

mod atomic_file;
mod file_store;
mod memory_store;

pub use atomic_file::AtomicTextFile;
pub use file_store::FileKeyValueStore;
pub use memory_store::InMemoryKeyValueStore;
