//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: the persisted `Session` record and its `View` marker
//! - `message`: chat history types (`ChatRole`, `ChatMessage`)

mod message;
mod model;

pub use message::{ChatMessage, ChatRole};
pub use model::{Session, View};
