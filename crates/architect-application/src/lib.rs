//! Application layer for Profile Architect.
//!
//! `SessionController` owns the one live `Session` and threads every
//! workflow step through it: intake, section approval, finalize, and the
//! post-writing chat. Each accepted mutation is persisted immediately.

pub mod controller;
pub mod conversation;
pub mod screen;

pub use architect_interaction::ReplyEnd;
pub use controller::SessionController;
pub use conversation::{CHAT_ERROR, welcome_message};
pub use screen::Screen;
