//! Everything that talks to the language model.
//!
//! - `gemini_api_client`: `ModelClient` over the Gemini REST API
//! - `prompts`: prompt text per section kind and for screenshot help
//! - `gateway`: `GenerationGateway`, the only caller of the model client
//! - `chat`: `ChatHandle` and its streamed `ReplyStream`

pub mod chat;
pub mod gateway;
pub mod gemini_api_client;
pub mod prompts;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use chat::{ChatHandle, ReplyEnd, ReplyStream};
pub use gateway::GenerationGateway;
pub use gemini_api_client::GeminiApiClient;
