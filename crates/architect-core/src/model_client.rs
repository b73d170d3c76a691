//! Language model collaborator.
//!
//! The generation gateway is the only caller of this trait. Implementations
//! talk to a concrete provider; the shapes below are the whole wire boundary.

use crate::error::Result;
use crate::session::ChatMessage;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Ordered text fragments of a streamed reply. Concatenating them in arrival
/// order reconstructs the full reply.
pub type TextStream = BoxStream<'static, Result<String>>;

/// What shape of response body a one-shot request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Free text, used verbatim.
    #[default]
    Text,
    /// A JSON array of strings. The model is not guaranteed to comply, so
    /// callers still parse defensively.
    StringArray,
}

/// Image bytes sent inline with a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// Declared media type, e.g. `image/png`
    pub mime_type: String,
    /// Raw bytes (not base64, not data-URL prefixed)
    pub data: Vec<u8>,
}

/// A one-shot generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub image: Option<InlineImage>,
    pub response_format: ResponseFormat,
    pub temperature: Option<f32>,
}

impl GenerateRequest {
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            image: None,
            response_format: ResponseFormat::Text,
            temperature: None,
        }
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// One turn of a multi-turn conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    /// Set once when the conversation is opened
    pub system_instruction: String,
    /// Prior turns, chronological and role-preserving
    pub history: Vec<ChatMessage>,
    /// The new user turn
    pub message: String,
}

/// An external language model that can answer one-shot prompts and stream
/// chat replies.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends a one-shot request and returns the full response text.
    async fn generate(&self, request: GenerateRequest) -> Result<String>;

    /// Opens a streamed chat reply. Errors before the first fragment are
    /// returned here; later failures arrive as `Err` items in the stream.
    async fn stream_chat(&self, request: ChatRequest) -> Result<TextStream>;
}
