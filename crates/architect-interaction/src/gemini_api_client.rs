//! GeminiApiClient - Direct REST API implementation for Gemini.
//!
//! One-shot requests go to `:generateContent`; chat replies are streamed from
//! `:streamGenerateContent?alt=sse` and parsed event by event.

use architect_core::config::GeminiConfig;
use architect_core::model_client::{
    ChatRequest, GenerateRequest, ModelClient, ResponseFormat, TextStream,
};
use architect_core::session::{ChatMessage, ChatRole};
use architect_core::{ArchitectError, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Model client that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiApiClient {
    /// Creates a client with the provided API key and base URL.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Creates a client honouring the configured base URL and optional
    /// request timeout. Without a timeout a hung call waits indefinitely.
    pub fn from_config(config: &GeminiConfig, api_key: impl Into<String>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ArchitectError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/{model}:{method}?{}key={api_key}",
            self.base_url,
            if method == "streamGenerateContent" {
                "alt=sse&"
            } else {
                ""
            },
            api_key = self.api_key
        )
    }

    async fn post(&self, url: String, body: &GenerateContentRequest) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                ArchitectError::model(None, format!("Gemini API request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        Ok(response)
    }
}

#[async_trait]
impl ModelClient for GeminiApiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let body = build_generate_body(&request);
        let response = self
            .post(self.endpoint(&request.model, "generateContent"), &body)
            .await?;

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            ArchitectError::model(None, format!("Failed to parse Gemini response: {err}"))
        })?;

        if let Some(error) = parsed.error {
            return Err(error.into_model_error(None));
        }
        Ok(collect_text(&parsed))
    }

    async fn stream_chat(&self, request: ChatRequest) -> Result<TextStream> {
        let body = build_chat_body(&request);
        let response = self
            .post(self.endpoint(&request.model, "streamGenerateContent"), &body)
            .await?;

        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()))
            .boxed();
        Ok(sse_text_stream(bytes))
    }
}

// ============================================================================
// Request building
// ============================================================================

fn build_generate_body(request: &GenerateRequest) -> GenerateContentRequest {
    let mut parts = Vec::new();
    if let Some(image) = &request.image {
        parts.push(Part::InlineData {
            inline_data: InlineDataPayload {
                mime_type: image.mime_type.clone(),
                data: BASE64_STANDARD.encode(&image.data),
            },
        });
    }
    parts.push(Part::Text {
        text: request.prompt.clone(),
    });

    let (response_mime_type, response_schema) = match request.response_format {
        ResponseFormat::Text => (None, None),
        ResponseFormat::StringArray => (
            Some("application/json".to_string()),
            Some(serde_json::json!({
                "type": "ARRAY",
                "items": { "type": "STRING" }
            })),
        ),
    };

    let generation_config = (request.temperature.is_some() || response_mime_type.is_some())
        .then_some(GenerationConfig {
            temperature: request.temperature,
            response_mime_type,
            response_schema,
        });

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        system_instruction: None,
        generation_config,
    }
}

fn build_chat_body(request: &ChatRequest) -> GenerateContentRequest {
    let mut contents: Vec<Content> = request.history.iter().map(Content::from_message).collect();
    contents.push(Content::from_message(&ChatMessage::user(request.message.clone())));

    GenerateContentRequest {
        contents,
        system_instruction: Some(Content {
            role: None,
            parts: vec![Part::Text {
                text: request.system_instruction.clone(),
            }],
        }),
        generation_config: None,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn from_message(message: &ChatMessage) -> Self {
        let role = match message.role {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        };
        Self {
            role: Some(role.to_string()),
            parts: vec![Part::Text {
                text: message.text.clone(),
            }],
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

// ============================================================================
// Response parsing
// ============================================================================

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

impl ErrorBody {
    fn into_model_error(self, status: Option<u16>) -> ArchitectError {
        let message = self.message.unwrap_or_else(|| "Unknown Gemini error".to_string());
        match self.status.filter(|s| !s.is_empty()) {
            Some(status_text) => ArchitectError::model(status, format!("{status_text}: {message}")),
            None => ArchitectError::model(status, message),
        }
    }
}

/// Concatenates the text parts of the first candidate.
fn collect_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .as_ref()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn map_http_error(status: StatusCode, body: String) -> ArchitectError {
    match serde_json::from_str::<ErrorWrapper>(&body) {
        Ok(wrapper) => wrapper.error.into_model_error(Some(status.as_u16())),
        Err(_) => ArchitectError::model(Some(status.as_u16()), body),
    }
}

/// Parses one server-sent-event line.
///
/// Returns `None` for lines that carry no text (comments, blank keep-alives,
/// events with empty deltas).
fn parse_sse_line(line: &str) -> Option<Result<String>> {
    let data = line.trim().strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<GenerateContentResponse>(data) {
        Ok(event) => {
            if let Some(error) = event.error {
                return Some(Err(error.into_model_error(None)));
            }
            let text = collect_text(&event);
            (!text.is_empty()).then_some(Ok(text))
        }
        Err(e) => Some(Err(ArchitectError::model(
            None,
            format!("Malformed Gemini stream event: {e}"),
        ))),
    }
}

struct SseState {
    bytes: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    buffer: Vec<u8>,
    pending: VecDeque<Result<String>>,
    finished: bool,
}

impl SseState {
    /// Moves every complete line out of the buffer. Bytes are buffered until
    /// a newline so multi-byte characters split across chunks stay intact.
    fn drain_lines(&mut self) {
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(item) = parse_sse_line(&String::from_utf8_lossy(&line)) {
                self.pending.push_back(item);
            }
        }
    }
}

fn sse_text_stream(bytes: BoxStream<'static, reqwest::Result<Vec<u8>>>) -> TextStream {
    let state = SseState {
        bytes,
        buffer: Vec::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.extend_from_slice(&chunk);
                    state.drain_lines();
                }
                Some(Err(err)) => {
                    state.finished = true;
                    state.pending.push_back(Err(ArchitectError::model(
                        None,
                        format!("Gemini stream interrupted: {err}"),
                    )));
                }
                None => {
                    state.finished = true;
                    state.buffer.push(b'\n');
                    state.drain_lines();
                }
            }
        }
    })
    .boxed()
}
