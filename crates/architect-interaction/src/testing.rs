//! Scripted `ModelClient` for tests that must not touch the network.

use architect_core::model_client::{ChatRequest, GenerateRequest, ModelClient, TextStream};
use architect_core::{ArchitectError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Canned outcome of one `stream_chat` call.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Items yielded in order, then the stream ends
    Chunks(Vec<Result<String>>),
    /// Chunks yielded in order, then the stream never ends on its own
    Stalled(Vec<String>),
    /// `stream_chat` itself fails
    OpenError(ArchitectError),
}

impl ScriptedReply {
    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Chunks(chunks.into_iter().map(|c| Ok(c.into())).collect())
    }
}

/// Replays queued responses and records every request it receives.
///
/// An exhausted queue answers with a model error.
#[derive(Default)]
pub struct ScriptedModelClient {
    generate_queue: Mutex<VecDeque<Result<String>>>,
    chat_queue: Mutex<VecDeque<ScriptedReply>>,
    generate_log: Mutex<Vec<GenerateRequest>>,
    chat_log: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModelClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_generate(&self, response: Result<String>) {
        self.generate_queue
            .lock()
            .expect("generate queue poisoned")
            .push_back(response);
    }

    pub fn push_chat(&self, reply: ScriptedReply) {
        self.chat_queue
            .lock()
            .expect("chat queue poisoned")
            .push_back(reply);
    }

    pub fn generate_requests(&self) -> Vec<GenerateRequest> {
        self.generate_log.lock().expect("generate log poisoned").clone()
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_log.lock().expect("chat log poisoned").clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        self.generate_log
            .lock()
            .expect("generate log poisoned")
            .push(request);
        self.generate_queue
            .lock()
            .expect("generate queue poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(ArchitectError::model(None, "no scripted response")))
    }

    async fn stream_chat(&self, request: ChatRequest) -> Result<TextStream> {
        self.chat_log.lock().expect("chat log poisoned").push(request);
        let reply = self
            .chat_queue
            .lock()
            .expect("chat queue poisoned")
            .pop_front()
            .unwrap_or_else(|| ScriptedReply::OpenError(ArchitectError::model(None, "no scripted reply")));

        match reply {
            ScriptedReply::Chunks(items) => Ok(stream::iter(items).boxed()),
            ScriptedReply::Stalled(chunks) => Ok(stream::iter(chunks.into_iter().map(Ok))
                .chain(stream::pending())
                .boxed()),
            ScriptedReply::OpenError(err) => Err(err),
        }
    }
}
