//! Multi-turn chat handle and its streamed reply.

use architect_core::Result;
use architect_core::model_client::{ChatRequest, ModelClient, TextStream};
use architect_core::session::ChatMessage;
use futures::{Stream, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
use tracing::Instrument;

/// An open conversation primed with a system instruction.
///
/// The handle keeps its own replay history. It only grows when a reply
/// finishes (or is cancelled after producing text), so a failed turn can be
/// resent without the model seeing a dangling user message.
pub struct ChatHandle {
    client: Arc<dyn ModelClient>,
    model: String,
    system_instruction: String,
    history: Vec<ChatMessage>,
}

impl ChatHandle {
    pub(crate) fn new(
        client: Arc<dyn ModelClient>,
        model: impl Into<String>,
        system_instruction: impl Into<String>,
        history: Vec<ChatMessage>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            system_instruction: system_instruction.into(),
            history,
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Sends one user turn and returns its reply as a lazy chunk sequence.
    ///
    /// Errors opening the stream are returned here. The returned stream is
    /// one-shot; cancelling `cancel` ends it early.
    pub async fn send_streaming(
        &mut self,
        text: impl Into<String>,
        cancel: CancellationToken,
    ) -> Result<ReplyStream<'_>> {
        let message = text.into();
        let request = ChatRequest {
            model: self.model.clone(),
            system_instruction: self.system_instruction.clone(),
            history: self.history.clone(),
            message: message.clone(),
        };

        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("chat_turn", %request_id, history_len = self.history.len());
        let chunks = self.client.stream_chat(request).instrument(span).await?;

        Ok(ReplyStream {
            handle: self,
            message,
            chunks,
            cancelled: Box::pin(cancel.cancelled_owned()),
            reply: String::new(),
            end: None,
        })
    }
}

/// How a reply stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyEnd {
    Completed,
    Cancelled,
    Failed,
}

/// Streamed model reply for one chat turn.
///
/// Yields text fragments in arrival order. A failure is yielded once as an
/// `Err` item and ends the stream.
pub struct ReplyStream<'a> {
    handle: &'a mut ChatHandle,
    message: String,
    chunks: TextStream,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    reply: String,
    end: Option<ReplyEnd>,
}

impl ReplyStream<'_> {
    /// Text accumulated so far.
    pub fn reply(&self) -> &str {
        &self.reply
    }

    /// `None` while the stream is still open.
    pub fn end(&self) -> Option<ReplyEnd> {
        self.end
    }

    fn finish(&mut self, end: ReplyEnd) {
        self.end = Some(end);
        let keep = match end {
            ReplyEnd::Completed => true,
            ReplyEnd::Cancelled => !self.reply.is_empty(),
            ReplyEnd::Failed => false,
        };
        if keep {
            self.handle
                .history
                .push(ChatMessage::user(std::mem::take(&mut self.message)));
            self.handle.history.push(ChatMessage::model(self.reply.clone()));
        }
        tracing::debug!(?end, reply_len = self.reply.len(), "Chat reply finished");
    }
}

impl Stream for ReplyStream<'_> {
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.end.is_some() {
            return Poll::Ready(None);
        }

        loop {
            if this.cancelled.as_mut().poll(cx).is_ready() {
                this.finish(ReplyEnd::Cancelled);
                return Poll::Ready(None);
            }

            match this.chunks.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(chunk))) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    tracing::trace!(chunk_len = chunk.len(), "Chat chunk");
                    this.reply.push_str(&chunk);
                    return Poll::Ready(Some(Ok(chunk)));
                }
                Poll::Ready(Some(Err(err))) => {
                    this.finish(ReplyEnd::Failed);
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => {
                    this.finish(ReplyEnd::Completed);
                    return Poll::Ready(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedModelClient, ScriptedReply};
    use architect_core::ArchitectError;

    fn handle(client: Arc<ScriptedModelClient>, history: Vec<ChatMessage>) -> ChatHandle {
        ChatHandle::new(client, "gemini-2.5-flash", "You are the ghostwriter", history)
    }

    #[tokio::test]
    async fn completed_reply_is_added_to_replay_history() {
        let client = Arc::new(ScriptedModelClient::new());
        client.push_chat(ScriptedReply::chunks(["Hel", "lo", " there"]));
        let mut chat = handle(client.clone(), vec![ChatMessage::model("Welcome")]);

        let mut stream = chat
            .send_streaming("Write about mornings", CancellationToken::new())
            .await
            .unwrap();
        let mut pieces = Vec::new();
        while let Some(chunk) = stream.next().await {
            pieces.push(chunk.unwrap());
        }
        assert_eq!(stream.end(), Some(ReplyEnd::Completed));
        assert_eq!(stream.reply(), "Hello there");
        drop(stream);

        assert_eq!(pieces, vec!["Hel", "lo", " there"]);
        assert_eq!(
            chat.history(),
            &[
                ChatMessage::model("Welcome"),
                ChatMessage::user("Write about mornings"),
                ChatMessage::model("Hello there"),
            ]
        );

        let sent = client.chat_requests();
        assert_eq!(sent[0].system_instruction, "You are the ghostwriter");
        assert_eq!(sent[0].history, vec![ChatMessage::model("Welcome")]);
        assert_eq!(sent[0].message, "Write about mornings");
    }

    #[tokio::test]
    async fn failed_reply_leaves_history_untouched() {
        let client = Arc::new(ScriptedModelClient::new());
        client.push_chat(ScriptedReply::Chunks(vec![
            Ok("Hel".to_string()),
            Err(ArchitectError::model(None, "reset")),
        ]));
        let mut chat = handle(client, Vec::new());

        let mut stream = chat.send_streaming("hi", CancellationToken::new()).await.unwrap();
        assert_eq!(stream.next().await, Some(Ok("Hel".to_string())));
        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
        assert_eq!(stream.end(), Some(ReplyEnd::Failed));
        drop(stream);

        assert!(chat.history().is_empty());
    }

    #[tokio::test]
    async fn open_error_is_returned_from_send() {
        let client = Arc::new(ScriptedModelClient::new());
        client.push_chat(ScriptedReply::OpenError(ArchitectError::model(Some(403), "denied")));
        let mut chat = handle(client, Vec::new());

        let result = chat.send_streaming("hi", CancellationToken::new()).await;
        assert!(matches!(result, Err(ArchitectError::Model { status: Some(403), .. })));
    }

    #[tokio::test]
    async fn cancellation_ends_a_stalled_stream_and_keeps_partial_text() {
        let client = Arc::new(ScriptedModelClient::new());
        client.push_chat(ScriptedReply::Stalled(vec!["Partial".to_string()]));
        let mut chat = handle(client, Vec::new());
        let cancel = CancellationToken::new();

        let mut stream = chat.send_streaming("hi", cancel.clone()).await.unwrap();
        assert_eq!(stream.next().await, Some(Ok("Partial".to_string())));
        cancel.cancel();
        assert!(stream.next().await.is_none());
        assert_eq!(stream.end(), Some(ReplyEnd::Cancelled));
        drop(stream);

        assert_eq!(
            chat.history(),
            &[ChatMessage::user("hi"), ChatMessage::model("Partial")]
        );
    }

    #[tokio::test]
    async fn cancellation_before_any_text_records_nothing() {
        let client = Arc::new(ScriptedModelClient::new());
        client.push_chat(ScriptedReply::Stalled(Vec::new()));
        let mut chat = handle(client, Vec::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut stream = chat.send_streaming("hi", cancel).await.unwrap();
        assert!(stream.next().await.is_none());
        assert_eq!(stream.end(), Some(ReplyEnd::Cancelled));
        drop(stream);

        assert!(chat.history().is_empty());
    }
}
