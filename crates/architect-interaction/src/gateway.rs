//! GenerationGateway - the only caller of the model client.
//!
//! One-shot failures never escape this type: they are logged and folded into
//! fixed user-facing strings. Chat failures are left to the caller, which
//! owns the visible conversation.

use crate::chat::ChatHandle;
use crate::prompts;
use architect_core::config::GeminiConfig;
use architect_core::model_client::{GenerateRequest, InlineImage, ModelClient, ResponseFormat};
use architect_core::profile::UserProfile;
use architect_core::section::SectionKind;
use architect_core::session::ChatMessage;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Returned when the model call itself fails.
pub const GENERATION_FAILED: &str = "Failed to generate content. Please try again.";
/// Returned when a free-text section comes back empty.
pub const EMPTY_GENERATION: &str = "Error generating content.";
pub const VISION_FAILED: &str = "Could not analyze image.";
pub const DEFAULT_VISION_QUERY: &str = "I am stuck here. What should I do?";
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

#[derive(Clone)]
pub struct GenerationGateway {
    client: Arc<dyn ModelClient>,
    config: GeminiConfig,
}

impl GenerationGateway {
    pub fn new(client: Arc<dyn ModelClient>, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    /// Drafts candidate texts for one section.
    ///
    /// Headlines ask for a JSON array of strings and usually yield several
    /// options; every other kind yields exactly one.
    pub async fn generate_section(&self, profile: &UserProfile, kind: SectionKind) -> Vec<String> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("generate_section", section = kind.as_ref(), %request_id);

        async {
            let prompt = prompts::section_prompt(profile, kind);
            let request = if kind.wants_multiple_options() {
                GenerateRequest::text(&self.config.text_model, prompt)
                    .with_format(ResponseFormat::StringArray)
            } else {
                GenerateRequest::text(&self.config.text_model, prompt)
                    .with_temperature(self.config.temperature)
            };

            match self.client.generate(request).await {
                Ok(raw) if kind.wants_multiple_options() => parse_headline_options(&raw),
                Ok(raw) if raw.is_empty() => {
                    tracing::warn!("Model returned an empty draft");
                    vec![EMPTY_GENERATION.to_string()]
                }
                Ok(raw) => {
                    tracing::info!(chars = raw.len(), "Section drafted");
                    vec![raw]
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Section generation failed");
                    vec![GENERATION_FAILED.to_string()]
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Asks the vision model about a screenshot.
    ///
    /// A blank `query` falls back to a generic plea for help, a blank
    /// `mime_type` to PNG.
    pub async fn analyze_image(&self, image: &[u8], mime_type: &str, query: &str) -> String {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("analyze_image", %request_id, bytes = image.len());

        async {
            let query = match query.trim() {
                "" => DEFAULT_VISION_QUERY,
                q => q,
            };
            let mime_type = match mime_type.trim() {
                "" => DEFAULT_IMAGE_MIME,
                m => m,
            };
            let request =
                GenerateRequest::text(&self.config.vision_model, prompts::vision_prompt(query))
                    .with_image(InlineImage {
                        mime_type: mime_type.to_string(),
                        data: image.to_vec(),
                    });

            match self.client.generate(request).await {
                Ok(answer) if !answer.is_empty() => answer,
                Ok(_) => {
                    tracing::warn!("Vision model returned no text");
                    VISION_FAILED.to_string()
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Screenshot analysis failed");
                    VISION_FAILED.to_string()
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Opens a conversation primed with `system_instruction`, replaying
    /// `history` in order.
    pub fn open_chat(
        &self,
        system_instruction: impl Into<String>,
        history: &[ChatMessage],
    ) -> ChatHandle {
        tracing::debug!(history_len = history.len(), "Opening chat");
        ChatHandle::new(
            self.client.clone(),
            self.config.chat_model.clone(),
            system_instruction,
            history.to_vec(),
        )
    }
}

/// Reads a headline response body.
///
/// An empty body is read as an empty array. Anything that is not a JSON
/// array of strings is kept whole as the single option.
pub fn parse_headline_options(raw: &str) -> Vec<String> {
    let body = if raw.is_empty() { "[]" } else { raw };
    match serde_json::from_str::<Vec<String>>(body) {
        Ok(options) => options,
        Err(e) => {
            tracing::warn!(error = %e, "Headline response is not a string array, keeping raw text");
            vec![raw.to_string()]
        }
    }
}
