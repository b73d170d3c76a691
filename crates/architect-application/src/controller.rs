//! SessionController - the single owner of a logged-in session.

use crate::conversation::{CHAT_ERROR, welcome_message};
use crate::screen::Screen;
use architect_core::persona;
use architect_core::profile::ProfileFields;
use architect_core::section::{Section, SectionKind, approved_selections};
use architect_core::session::{ChatMessage, Session, View};
use architect_core::{ArchitectError, Result};
use architect_infrastructure::SessionStore;
use architect_interaction::{ChatHandle, GenerationGateway, ReplyEnd};
use futures::StreamExt;
use futures::future::{self, Either};
use tokio_util::sync::CancellationToken;

/// Live conversation and the instruction it was opened with.
struct ActiveChat {
    instruction: String,
    handle: ChatHandle,
}

/// Coordinates every workflow step for one session.
///
/// # Responsibilities
///
/// - Restoring or creating the session on login
/// - Profile intake and the per-section approval state machine
/// - Compiling the persona on finalize
/// - The post-writing chat and its persisted mirror
///
/// Every accepted mutation overwrites the stored record. Operations take
/// `&mut self`, so two generations for the same session cannot overlap.
pub struct SessionController {
    session: Session,
    store: SessionStore,
    gateway: GenerationGateway,
    chat: Option<ActiveChat>,
}

impl SessionController {
    /// Restores the session stored under `handle`, or starts a new one.
    ///
    /// The handle is trimmed; an empty handle is rejected. In-progress flags
    /// left over from an interrupted run are cleared.
    pub fn login(store: SessionStore, gateway: GenerationGateway, handle: &str) -> Result<Self> {
        let id = handle.trim();
        if id.is_empty() {
            return Err(ArchitectError::validation("Session handle must not be empty"));
        }

        let mut session = match store.load(id)? {
            Some(session) => {
                tracing::info!(session_id = %id, view = %session.view, "Restored session");
                session
            }
            None => {
                tracing::info!(session_id = %id, "Starting new session");
                Session::new(id)
            }
        };
        session.normalize_sections();
        session.clear_transient_flags();

        let mut controller = Self {
            session,
            store,
            gateway,
            chat: None,
        };
        controller.persist()?;
        Ok(controller)
    }

    /// Leaves the session. Nothing is deleted; logging in with the same
    /// handle restores it.
    pub fn logout(self) {
        tracing::info!(session_id = %self.session.id, "Logged out");
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.session.section(kind)
    }

    // ------------------------------------------------------------------
    // Profile intake
    // ------------------------------------------------------------------

    /// Captures the onboarding form and moves on to the profile builder.
    pub fn submit_profile(&mut self, fields: ProfileFields) -> Result<()> {
        let profile = fields.into_profile()?;
        self.session.profile = Some(profile);
        self.session.view = View::ProfileBuilder;
        self.persist()
    }

    // ------------------------------------------------------------------
    // Section approval
    // ------------------------------------------------------------------

    /// Replaces a section's options with a fresh draft. Returns `false` if
    /// `cancel` fired first; the previous options are then kept.
    ///
    /// Model failures do not error; they come back as a single option
    /// holding the fallback text.
    pub async fn generate_section(
        &mut self,
        kind: SectionKind,
        cancel: CancellationToken,
    ) -> Result<bool> {
        let profile = self.session.profile.clone().ok_or_else(|| {
            ArchitectError::missing_precondition("Complete the profile intake before generating")
        })?;

        self.section_mut(kind)?.begin_generation()?;
        if let Err(e) = self.persist() {
            self.section_mut(kind)?.clear_loading();
            return Err(e);
        }

        let drafted = {
            let cancelled = cancel.cancelled();
            let drafting = self.gateway.generate_section(&profile, kind);
            futures::pin_mut!(cancelled, drafting);
            match future::select(cancelled, drafting).await {
                Either::Left(_) => None,
                Either::Right((options, _)) => Some(options),
            }
        };

        let Some(options) = drafted else {
            tracing::debug!(section = kind.as_ref(), "Draft cancelled");
            self.section_mut(kind)?.clear_loading();
            self.persist()?;
            return Ok(false);
        };
        tracing::debug!(section = kind.as_ref(), count = options.len(), "Draft ready");

        self.section_mut(kind)?.complete_generation(options);
        self.persist()?;
        Ok(true)
    }

    pub fn select_option(&mut self, kind: SectionKind, index: usize) -> Result<()> {
        self.section_mut(kind)?.select(index)?;
        self.persist()
    }

    pub fn edit_option(&mut self, kind: SectionKind, index: usize, text: &str) -> Result<()> {
        self.section_mut(kind)?.edit_option(index, text)?;
        self.persist()
    }

    /// Flips approval and returns the new state.
    pub fn toggle_approve(&mut self, kind: SectionKind) -> Result<bool> {
        let approved = self.section_mut(kind)?.toggle_approve()?;
        self.persist()?;
        Ok(approved)
    }

    /// Compiles the persona from the approved sections and opens the chat
    /// view.
    ///
    /// # Errors
    ///
    /// `IncompleteSections` naming every required section that is not
    /// approved with a selection. The session is left untouched.
    pub fn finalize(&mut self) -> Result<()> {
        let profile = self.session.profile.as_ref().ok_or_else(|| {
            ArchitectError::missing_precondition("Complete the profile intake before finalizing")
        })?;
        let selections = approved_selections(&self.session.sections)?;
        let instruction = persona::compile_selections(profile, &selections);

        tracing::info!(session_id = %self.session.id, "Persona compiled");
        self.session.persona_instruction = Some(instruction);
        self.session.view = View::PostWriter;
        self.persist()
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Stores the view marker as given. Presentation fallbacks are applied
    /// by [`SessionController::screen`], not here.
    pub fn set_view(&mut self, view: View) -> Result<()> {
        self.session.view = view;
        self.persist()
    }

    /// Chat once a persona exists, otherwise the profile builder.
    pub fn home_view(&self) -> View {
        if self.session.has_persona() {
            View::PostWriter
        } else {
            View::ProfileBuilder
        }
    }

    /// Views offered for navigation. Empty until the profile is captured.
    pub fn available_views(&self) -> Vec<View> {
        if self.session.profile.is_none() {
            return Vec::new();
        }
        let mut views = vec![View::ProfileBuilder, View::Troubleshooter];
        if self.session.has_persona() {
            views.push(View::PostWriter);
        }
        views
    }

    pub fn screen(&self) -> Screen {
        Screen::for_session(&self.session)
    }

    /// Follows the recovery action of the current screen, if it has one.
    /// Returns the view now stored.
    pub fn recover(&mut self) -> Result<View> {
        if let Screen::MissingPersona { recovery } = self.screen() {
            self.set_view(recovery)?;
        }
        Ok(self.session.view)
    }

    // ------------------------------------------------------------------
    // Troubleshooter
    // ------------------------------------------------------------------

    /// Asks the vision model about a screenshot. Does not touch the session.
    pub async fn analyze_screenshot(&self, image: &[u8], mime_type: &str, query: &str) -> String {
        self.gateway.analyze_image(image, mime_type, query).await
    }

    // ------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------

    /// Opens the conversation if it is not open for the current persona.
    ///
    /// A new persona instruction always reopens it with the full stored
    /// history. An empty history gets a local welcome message, persisted
    /// right away.
    pub fn ensure_chat(&mut self) -> Result<()> {
        let instruction = self.session.persona_instruction.clone().ok_or_else(|| {
            ArchitectError::missing_precondition(
                "Strategy not finalized. Approve your profile sections first.",
            )
        })?;
        if self
            .chat
            .as_ref()
            .is_some_and(|chat| chat.instruction == instruction)
        {
            return Ok(());
        }

        let profile = self.session.profile.as_ref().ok_or_else(|| {
            ArchitectError::missing_precondition("Complete the profile intake before chatting")
        })?;
        let welcome = welcome_message(profile);

        let handle = self
            .gateway
            .open_chat(instruction.clone(), &self.session.chat_history);
        self.chat = Some(ActiveChat {
            instruction,
            handle,
        });

        if self.session.chat_history.is_empty() {
            self.session.chat_history.push(welcome);
            self.persist()?;
        }
        Ok(())
    }

    /// Sends one user turn and streams the reply into the history.
    ///
    /// The user turn is persisted before the model is called. `on_update`
    /// sees the growing model message after every chunk, and the error
    /// message if the stream fails. The reply is persisted once, when the
    /// stream completes or is cancelled with text; a failed reply is
    /// replaced by [`CHAT_ERROR`] in memory and never persisted as a partial
    /// message.
    pub async fn send_message<F>(
        &mut self,
        text: &str,
        cancel: CancellationToken,
        mut on_update: F,
    ) -> Result<ReplyEnd>
    where
        F: FnMut(&ChatMessage),
    {
        let text = text.trim();
        if text.is_empty() {
            return Err(ArchitectError::validation("Message must not be empty"));
        }
        self.ensure_chat()?;

        self.session.chat_history.push(ChatMessage::user(text));
        self.persist()?;

        let chat = self
            .chat
            .as_mut()
            .ok_or_else(|| ArchitectError::internal("Chat was not opened"))?;
        let history = &mut self.session.chat_history;

        let mut stream = match chat.handle.send_streaming(text, cancel).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                history.push(ChatMessage::model(CHAT_ERROR));
                if let Some(last) = history.last() {
                    on_update(last);
                }
                return Ok(ReplyEnd::Failed);
            }
        };

        history.push(ChatMessage::model(""));
        while let Some(item) = stream.next().await {
            let Some(placeholder) = history.last_mut() else {
                break;
            };
            match item {
                Ok(chunk) => placeholder.text.push_str(&chunk),
                Err(e) => {
                    tracing::warn!(error = %e, "Chat stream failed");
                    placeholder.text = CHAT_ERROR.to_string();
                }
            }
            on_update(placeholder);
        }

        let end = stream.end().unwrap_or(ReplyEnd::Completed);
        drop(stream);

        match end {
            ReplyEnd::Failed => Ok(end),
            ReplyEnd::Cancelled if history.last().is_some_and(|m| m.text.is_empty()) => {
                history.pop();
                Ok(end)
            }
            ReplyEnd::Completed | ReplyEnd::Cancelled => {
                self.persist()?;
                Ok(end)
            }
        }
    }

    fn section_mut(&mut self, kind: SectionKind) -> Result<&mut Section> {
        self.session
            .section_mut(kind)
            .ok_or_else(|| ArchitectError::not_found("section", kind.as_ref()))
    }

    fn persist(&mut self) -> Result<()> {
        self.session.touch();
        self.store.save(&self.session)
    }
}
