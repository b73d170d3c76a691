//! Session domain model.

use super::message::ChatMessage;
use crate::profile::UserProfile;
use crate::section::{Section, SectionKind, default_sections};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Which workflow step is currently presented.
///
/// Not validated against session completeness; presentation applies
/// fallback rules instead (missing profile forces onboarding, a chat view
/// without a persona shows a recovery screen).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum View {
    #[default]
    Onboarding,
    ProfileBuilder,
    Troubleshooter,
    PostWriter,
}

/// Everything the wizard knows about one business handle.
///
/// One record per id, overwritten wholesale on every save. The field names
/// match the browser storage record so existing records keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// User-supplied handle (business name or similar)
    pub id: String,
    #[serde(rename = "userData")]
    pub profile: Option<UserProfile>,
    pub sections: Vec<Section>,
    /// Compiled persona instruction for the chat model
    #[serde(rename = "masterSystemInstruction")]
    pub persona_instruction: Option<String>,
    pub chat_history: Vec<ChatMessage>,
    #[serde(rename = "lastActiveView")]
    pub view: View,
    /// Refreshed by the controller before each save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates the zero-state session for a handle seen for the first time.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            profile: None,
            sections: default_sections(),
            persona_instruction: None,
            chat_history: Vec::new(),
            view: View::Onboarding,
            updated_at: None,
        }
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind() == kind)
    }

    pub fn section_mut(&mut self, kind: SectionKind) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.kind() == kind)
    }

    pub fn has_persona(&self) -> bool {
        self.persona_instruction.is_some()
    }

    /// Re-adds any section a stored record lacks and restores display order.
    pub fn normalize_sections(&mut self) {
        let mut normalized = default_sections();
        for slot in normalized.iter_mut() {
            if let Some(stored) = self.sections.iter().find(|s| s.kind() == slot.kind()) {
                *slot = stored.clone();
            }
        }
        self.sections = normalized;
    }

    /// Clears in-progress flags that cannot still be in flight after a reload.
    pub fn clear_transient_flags(&mut self) {
        for section in self.sections.iter_mut() {
            section.clear_loading();
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_in_zero_state() {
        let session = Session::new("AcmeCorp");
        assert_eq!(session.id, "AcmeCorp");
        assert!(session.profile.is_none());
        assert_eq!(session.sections.len(), 4);
        assert!(session.sections.iter().all(|s| s.options().is_empty()));
        assert!(!session.has_persona());
        assert!(session.chat_history.is_empty());
        assert_eq!(session.view, View::Onboarding);
    }

    #[test]
    fn view_marker_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&View::ProfileBuilder).unwrap(),
            "\"profile-builder\""
        );
        assert_eq!(View::PostWriter.to_string(), "post-writer");
        assert_eq!("troubleshooter".parse::<View>().unwrap(), View::Troubleshooter);
    }

    #[test]
    fn normalize_restores_missing_sections_in_order() {
        let mut session = Session::new("acme");
        session.sections.retain(|s| s.kind() != SectionKind::About);
        session.sections.reverse();

        session.normalize_sections();

        let kinds: Vec<_> = session.sections.iter().map(Section::kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Headline,
                SectionKind::About,
                SectionKind::Experience,
                SectionKind::Strategy
            ]
        );
    }

    #[test]
    fn clear_transient_flags_drops_loading() {
        let mut session = Session::new("acme");
        session
            .section_mut(SectionKind::About)
            .unwrap()
            .begin_generation()
            .unwrap();
        session.clear_transient_flags();
        assert!(session.sections.iter().all(|s| !s.is_loading()));
    }

    #[test]
    fn reads_record_written_without_timestamp() {
        let json = r#"{
            "id": "acme",
            "userData": null,
            "sections": [],
            "masterSystemInstruction": null,
            "chatHistory": [{"role": "model", "text": "hi"}],
            "lastActiveView": "onboarding"
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert!(session.updated_at.is_none());
        assert_eq!(session.chat_history[0].role, crate::session::ChatRole::Model);
    }
}
