//! Profile section model and its approval state machine.

use crate::error::{ArchitectError, Result};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The fixed set of profile sections the wizard drafts.
///
/// Prompt building and finalize validation both match on this enum, so
/// adding a kind is an exhaustiveness error rather than a silent gap.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SectionKind {
    Headline,
    About,
    Experience,
    Strategy,
}

impl SectionKind {
    /// Sections that must be approved before the persona can be compiled.
    pub const REQUIRED: [SectionKind; 3] = [
        SectionKind::Headline,
        SectionKind::About,
        SectionKind::Experience,
    ];

    /// Display title for the section.
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Headline => "LinkedIn Headline",
            SectionKind::About => "About Section",
            SectionKind::Experience => "Experience Description",
            SectionKind::Strategy => "Optimization Strategy",
        }
    }

    /// Whether finalize requires this section. `Strategy` is advisory only.
    pub fn is_required(self) -> bool {
        match self {
            SectionKind::Headline | SectionKind::About | SectionKind::Experience => true,
            SectionKind::Strategy => false,
        }
    }

    /// Whether the model is asked for several candidates (a JSON array) rather
    /// than a single free-text draft.
    pub fn wants_multiple_options(self) -> bool {
        match self {
            SectionKind::Headline => true,
            SectionKind::About | SectionKind::Experience | SectionKind::Strategy => false,
        }
    }
}

/// Derived position of a section in its workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    Empty,
    Generating,
    Populated,
    Approved,
}

/// One profile section with its candidate drafts.
///
/// Invariant: `approved` implies `selected_index` points into a non-empty
/// `options` list. Every mutator below preserves it; selecting, editing and
/// regenerating are refused while the section is approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    id: SectionKind,
    title: String,
    options: Vec<String>,
    selected_index: Option<usize>,
    #[serde(rename = "isApproved")]
    approved: bool,
    loading: bool,
}

impl Section {
    /// Creates a section in its zero state.
    pub fn new(kind: SectionKind) -> Self {
        Self {
            id: kind,
            title: kind.title().to_string(),
            options: Vec::new(),
            selected_index: None,
            approved: false,
            loading: false,
        }
    }

    pub fn kind(&self) -> SectionKind {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn is_approved(&self) -> bool {
        self.approved
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn state(&self) -> SectionState {
        if self.loading {
            SectionState::Generating
        } else if self.approved {
            SectionState::Approved
        } else if self.options.is_empty() {
            SectionState::Empty
        } else {
            SectionState::Populated
        }
    }

    /// Text of the selected option, when a valid selection exists.
    pub fn selected_text(&self) -> Option<&str> {
        self.selected_index
            .and_then(|index| self.options.get(index))
            .map(String::as_str)
    }

    /// Marks the section as generating. Refused while approved or while a
    /// generation is already in flight.
    pub fn begin_generation(&mut self) -> Result<()> {
        self.ensure_unlocked("regenerate")?;
        if self.loading {
            return Err(ArchitectError::validation(format!(
                "{} is already being generated",
                self.id
            )));
        }
        self.loading = true;
        Ok(())
    }

    /// Replaces the candidates with freshly generated ones and resets the
    /// selection and approval.
    pub fn complete_generation(&mut self, options: Vec<String>) {
        self.options = options;
        self.selected_index = None;
        self.approved = false;
        self.loading = false;
    }

    /// Drops an in-progress flag left by a cancelled draft or a crash.
    pub fn clear_loading(&mut self) {
        self.loading = false;
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        self.ensure_unlocked("change the selection of")?;
        self.ensure_index(index)?;
        self.selected_index = Some(index);
        Ok(())
    }

    /// Replaces the text of one candidate in place.
    pub fn edit_option(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        self.ensure_unlocked("edit")?;
        self.ensure_index(index)?;
        self.options[index] = text.into();
        Ok(())
    }

    /// Flips approval and returns the new state. Approving requires a valid
    /// selection; revoking is always allowed.
    pub fn toggle_approve(&mut self) -> Result<bool> {
        if self.approved {
            self.approved = false;
            return Ok(false);
        }
        if self.selected_text().is_none() {
            return Err(ArchitectError::validation(format!(
                "Select an option for {} before approving it",
                self.id
            )));
        }
        self.approved = true;
        Ok(true)
    }

    fn ensure_unlocked(&self, action: &str) -> Result<()> {
        if self.approved {
            return Err(ArchitectError::validation(format!(
                "Cannot {action} {} while it is approved; revoke approval first",
                self.id
            )));
        }
        Ok(())
    }

    fn ensure_index(&self, index: usize) -> Result<()> {
        if index >= self.options.len() {
            return Err(ArchitectError::validation(format!(
                "Option {index} does not exist for {} ({} available)",
                self.id,
                self.options.len()
            )));
        }
        Ok(())
    }
}
