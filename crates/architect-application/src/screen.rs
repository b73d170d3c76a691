//! Which workflow step to present for a session.

use architect_core::session::{Session, View};

/// Presentation derived from the stored view marker plus session contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Onboarding,
    ProfileBuilder,
    Troubleshooter,
    PostWriter,
    /// Chat was requested before a persona was compiled. `recovery` is the
    /// view that fixes it.
    MissingPersona { recovery: View },
}

impl Screen {
    /// Applies the fallback rules: no profile always means onboarding, and
    /// the chat view without a persona becomes a recovery screen.
    pub fn for_session(session: &Session) -> Self {
        if session.profile.is_none() {
            return Screen::Onboarding;
        }

        match session.view {
            View::Onboarding => Screen::Onboarding,
            View::ProfileBuilder => Screen::ProfileBuilder,
            View::Troubleshooter => Screen::Troubleshooter,
            View::PostWriter if session.has_persona() => Screen::PostWriter,
            View::PostWriter => Screen::MissingPersona {
                recovery: View::ProfileBuilder,
            },
        }
    }
}
