//! UserProfile domain model.
//!
//! The profile seeds every prompt sent to the model. It is immutable once
//! captured and only ever replaced wholesale by running intake again.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Writing voice requested by the user.
///
/// The serialized label is the human-readable one, since it is embedded
/// verbatim into prompts and the compiled persona.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
)]
pub enum Tone {
    #[default]
    #[serde(rename = "Professional")]
    #[strum(serialize = "Professional")]
    Professional,
    #[serde(rename = "Thought Leader")]
    #[strum(serialize = "Thought Leader")]
    ThoughtLeader,
    #[serde(rename = "Casual & Relatable")]
    #[strum(serialize = "Casual & Relatable")]
    CasualRelatable,
    #[serde(rename = "Bold & Contrarian")]
    #[strum(serialize = "Bold & Contrarian")]
    BoldContrarian,
}

impl Tone {
    /// Longer description shown when the user picks a tone.
    pub fn description(self) -> &'static str {
        match self {
            Tone::Professional => "Professional & Corporate",
            Tone::ThoughtLeader => "Visionary Thought Leader",
            Tone::CasualRelatable => "Casual, Relatable & Authentic",
            Tone::BoldContrarian => "Bold, Contrarian & Disruptive",
        }
    }
}

/// Business owner profile captured during onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub full_name: String,
    pub business_name: String,
    pub industry: String,
    pub target_audience: String,
    #[serde(rename = "uniqueValueProposition")]
    pub value_proposition: String,
    pub personal_story: String,
    #[serde(rename = "keyAchievements", default)]
    pub achievements: String,
    #[serde(default)]
    pub tone: Tone,
}
