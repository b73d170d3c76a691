//! Onboarding form fields and their validation.

use super::model::{Tone, UserProfile};
use crate::error::{ArchitectError, Result};

/// Raw onboarding input, exactly as the user typed it.
///
/// Every field except `achievements` is required. No semantic validation is
/// done beyond presence; an unset tone falls back to [`Tone::Professional`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub full_name: String,
    pub business_name: String,
    pub industry: String,
    pub target_audience: String,
    pub value_proposition: String,
    pub personal_story: String,
    pub achievements: String,
    pub tone: Option<Tone>,
}

impl ProfileFields {
    /// Names of required fields that are blank, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("full name", &self.full_name),
            ("business name", &self.business_name),
            ("industry", &self.industry),
            ("target audience", &self.target_audience),
            ("value proposition", &self.value_proposition),
            ("personal story", &self.personal_story),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Validates presence and captures the profile.
    pub fn into_profile(self) -> Result<UserProfile> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ArchitectError::validation(format!(
                "Required profile fields are empty: {}",
                missing.join(", ")
            )));
        }

        Ok(UserProfile {
            full_name: self.full_name.trim().to_string(),
            business_name: self.business_name.trim().to_string(),
            industry: self.industry.trim().to_string(),
            target_audience: self.target_audience.trim().to_string(),
            value_proposition: self.value_proposition.trim().to_string(),
            personal_story: self.personal_story.trim().to_string(),
            achievements: self.achievements.trim().to_string(),
            tone: self.tone.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_fields() -> ProfileFields {
        ProfileFields {
            full_name: "Dana Reyes".into(),
            business_name: "Reyes Bakery".into(),
            industry: "Food".into(),
            target_audience: "Local cafes".into(),
            value_proposition: "Sourdough by 6am".into(),
            personal_story: "Started in a garage".into(),
            achievements: String::new(),
            tone: None,
        }
    }

    #[test]
    fn achievements_are_optional_and_tone_defaults() {
        let profile = complete_fields().into_profile().unwrap();
        assert_eq!(profile.achievements, "");
        assert_eq!(profile.tone, Tone::Professional);
    }

    #[test]
    fn blank_required_fields_are_reported_by_name() {
        let fields = ProfileFields {
            industry: "   ".into(),
            personal_story: String::new(),
            ..complete_fields()
        };
        assert_eq!(fields.missing_fields(), vec!["industry", "personal story"]);

        let err = fields.into_profile().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("industry, personal story"));
    }

    #[test]
    fn values_are_trimmed() {
        let fields = ProfileFields {
            full_name: "  Dana Reyes \n".into(),
            tone: Some(Tone::BoldContrarian),
            ..complete_fields()
        };
        let profile = fields.into_profile().unwrap();
        assert_eq!(profile.full_name, "Dana Reyes");
        assert_eq!(profile.tone, Tone::BoldContrarian);
    }
}
