//! Prompt text sent to the model.

use architect_core::profile::UserProfile;
use architect_core::section::SectionKind;

/// Profile facts shared by every section prompt.
pub fn base_context(profile: &UserProfile) -> String {
    format!(
        "Context: The user is {name}, a business owner of {business} in the {industry} industry.\n\
         Target Audience: {audience}.\n\
         Unique Value Proposition: {uvp}.\n\
         Tone: {tone}.\n\
         Achievements: {achievements}.",
        name = profile.full_name,
        business = profile.business_name,
        industry = profile.industry,
        audience = profile.target_audience,
        uvp = profile.value_proposition,
        tone = profile.tone,
        achievements = profile.achievements,
    )
}

/// Full prompt for drafting one section.
pub fn section_prompt(profile: &UserProfile, kind: SectionKind) -> String {
    let task = match kind {
        SectionKind::Headline => "Task: Write 3 distinct, high-impact LinkedIn Headlines (under 220 chars).\n\
             Guidelines: Focus on outcome, include SEO keywords."
            .to_string(),
        SectionKind::About => format!(
            "Task: Write a compelling \"About\" section for LinkedIn (approx 300 words).\n\
             Guidelines:\n\
             - Hook the reader immediately.\n\
             - Personal Story Context: \"{story}\".\n\
             - Use specific achievements: \"{achievements}\".\n\
             - Tone: {tone}.\n\
             - End with a CTA.\n\
             Return only the text of the bio.",
            story = profile.personal_story,
            achievements = profile.achievements,
            tone = profile.tone,
        ),
        SectionKind::Experience => format!(
            "Task: Write the description for the current role at {business}.\n\
             Guidelines:\n\
             - Focus on impact and results.\n\
             - Use bullet points.\n\
             Return only the text of the experience description.",
            business = profile.business_name,
        ),
        SectionKind::Strategy => "Task: Provide a strategic checklist for profile setup (Banner, Featured Section, Creator Mode settings).\n\
             Return only the checklist text."
            .to_string(),
    };

    format!("{}\n\n{task}", base_context(profile))
}

/// Prompt accompanying a screenshot. `query` is expected to be non-blank.
pub fn vision_prompt(query: &str) -> String {
    format!(
        "You are a LinkedIn technical support expert.\n\
         User Query: {query}\n\
         Analyze the screenshot. Provide step-by-step fix."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use architect_core::profile::Tone;

    fn profile() -> UserProfile {
        UserProfile {
            full_name: "Dana Reyes".to_string(),
            business_name: "Reyes Bakery".to_string(),
            industry: "Food & Beverage".to_string(),
            target_audience: "Independent cafes".to_string(),
            value_proposition: "Fresh sourdough before opening".to_string(),
            personal_story: "Left finance to bake".to_string(),
            achievements: "Supplying 40 cafes".to_string(),
            tone: Tone::ThoughtLeader,
        }
    }

    #[test]
    fn every_section_prompt_starts_with_the_shared_context() {
        let profile = profile();
        let context = base_context(&profile);
        assert!(context.contains("Tone: Thought Leader."));

        for kind in [
            SectionKind::Headline,
            SectionKind::About,
            SectionKind::Experience,
            SectionKind::Strategy,
        ] {
            assert!(section_prompt(&profile, kind).starts_with(&context));
        }
    }

    #[test]
    fn section_specific_details_are_embedded() {
        let profile = profile();
        assert!(section_prompt(&profile, SectionKind::Headline).contains("under 220 chars"));
        assert!(section_prompt(&profile, SectionKind::About).contains("\"Left finance to bake\""));
        assert!(
            section_prompt(&profile, SectionKind::Experience)
                .contains("current role at Reyes Bakery")
        );
        assert!(section_prompt(&profile, SectionKind::Strategy).contains("Creator Mode"));
    }

    #[test]
    fn vision_prompt_carries_the_query() {
        let prompt = vision_prompt("Where is creator mode?");
        assert!(prompt.contains("User Query: Where is creator mode?"));
        assert!(prompt.ends_with("Provide step-by-step fix."));
    }
}
