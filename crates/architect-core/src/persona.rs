//! Persona compilation.
//!
//! Turns the captured profile and the three approved section texts into the
//! system instruction that primes the post-writing chat. Pure and
//! deterministic: the chat session compares instructions by equality to
//! decide whether to re-open the conversation.

use crate::profile::UserProfile;
use crate::section::ApprovedSelections;

/// Builds the chat persona instruction.
pub fn compile(profile: &UserProfile, headline: &str, about: &str, experience: &str) -> String {
    let UserProfile {
        full_name,
        business_name,
        industry,
        target_audience,
        value_proposition,
        tone,
        ..
    } = profile;

    format!(
        "You are the personalized LinkedIn Ghostwriter and AI Strategist for {full_name}.

CORE IDENTITY & CONTEXT:
- Business: {business_name} ({industry})
- Target Audience: {target_audience}
- Unique Value Proposition: {value_proposition}
- Tone: {tone}

YOUR APPROVED PROFILE DATA (Use this as ground truth for style and history):
- Headline: \"{headline}\"
- About Section: \"{about}\"
- Experience/Role: \"{experience}\"

YOUR MISSION:
1. Help {full_name} write high-engagement LinkedIn posts that align with the strategy above.
2. Provide advice on engagement, networking, and profile optimization based on the approved strategy.
3. When writing posts, ALWAYS use the \"{tone}\" tone.
4. Format posts with clean line breaks, hooks, and clear CTAs.

If the user asks for a post, ask for the topic first, then write it using the 4-step method: Hook, Body, Takeaway, CTA.
"
    )
}

/// Convenience wrapper over [`compile`] for validated selections.
pub fn compile_selections(profile: &UserProfile, selections: &ApprovedSelections) -> String {
    compile(
        profile,
        &selections.headline,
        &selections.about,
        &selections.experience,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Tone;

    fn profile() -> UserProfile {
        UserProfile {
            full_name: "Dana Reyes".into(),
            business_name: "Reyes Bakery".into(),
            industry: "Food".into(),
            target_audience: "Local cafes".into(),
            value_proposition: "Sourdough by 6am".into(),
            personal_story: "Started in a garage".into(),
            achievements: "40 cafes".into(),
            tone: Tone::ThoughtLeader,
        }
    }

    #[test]
    fn compile_is_deterministic() {
        let a = compile(&profile(), "Head", "Bio", "Role");
        let b = compile(&profile(), "Head", "Bio", "Role");
        assert_eq!(a, b);
    }

    #[test]
    fn embeds_identity_selections_and_directives() {
        let text = compile(&profile(), "Bread for busy baristas", "Bio text", "Role text");
        assert!(text.contains("for Dana Reyes."));
        assert!(text.contains("- Business: Reyes Bakery (Food)"));
        assert!(text.contains("- Headline: \"Bread for busy baristas\""));
        assert!(text.contains("- About Section: \"Bio text\""));
        assert!(text.contains("- Experience/Role: \"Role text\""));
        assert!(text.contains("ALWAYS use the \"Thought Leader\" tone"));
        assert!(text.contains("ask for the topic first"));
        assert!(text.contains("Hook, Body, Takeaway, CTA"));
    }

    #[test]
    fn different_selections_change_the_instruction() {
        let a = compile(&profile(), "Head", "Bio", "Role");
        let b = compile(&profile(), "Other head", "Bio", "Role");
        assert_ne!(a, b);
    }

    #[test]
    fn compile_selections_matches_compile() {
        let selections = ApprovedSelections {
            headline: "H".into(),
            about: "A".into(),
            experience: "E".into(),
        };
        assert_eq!(
            compile_selections(&profile(), &selections),
            compile(&profile(), "H", "A", "E")
        );
    }
}
