//! Finalize validation across the fixed section set.

use super::model::{Section, SectionKind};
use crate::error::{ArchitectError, Result};
use strum::IntoEnumIterator;

/// Selected text of each required section, ready for persona compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovedSelections {
    pub headline: String,
    pub about: String,
    pub experience: String,
}

/// The four sections in their zero state, in display order.
pub fn default_sections() -> Vec<Section> {
    SectionKind::iter().map(Section::new).collect()
}

/// Extracts the approved selections, or reports every required section that
/// is missing, unapproved or unselected. Never mutates the sections.
pub fn approved_selections(sections: &[Section]) -> Result<ApprovedSelections> {
    let approved_text = move |kind: SectionKind| {
        sections
            .iter()
            .find(|s| s.kind() == kind)
            .filter(|s| s.is_approved())
            .and_then(Section::selected_text)
    };

    let missing: Vec<SectionKind> = SectionKind::REQUIRED
        .into_iter()
        .filter(|kind| approved_text(*kind).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ArchitectError::IncompleteSections { missing });
    }

    let text = |kind| approved_text(kind).unwrap_or_default().to_string();
    Ok(ApprovedSelections {
        headline: text(SectionKind::Headline),
        about: text(SectionKind::About),
        experience: text(SectionKind::Experience),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approve(section: &mut Section, options: &[&str], pick: usize) {
        section.begin_generation().unwrap();
        section.complete_generation(options.iter().map(|s| s.to_string()).collect());
        section.select(pick).unwrap();
        section.toggle_approve().unwrap();
    }

    #[test]
    fn default_sections_cover_every_kind_in_order() {
        let sections = default_sections();
        let kinds: Vec<_> = sections.iter().map(Section::kind).collect();
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
    fn reports_exactly_the_unapproved_required_sections() {
        let mut sections = default_sections();
        approve(&mut sections[0], &["A", "B", "C"], 2);

        let err = approved_selections(&sections).unwrap_err();
        assert_eq!(
            err.missing_sections(),
            Some(&[SectionKind::About, SectionKind::Experience][..])
        );
    }

    #[test]
    fn strategy_is_not_required() {
        let mut sections = default_sections();
        approve(&mut sections[0], &["A", "B", "C"], 1);
        approve(&mut sections[1], &["bio"], 0);
        approve(&mut sections[2], &["role"], 0);

        let selections = approved_selections(&sections).unwrap();
        assert_eq!(selections.headline, "B");
        assert_eq!(selections.about, "bio");
        assert_eq!(selections.experience, "role");
    }

    #[test]
    fn selected_but_unapproved_section_is_missing() {
        let mut sections = default_sections();
        approve(&mut sections[0], &["A"], 0);
        approve(&mut sections[1], &["bio"], 0);
        sections[2].begin_generation().unwrap();
        sections[2].complete_generation(vec!["role".into()]);
        sections[2].select(0).unwrap();

        let err = approved_selections(&sections).unwrap_err();
        assert_eq!(err.missing_sections(), Some(&[SectionKind::Experience][..]));
    }

    #[test]
    fn absent_section_records_count_as_missing() {
        let err = approved_selections(&[]).unwrap_err();
        assert_eq!(err.missing_sections(), Some(&SectionKind::REQUIRED[..]));
    }
}
