//! Profile section domain module.
//!
//! - `model`: `SectionKind`, `Section` and its per-section state machine
//! - `approval`: finalize validation across the fixed section set

mod approval;
mod model;

pub use approval::{ApprovedSelections, approved_selections, default_sections};
pub use model::{Section, SectionKind, SectionState};
