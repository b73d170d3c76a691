//! User profile domain module.
//!
//! - `model`: the captured profile (`UserProfile`) and its `Tone`
//! - `intake`: raw form fields (`ProfileFields`) and their validation

mod intake;
mod model;

pub use intake::ProfileFields;
pub use model::{Tone, UserProfile};
