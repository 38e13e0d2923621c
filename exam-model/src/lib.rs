//! Data shared between the session wizard, the question bank client and the mock backend.
//!
//! Wire types use the upstream API's camelCase field names. Identifiers are newtypes over the
//! numeric IDs the API hands out, so a course ID can't be passed where a module ID is expected.

mod content;
mod criteria;
mod ids;
mod question;
mod wire;

pub use content::*;
pub use criteria::*;
pub use ids::*;
pub use question::*;
pub use wire::*;

/// Upper bound on the number of questions a single session may contain.
pub const MAX_SESSION_QUESTIONS: u32 = 100;

/// Session titles shorter than this (after trimming) are rejected.
pub const MIN_TITLE_LEN: usize = 3;

/// A flattened entry for a dropdown-style picker.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SelectOption<T> {
    pub value: T,
    pub label: String,
}
