//! The exam session wizard, minus the markup.
//!
//! A student picks a unit or an independent module, narrows the question pool with a university,
//! a question source and an exam year (plus optional rotation and question type), and names the
//! session. While they do, the wizard keeps asking the question bank how many questions the
//! current filters leave, and only lets them create a session once that number is positive.
//!
//! - [`hierarchy`] turns the content tree into option lists and selections into course IDs.
//! - [`WizardState`] is a reducer over [`WizardEvent`]s holding the selection/filter rules.
//! - [`CountNegotiator`] debounces count requests, one in flight at a time.
//! - [`submit`] validates and creates the session.
//! - [`SessionWizard`] ties the above to a [`qbank_client::QuestionBank`].

pub mod hierarchy;
mod negotiator;
mod options;
mod state;
pub mod submit;
mod wizard;

pub use negotiator::{CountNegotiator, CountOutcome, DEFAULT_QUIESCENCE, build_count_request};
pub use options::CriteriaOptions;
pub use state::{FilterKey, Phase, WizardEvent, WizardState};
pub use submit::{SubmitError, SubmitOutcome, ValidationError};
pub use wizard::SessionWizard;

#[cfg(test)]
pub(crate) mod test_support;
