//! Talks to the question bank API: content filters, question counts, question lists and session
//! creation.
//!
//! The API is not consistent about where it puts things in its responses. All of that is smoothed
//! over in [`envelope`], so callers of [`QuestionBank`] always see one shape.

mod api;
mod config;
pub mod envelope;
mod error;
mod http;

pub use api::*;
pub use config::*;
pub use error::*;
pub use http::HttpQuestionBank;
