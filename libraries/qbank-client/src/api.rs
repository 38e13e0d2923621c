use std::future::Future;

use exam_model::{
    ContentFilters, Question, QuestionCountRequest, QuestionCountResponse, QuestionsQuery,
    SessionCreationPayload, SessionId,
};

use crate::ApiError;

/// Result of a successful session creation.
///
/// `session_id` is `None` when the API accepted the session but its response did not contain an
/// identifier anywhere we know to look.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedSession {
    pub session_id: Option<SessionId>,
}

/// The remote endpoints the session wizard depends on.
pub trait QuestionBank: Send + Sync {
    fn content_filters(&self) -> impl Future<Output = Result<ContentFilters, ApiError>> + Send;

    fn question_count(
        &self,
        request: &QuestionCountRequest,
    ) -> impl Future<Output = Result<QuestionCountResponse, ApiError>> + Send;

    /// Every question under a unit or an independent module, unfiltered.
    fn questions(
        &self,
        query: &QuestionsQuery,
    ) -> impl Future<Output = Result<Vec<Question>, ApiError>> + Send;

    fn create_session(
        &self,
        payload: &SessionCreationPayload,
    ) -> impl Future<Output = Result<CreatedSession, ApiError>> + Send;
}
