//! Turning a filled-in wizard into an exam session.
//!
//! Validation runs first and never touches the network. After that the questions of the selection
//! are fetched and filtered locally to make sure the session will not come out empty, and only
//! then is the session created. The session itself is defined by courses and criteria; the
//! question sample gathered on the way is only a feasibility check.

use exam_model::{
    ContentFilters, FilterCriteria, MAX_SESSION_QUESTIONS, QuestionCountRequest, QuestionId,
    QuestionsQuery, SessionCreationPayload, SessionId, SessionType,
};
use qbank_client::{ApiError, QuestionBank};

use crate::WizardState;
use crate::hierarchy::resolve_course_ids;
use crate::negotiator::build_count_request;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Select a unit or a module first.")]
    NoSelection,
    #[error("No courses found for the selected unit/module.")]
    NoCourses,
    #[error("Select a university, a question source and an exam year.")]
    IncompleteFilters,
    #[error("No questions available with current filters.")]
    NoQuestionsAvailable,
    #[error("The session title must be at least 3 characters long.")]
    TitleTooShort,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("A session was already submitted from these filters.")]
    AlreadySubmitting,
    #[error("No questions match the selected filters.")]
    NoMatchingQuestions,
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created {
        session_id: SessionId,
        route: String,
        sampled_question_ids: Vec<QuestionId>,
    },
    /// The API accepted the session but its answer had no identifier to navigate to.
    CreatedWithoutRedirect {
        sampled_question_ids: Vec<QuestionId>,
    },
}

impl SubmitOutcome {
    pub fn message(&self) -> String {
        match self {
            SubmitOutcome::Created { session_id, .. } => {
                format!("Session {session_id} created.")
            }
            SubmitOutcome::CreatedWithoutRedirect { .. } => {
                "Session created, but we could not open it automatically. You will find it in your sessions list."
                    .to_string()
            }
        }
    }

    pub fn route(&self) -> Option<&str> {
        match self {
            SubmitOutcome::Created { route, .. } => Some(route),
            SubmitOutcome::CreatedWithoutRedirect { .. } => None,
        }
    }
}

pub fn session_route(id: &SessionId) -> String {
    format!("/sessions/{id}")
}

/// Everything needed to create the session, checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub query: QuestionsQuery,
    pub request: QuestionCountRequest,
    pub criteria: FilterCriteria,
    pub title: String,
    pub available_count: u32,
}

pub fn validate(
    state: &WizardState,
    filters: &ContentFilters,
) -> Result<ValidatedSubmission, ValidationError> {
    let query =
        QuestionsQuery::for_selection(state.selection()).ok_or(ValidationError::NoSelection)?;
    if resolve_course_ids(filters, state.selection()).is_empty() {
        return Err(ValidationError::NoCourses);
    }
    let request =
        build_count_request(state, filters).ok_or(ValidationError::IncompleteFilters)?;
    if state.available_count() == 0 {
        return Err(ValidationError::NoQuestionsAvailable);
    }
    if !state.title_is_valid() {
        return Err(ValidationError::TitleTooShort);
    }
    Ok(ValidatedSubmission {
        query,
        request,
        criteria: state.criteria().clone(),
        title: state.title().trim().to_string(),
        available_count: state.available_count(),
    })
}

pub async fn submit<A: QuestionBank>(
    api: &A,
    submission: ValidatedSubmission,
    session_type: SessionType,
) -> Result<SubmitOutcome, SubmitError> {
    let ValidatedSubmission {
        query,
        request,
        criteria,
        title,
        available_count,
    } = submission;

    let questions = api.questions(&query).await?;
    let sampled_question_ids: Vec<QuestionId> = questions
        .iter()
        .filter(|question| question.matches(&criteria))
        .map(|question| question.id)
        .take(MAX_SESSION_QUESTIONS as usize)
        .collect();
    if sampled_question_ids.is_empty() {
        log::info!(
            "{} questions fetched for {query:?}, none match the filters",
            questions.len()
        );
        return Err(SubmitError::NoMatchingQuestions);
    }
    log::debug!(
        "{} of {} questions match, creating session",
        sampled_question_ids.len(),
        questions.len()
    );

    let payload = SessionCreationPayload::new(title, session_type, request, available_count);
    let created = api.create_session(&payload).await?;

    Ok(match created.session_id {
        Some(session_id) => SubmitOutcome::Created {
            route: session_route(&session_id),
            session_id,
            sampled_question_ids,
        },
        None => SubmitOutcome::CreatedWithoutRedirect {
            sampled_question_ids,
        },
    })
}
