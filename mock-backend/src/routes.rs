use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use chrono::{DateTime, Utc};
use exam_model::{
    ContentFilters, MAX_SESSION_QUESTIONS, MIN_TITLE_LEN, QuestionCountRequest,
    QuestionCountResponse, QuestionsQuery, SessionCreationPayload,
};
use serde_json::{Value, json};

use crate::AppState;

type BearerAuth = Option<TypedHeader<Authorization<Bearer>>>;

#[derive(Debug, thiserror::Error)]
pub(crate) enum BackendError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("session store unavailable")]
    Poisoned,
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = match self {
            BackendError::NotFound(_) => StatusCode::NOT_FOUND,
            BackendError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BackendError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": { "message": self.to_string() } }))).into_response()
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: SessionCreationPayload,
}

fn is_entitled(state: &AppState, auth: &BearerAuth) -> bool {
    match (&state.entitled_token, auth) {
        (Some(expected), Some(TypedHeader(Authorization(bearer)))) => bearer.token() == expected,
        _ => false,
    }
}

pub(crate) async fn content_filters(State(state): State<AppState>) -> Json<ContentFilters> {
    Json(state.dataset.content.clone())
}

pub(crate) async fn question_count(
    State(state): State<AppState>,
    auth: BearerAuth,
    Json(request): Json<QuestionCountRequest>,
) -> Json<QuestionCountResponse> {
    let entitled = is_entitled(&state, &auth);
    let response = state.dataset.count(&request, entitled);
    log::debug!(
        "count for {} courses (entitled: {entitled}): {response:?}",
        request.course_ids.len()
    );
    Json(response)
}

pub(crate) async fn questions(
    State(state): State<AppState>,
    Json(query): Json<QuestionsQuery>,
) -> Result<Json<Value>, BackendError> {
    let questions = state
        .dataset
        .questions_for(&query)
        .ok_or_else(|| BackendError::NotFound(format!("no unit or module matches {query:?}")))?;
    Ok(Json(json!({ "data": questions })))
}

pub(crate) async fn create_session(
    State(state): State<AppState>,
    Json(payload): Json<SessionCreationPayload>,
) -> Result<(StatusCode, Json<Value>), BackendError> {
    if payload.title.trim().chars().count() < MIN_TITLE_LEN {
        return Err(BackendError::Unprocessable(format!(
            "title must be at least {MIN_TITLE_LEN} characters"
        )));
    }
    if payload.course_ids.is_empty() {
        return Err(BackendError::Unprocessable(
            "at least one course is required".to_string(),
        ));
    }
    if payload.question_count == 0 || payload.question_count > MAX_SESSION_QUESTIONS {
        return Err(BackendError::Unprocessable(format!(
            "questionCount must be between 1 and {MAX_SESSION_QUESTIONS}"
        )));
    }

    let session = StoredSession {
        id: uuid::Uuid::new_v4().to_string(),
        created_at: Utc::now(),
        payload,
    };
    log::info!(
        "created session {} ({:?}, {} questions)",
        session.id,
        session.payload.title,
        session.payload.question_count
    );
    let body = json!({
        "data": {
            "session": {
                "id": session.id,
                "createdAt": session.created_at,
            }
        }
    });
    state
        .sessions
        .lock()
        .map_err(|_| BackendError::Poisoned)?
        .insert(session.id.clone(), session);
    Ok((StatusCode::CREATED, Json(body)))
}

pub(crate) async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredSession>, BackendError> {
    let sessions = state.sessions.lock().map_err(|_| BackendError::Poisoned)?;
    sessions
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| BackendError::NotFound(format!("session {id} not found")))
}
