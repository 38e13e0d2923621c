//! Request and response bodies of the question bank API.

use crate::{
    CourseId, FilterCriteria, ModuleId, QuestionSourceId, QuestionType, RequiredCriteria,
    Rotation, Selection, UnitId, UniversityId,
};

/// Body of the question-count endpoint. The API takes every criterion as an array, so each
/// selected value is sent as a singleton.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCountRequest {
    pub course_ids: Vec<CourseId>,
    pub university_ids: Vec<UniversityId>,
    pub question_source_ids: Vec<QuestionSourceId>,
    pub years: Vec<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotations: Option<Vec<Rotation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_types: Option<Vec<QuestionType>>,
}

impl QuestionCountRequest {
    pub fn new(
        course_ids: Vec<CourseId>,
        required: RequiredCriteria,
        criteria: &FilterCriteria,
    ) -> Self {
        Self {
            course_ids,
            university_ids: vec![required.university],
            question_source_ids: vec![required.source],
            years: vec![required.year],
            rotations: criteria.rotation.map(|rotation| vec![rotation]),
            question_types: criteria.question_type.map(|ty| vec![ty]),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCountResponse {
    #[serde(default)]
    pub total_question_count: u32,
    /// Questions the caller's subscription actually unlocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessible_question_count: Option<u32>,
}

impl QuestionCountResponse {
    /// The accessible count wins whenever the API reports one, even when it is zero.
    pub fn available(&self) -> u32 {
        self.accessible_question_count
            .unwrap_or(self.total_question_count)
    }
}

/// Body of the questions-by-selection endpoint: `{"uniteId": ..}` or `{"moduleId": ..}`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum QuestionsQuery {
    Unit {
        #[serde(rename = "uniteId")]
        unite_id: UnitId,
    },
    Module {
        #[serde(rename = "moduleId")]
        module_id: ModuleId,
    },
}

impl QuestionsQuery {
    pub fn for_selection(selection: Selection) -> Option<Self> {
        match selection {
            Selection::None => None,
            Selection::Unit(unite_id) => Some(QuestionsQuery::Unit { unite_id }),
            Selection::Module(module_id) => Some(QuestionsQuery::Module { module_id }),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    #[default]
    Exam,
    Practice,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreationPayload {
    pub title: String,
    #[serde(default)]
    pub session_type: SessionType,
    pub course_ids: Vec<CourseId>,
    pub university_ids: Vec<UniversityId>,
    pub question_source_ids: Vec<QuestionSourceId>,
    pub years: Vec<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotations: Option<Vec<Rotation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_types: Option<Vec<QuestionType>>,
    pub question_count: u32,
}

impl SessionCreationPayload {
    /// Builds the payload from the same pieces as a count request. `question_count` is clamped to
    /// [`crate::MAX_SESSION_QUESTIONS`].
    pub fn new(
        title: impl Into<String>,
        session_type: SessionType,
        count_request: QuestionCountRequest,
        available_count: u32,
    ) -> Self {
        let QuestionCountRequest {
            course_ids,
            university_ids,
            question_source_ids,
            years,
            rotations,
            question_types,
        } = count_request;
        Self {
            title: title.into(),
            session_type,
            course_ids,
            university_ids,
            question_source_ids,
            years,
            rotations,
            question_types,
            question_count: available_count.min(crate::MAX_SESSION_QUESTIONS),
        }
    }
}
