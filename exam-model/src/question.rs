use crate::{FilterCriteria, QuestionId, QuestionSourceId, QuestionType, Rotation, UniversityId};

/// A question as listed by the questions-by-selection endpoint. Only the fields needed for
/// filtering are kept.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub university_id: UniversityId,
    pub source_id: QuestionSourceId,
    pub exam_year: u16,
    #[serde(default)]
    pub rotation: Option<Rotation>,
    pub question_type: QuestionType,
}

impl Question {
    /// Unset criteria match everything.
    pub fn matches(&self, criteria: &FilterCriteria) -> bool {
        criteria.university.is_none_or(|id| id == self.university_id)
            && criteria.source.is_none_or(|id| id == self.source_id)
            && criteria.year.is_none_or(|year| year == self.exam_year)
            && criteria
                .rotation
                .is_none_or(|rotation| Some(rotation) == self.rotation)
            && criteria
                .question_type
                .is_none_or(|ty| ty == self.question_type)
    }
}
