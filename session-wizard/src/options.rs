use std::collections::BTreeSet;

use exam_model::{FilterCriteria, Question, QuestionSourceId, QuestionType, Rotation, UniversityId};

/// Values worth offering for each filter, given the questions of the current selection.
///
/// Each dimension is narrowed by every *other* filter already set, so picking a university only
/// offers the years that university actually has questions for, while the university list itself
/// stays complete enough to switch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CriteriaOptions {
    pub universities: BTreeSet<UniversityId>,
    pub sources: BTreeSet<QuestionSourceId>,
    pub years: BTreeSet<u16>,
    pub rotations: BTreeSet<Rotation>,
    pub question_types: BTreeSet<QuestionType>,
}

impl CriteriaOptions {
    pub fn from_questions(questions: &[Question], criteria: &FilterCriteria) -> Self {
        let without = |clear: fn(&mut FilterCriteria)| {
            let mut criteria = criteria.clone();
            clear(&mut criteria);
            criteria
        };
        let for_universities = without(|c| c.university = None);
        let for_sources = without(|c| c.source = None);
        let for_years = without(|c| c.year = None);
        let for_rotations = without(|c| c.rotation = None);
        let for_types = without(|c| c.question_type = None);

        let mut options = Self::default();
        for question in questions {
            if question.matches(&for_universities) {
                options.universities.insert(question.university_id);
            }
            if question.matches(&for_sources) {
                options.sources.insert(question.source_id);
            }
            if question.matches(&for_years) {
                options.years.insert(question.exam_year);
            }
            if question.matches(&for_rotations)
                && let Some(rotation) = question.rotation
            {
                options.rotations.insert(rotation);
            }
            if question.matches(&for_types) {
                options.question_types.insert(question.question_type);
            }
        }
        options
    }

    pub fn is_empty(&self) -> bool {
        self.universities.is_empty()
    }
}
