use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use exam_model::{
    ContentFilters, Course, CourseId, Module, ModuleId, Question, QuestionCountRequest,
    QuestionCountResponse, QuestionId, QuestionSourceId, QuestionType, QuestionsQuery, Rotation,
    Unit, UnitId, UniversityId,
};

/// A question plus the bookkeeping only the server knows about.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredQuestion {
    pub course_id: CourseId,
    /// Premium questions only count as accessible for entitled callers.
    #[serde(default)]
    pub premium: bool,
    #[serde(flatten)]
    pub question: Question,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub content: ContentFilters,
    pub questions: Vec<StoredQuestion>,
}

impl Dataset {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse dataset {}", path.display()))
    }

    /// Courses reachable from a unit or module, `None` when the ID is unknown.
    pub fn courses_for(&self, query: &QuestionsQuery) -> Option<BTreeSet<CourseId>> {
        match *query {
            QuestionsQuery::Unit { unite_id } => self.content.unit(unite_id).map(|unit| {
                unit.modules
                    .iter()
                    .flat_map(|module| module.courses.iter().map(|course| course.id))
                    .collect()
            }),
            QuestionsQuery::Module { module_id } => self
                .all_modules()
                .find(|module| module.id == module_id)
                .map(|module| module.courses.iter().map(|course| course.id).collect()),
        }
    }

    fn all_modules(&self) -> impl Iterator<Item = &Module> {
        self.content
            .unites
            .iter()
            .flat_map(|unit| unit.modules.iter())
            .chain(self.content.independent_modules.iter())
    }

    pub fn questions_for(&self, query: &QuestionsQuery) -> Option<Vec<Question>> {
        let courses = self.courses_for(query)?;
        Some(
            self.questions
                .iter()
                .filter(|stored| courses.contains(&stored.course_id))
                .map(|stored| stored.question.clone())
                .collect(),
        )
    }

    pub fn count(&self, request: &QuestionCountRequest, entitled: bool) -> QuestionCountResponse {
        let matching: Vec<&StoredQuestion> = self
            .questions
            .iter()
            .filter(|stored| count_request_matches(request, stored))
            .collect();
        let accessible = matching
            .iter()
            .filter(|stored| entitled || !stored.premium)
            .count();
        QuestionCountResponse {
            total_question_count: matching.len() as u32,
            accessible_question_count: Some(accessible as u32),
        }
    }

    /// Two units and one independent module, with questions spread over a few universities,
    /// sources and years.
    pub fn sample() -> Self {
        fn course(id: u64, name: &str) -> Course {
            Course {
                id: CourseId(id),
                name: name.to_string(),
            }
        }
        fn module(id: u64, name: &str, courses: Vec<Course>) -> Module {
            Module {
                id: ModuleId(id),
                name: name.to_string(),
                courses,
            }
        }

        let content = ContentFilters {
            unites: vec![
                Unit {
                    id: UnitId(1),
                    name: "Cardiovascular".to_string(),
                    modules: vec![
                        module(
                            11,
                            "Cardiology",
                            vec![course(101, "Heart failure"), course(102, "Arrhythmias")],
                        ),
                        module(12, "Vascular surgery", vec![course(103, "Aneurysms")]),
                    ],
                },
                Unit {
                    id: UnitId(2),
                    name: "Neurosciences".to_string(),
                    modules: vec![module(21, "Neurology", vec![course(201, "Epilepsy")])],
                },
            ],
            independent_modules: vec![module(
                31,
                "Pharmacology",
                vec![course(301, "Antibiotics"), course(302, "Anticoagulants")],
            )],
        };

        let courses = [101, 102, 103, 201, 301, 302];
        let mut questions = Vec::new();
        let mut next_id = 1;
        for (i, course_id) in courses.into_iter().enumerate() {
            for n in 0..8u64 {
                let university = 1 + (n % 2);
                let year = 2021 + (n % 3) as u16;
                questions.push(StoredQuestion {
                    course_id: CourseId(course_id),
                    premium: n % 4 == 3,
                    question: Question {
                        id: QuestionId(next_id),
                        university_id: UniversityId(university),
                        source_id: QuestionSourceId(1 + (i as u64 % 2)),
                        exam_year: year,
                        rotation: Rotation::ALL.get((n % 5) as usize).copied(),
                        question_type: if n % 3 == 0 {
                            QuestionType::MultipleChoice
                        } else {
                            QuestionType::SingleChoice
                        },
                    },
                });
                next_id += 1;
            }
        }

        Self { content, questions }
    }
}

fn count_request_matches(request: &QuestionCountRequest, stored: &StoredQuestion) -> bool {
    let q = &stored.question;
    request.course_ids.contains(&stored.course_id)
        && request.university_ids.contains(&q.university_id)
        && request.question_source_ids.contains(&q.source_id)
        && request.years.contains(&q.exam_year)
        && request
            .rotations
            .as_ref()
            .is_none_or(|rotations| q.rotation.is_some_and(|r| rotations.contains(&r)))
        && request
            .question_types
            .as_ref()
            .is_none_or(|types| types.contains(&q.question_type))
}
