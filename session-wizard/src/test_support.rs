use std::sync::Mutex;
use std::time::Duration;

use exam_model::{
    ContentFilters, Course, CourseId, Module, ModuleId, Question, QuestionCountRequest,
    QuestionCountResponse, QuestionId, QuestionSourceId, QuestionType, QuestionsQuery, Rotation,
    SessionCreationPayload, SessionId, Unit, UnitId, UniversityId,
};
use qbank_client::{ApiError, CreatedSession, QuestionBank};

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

/// Unit A holds M1 (courses 1, 2) and M2 (course 3). Unit B lists course 4 twice. Pharmacology
/// is the only independent module.
pub(crate) fn content_filters() -> ContentFilters {
    ContentFilters {
        unites: vec![
            Unit {
                id: UnitId(1),
                name: "Unit A".to_string(),
                modules: vec![
                    module(10, "M1", vec![course(1, "Heart failure"), course(2, "Arrhythmias")]),
                    module(11, "M2", vec![course(3, "Aneurysms")]),
                ],
            },
            Unit {
                id: UnitId(2),
                name: "Unit B".to_string(),
                modules: vec![
                    module(20, "Kidney", vec![course(4, "Renal physiology")]),
                    module(
                        21,
                        "Kidney failure",
                        vec![course(4, "Renal physiology"), course(5, "Dialysis")],
                    ),
                ],
            },
        ],
        independent_modules: vec![module(
            30,
            "Pharmacology",
            vec![course(7, "Antibiotics"), course(8, "Anticoagulants")],
        )],
    }
}

pub(crate) fn question(
    id: u64,
    university: u64,
    source: u64,
    year: u16,
    rotation: Option<Rotation>,
    question_type: QuestionType,
) -> Question {
    Question {
        id: QuestionId(id),
        university_id: UniversityId(university),
        source_id: QuestionSourceId(source),
        exam_year: year,
        rotation,
        question_type,
    }
}

/// Records every call and answers from canned values.
pub(crate) struct FakeBank {
    pub count_response: Mutex<Result<QuestionCountResponse, u16>>,
    pub count_delay: Duration,
    pub count_panics: bool,
    pub questions: Mutex<Vec<Question>>,
    pub questions_status: Mutex<Option<u16>>,
    pub created_id: Mutex<Option<SessionId>>,
    pub create_status: Mutex<Option<u16>>,

    pub count_calls: Mutex<Vec<QuestionCountRequest>>,
    pub question_calls: Mutex<Vec<QuestionsQuery>>,
    pub created: Mutex<Vec<SessionCreationPayload>>,
}

impl FakeBank {
    pub(crate) fn new() -> Self {
        Self {
            count_response: Mutex::new(Ok(QuestionCountResponse {
                total_question_count: 40,
                accessible_question_count: Some(25),
            })),
            count_delay: Duration::ZERO,
            count_panics: false,
            questions: Mutex::new(Vec::new()),
            questions_status: Mutex::new(None),
            created_id: Mutex::new(Some(SessionId::from("sess-1"))),
            create_status: Mutex::new(None),
            count_calls: Mutex::new(Vec::new()),
            question_calls: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_count(self, accessible: Option<u32>, total: u32) -> Self {
        *self.count_response.lock().unwrap() = Ok(QuestionCountResponse {
            total_question_count: total,
            accessible_question_count: accessible,
        });
        self
    }

    pub(crate) fn with_questions(self, questions: Vec<Question>) -> Self {
        *self.questions.lock().unwrap() = questions;
        self
    }

    pub(crate) fn count_calls(&self) -> Vec<QuestionCountRequest> {
        self.count_calls.lock().unwrap().clone()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.count_calls.lock().unwrap().len()
            + self.question_calls.lock().unwrap().len()
            + self.created.lock().unwrap().len()
    }
}

fn status(status: u16) -> ApiError {
    ApiError::Status {
        status,
        body: String::new(),
    }
}

impl QuestionBank for FakeBank {
    async fn content_filters(&self) -> Result<ContentFilters, ApiError> {
        Ok(content_filters())
    }

    async fn question_count(
        &self,
        request: &QuestionCountRequest,
    ) -> Result<QuestionCountResponse, ApiError> {
        self.count_calls.lock().unwrap().push(request.clone());
        if !self.count_delay.is_zero() {
            tokio::time::sleep(self.count_delay).await;
        }
        if self.count_panics {
            panic!("count backend crashed");
        }
        let response = self.count_response.lock().unwrap().clone();
        response.map_err(status)
    }

    async fn questions(&self, query: &QuestionsQuery) -> Result<Vec<Question>, ApiError> {
        self.question_calls.lock().unwrap().push(*query);
        if let Some(code) = *self.questions_status.lock().unwrap() {
            return Err(status(code));
        }
        Ok(self.questions.lock().unwrap().clone())
    }

    async fn create_session(
        &self,
        payload: &SessionCreationPayload,
    ) -> Result<CreatedSession, ApiError> {
        if let Some(code) = *self.create_status.lock().unwrap() {
            return Err(status(code));
        }
        self.created.lock().unwrap().push(payload.clone());
        Ok(CreatedSession {
            session_id: self.created_id.lock().unwrap().clone(),
        })
    }
}
