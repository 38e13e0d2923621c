use std::sync::Arc;
use std::time::Duration;

use exam_model::{
    ContentFilters, ModuleId, QuestionSourceId, QuestionType, QuestionsQuery, Rotation,
    SelectOption, SessionType, UnitId, UniversityId,
};
use qbank_client::{ApiError, QuestionBank};
use tokio::sync::mpsc;

use crate::submit::{self, SubmitError, SubmitOutcome};
use crate::{
    CountNegotiator, CountOutcome, CriteriaOptions, DEFAULT_QUIESCENCE, Phase, WizardEvent,
    WizardState, hierarchy,
};

/// A wizard bound to a question bank and a content snapshot.
///
/// Events go through [`SessionWizard::dispatch`], which also (re)schedules the count lookup.
/// Counts come back asynchronously; call [`SessionWizard::poll_counts`] from an event loop, or
/// await [`SessionWizard::settle`] to wait for the current one.
pub struct SessionWizard<A> {
    api: Arc<A>,
    filters: Arc<ContentFilters>,
    state: WizardState,
    negotiator: CountNegotiator<A>,
    outcomes: mpsc::UnboundedReceiver<CountOutcome>,
    session_type: SessionType,
}

impl<A: QuestionBank + 'static> SessionWizard<A> {
    pub fn new(api: Arc<A>, filters: ContentFilters) -> Self {
        Self::with_quiescence(api, filters, DEFAULT_QUIESCENCE)
    }

    pub fn with_quiescence(api: Arc<A>, filters: ContentFilters, quiescence: Duration) -> Self {
        let (negotiator, outcomes) = CountNegotiator::new(api.clone(), quiescence);
        Self {
            api,
            filters: Arc::new(filters),
            state: WizardState::default(),
            negotiator,
            outcomes,
            session_type: SessionType::default(),
        }
    }

    /// Fetches the content tree and starts an empty wizard over it.
    pub async fn load(api: Arc<A>, quiescence: Duration) -> Result<Self, ApiError> {
        let filters = api.content_filters().await?;
        log::info!(
            "loaded {} units and {} independent modules",
            filters.unites.len(),
            filters.independent_modules.len()
        );
        Ok(Self::with_quiescence(api, filters, quiescence))
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn filters(&self) -> &ContentFilters {
        &self.filters
    }

    pub fn unit_options(&self) -> Vec<SelectOption<UnitId>> {
        hierarchy::unit_options(&self.filters)
    }

    pub fn module_options(&self) -> Vec<SelectOption<ModuleId>> {
        hierarchy::module_options(&self.filters)
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn set_session_type(&mut self, session_type: SessionType) {
        self.session_type = session_type;
    }

    pub fn dispatch(&mut self, event: WizardEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(&event);
        self.negotiator.schedule(&self.state, &self.filters);
    }

    pub fn select_unit(&mut self, unit: Option<UnitId>) {
        self.dispatch(WizardEvent::SelectUnit(unit));
    }

    pub fn select_module(&mut self, module: Option<ModuleId>) {
        self.dispatch(WizardEvent::SelectModule(module));
    }

    pub fn set_university(&mut self, university: Option<UniversityId>) {
        self.dispatch(WizardEvent::SetUniversity(university));
    }

    pub fn set_source(&mut self, source: Option<QuestionSourceId>) {
        self.dispatch(WizardEvent::SetSource(source));
    }

    pub fn set_year(&mut self, year: Option<u16>) {
        self.dispatch(WizardEvent::SetYear(year));
    }

    pub fn set_rotation(&mut self, rotation: Option<Rotation>) {
        self.dispatch(WizardEvent::SetRotation(rotation));
    }

    pub fn set_question_type(&mut self, question_type: Option<QuestionType>) {
        self.dispatch(WizardEvent::SetQuestionType(question_type));
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.dispatch(WizardEvent::SetTitle(title.into()));
    }

    /// Applies every count that has arrived so far. Returns how many there were.
    pub fn poll_counts(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.dispatch(outcome.into_event());
            applied += 1;
        }
        applied
    }

    /// Waits until the count for the current filters is in.
    pub async fn settle(&mut self) {
        loop {
            self.poll_counts();
            if self.state.phase() != Phase::Counting {
                return;
            }
            if !self.negotiator.is_pending() {
                // The lookup task is done, so its outcome (if any) is already queued.
                match self.outcomes.try_recv() {
                    Ok(outcome) => self.dispatch(outcome.into_event()),
                    Err(_) => return,
                }
                continue;
            }
            // The lookup task may end without sending anything if it panics.
            let next = tokio::select! {
                biased;
                outcome = self.outcomes.recv() => Some(outcome),
                () = self.negotiator.wait_idle() => None,
            };
            match next {
                Some(Some(outcome)) => self.dispatch(outcome.into_event()),
                Some(None) => return,
                None => {}
            }
        }
    }

    /// Distinct filter values found in the questions of the current selection.
    pub async fn load_criteria_options(&self) -> Result<CriteriaOptions, ApiError> {
        let Some(query) = QuestionsQuery::for_selection(self.state.selection()) else {
            return Ok(CriteriaOptions::default());
        };
        let questions = self.api.questions(&query).await?;
        Ok(CriteriaOptions::from_questions(
            &questions,
            self.state.criteria(),
        ))
    }

    pub async fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        if matches!(self.state.phase(), Phase::Submitting | Phase::Submitted) {
            return Err(SubmitError::AlreadySubmitting);
        }
        self.poll_counts();
        let submission = submit::validate(&self.state, &self.filters)?;
        self.dispatch(WizardEvent::SubmitStarted);
        if !self.state.is_submitting() {
            log::debug!("submit refused in phase {:?}", self.state.phase());
            return Err(SubmitError::AlreadySubmitting);
        }

        let api = self.api.clone();
        let session_type = self.session_type;
        let mut in_flight = InFlight {
            state: &mut self.state,
            finished: false,
        };
        let result = submit::submit(&*api, submission, session_type).await;
        in_flight.finish(result.is_ok());

        match &result {
            Ok(outcome) => log::info!("{}", outcome.message()),
            Err(e) => log::warn!("session creation failed: {e:?}"),
        }
        result
    }
}

/// Leaves `Submitting` even if the submit future is dropped half way.
struct InFlight<'a> {
    state: &'a mut WizardState,
    finished: bool,
}

impl InFlight<'_> {
    fn finish(&mut self, succeeded: bool) {
        let event = if succeeded {
            WizardEvent::SubmitSucceeded
        } else {
            WizardEvent::SubmitFailed
        };
        *self.state = std::mem::take(&mut *self.state).apply(&event);
        self.finished = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.finish(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationError;
    use crate::test_support::{FakeBank, content_filters, question};

    fn wizard(api: &Arc<FakeBank>) -> SessionWizard<FakeBank> {
        SessionWizard::new(api.clone(), content_filters())
    }

    fn fill_required(wizard: &mut SessionWizard<FakeBank>) {
        wizard.select_unit(Some(UnitId(1)));
        wizard.set_university(Some(UniversityId(5)));
        wizard.set_source(Some(QuestionSourceId(2)));
        wizard.set_year(Some(2023));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_accessible_questions_block_submission() {
        let api = Arc::new(FakeBank::new().with_count(Some(0), 12));
        let mut wizard = wizard(&api);
        fill_required(&mut wizard);
        wizard.set_title("Cardio");
        wizard.settle().await;

        assert_eq!(wizard.state().available_count(), 0);
        assert_eq!(wizard.state().phase(), Phase::EmptyResult);
        let err = wizard.submit().await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Validation(ValidationError::NoQuestionsAvailable)
        ));
        assert!(api.question_calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn total_count_is_used_without_entitlement_info() {
        let api = Arc::new(FakeBank::new().with_count(None, 12));
        let mut wizard = wizard(&api);
        fill_required(&mut wizard);
        wizard.settle().await;
        assert_eq!(wizard.state().available_count(), 12);
        assert_eq!(wizard.state().phase(), Phase::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn short_title_is_rejected_before_any_request() {
        let api = Arc::new(FakeBank::new());
        let mut wizard = wizard(&api);
        fill_required(&mut wizard);
        wizard.set_title("AB");
        wizard.settle().await;

        let calls_before = api.total_calls();
        let err = wizard.submit().await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::Validation(ValidationError::TitleTooShort)
        ));
        assert_eq!(api.total_calls(), calls_before);
        assert_eq!(wizard.state().phase(), Phase::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn full_flow_creates_one_session() {
        let api = Arc::new(FakeBank::new().with_questions(vec![
            question(1, 5, 2, 2023, None, QuestionType::SingleChoice),
            question(2, 5, 2, 2021, None, QuestionType::SingleChoice),
        ]));
        let mut wizard = wizard(&api);
        fill_required(&mut wizard);
        // Changing the year back and forth inside the window costs nothing extra.
        wizard.set_year(Some(2022));
        wizard.set_year(Some(2023));
        wizard.set_title("Cardio revision");
        wizard.settle().await;
        assert_eq!(api.count_calls().len(), 1);
        assert_eq!(wizard.state().available_count(), 25);

        let outcome = wizard.submit().await.unwrap();
        assert_eq!(outcome.route(), Some("/sessions/sess-1"));
        let SubmitOutcome::Created {
            sampled_question_ids,
            ..
        } = &outcome
        else {
            panic!("expected a created session");
        };
        assert_eq!(sampled_question_ids, &vec![exam_model::QuestionId(1)]);
        assert_eq!(wizard.state().phase(), Phase::Submitted);

        let created = api.created.lock().unwrap().clone();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].title, "Cardio revision");
        assert_eq!(created[0].question_count, 25);
        assert_eq!(created[0].session_type, SessionType::Exam);

        assert!(matches!(
            wizard.submit().await,
            Err(SubmitError::AlreadySubmitting)
        ));
        assert_eq!(api.created.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn changing_filters_after_creation_does_not_reopen_submit() {
        let api = Arc::new(FakeBank::new().with_questions(vec![question(
            1,
            5,
            2,
            2023,
            Some(Rotation::R1),
            QuestionType::SingleChoice,
        )]));
        let mut wizard = wizard(&api);
        fill_required(&mut wizard);
        wizard.set_title("Cardio");
        wizard.settle().await;
        wizard.submit().await.unwrap();

        wizard.set_rotation(Some(Rotation::R1));
        wizard.settle().await;
        assert_eq!(wizard.state().phase(), Phase::Submitted);
        assert!(matches!(
            wizard.submit().await,
            Err(SubmitError::AlreadySubmitting)
        ));
        assert_eq!(api.created.lock().unwrap().len(), 1);

        // A new selection starts a fresh session.
        wizard.select_module(Some(ModuleId(30)));
        assert_eq!(wizard.state().phase(), Phase::SelectingCriteria);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_creation_allows_a_retry() {
        let api = Arc::new(
            FakeBank::new().with_questions(vec![question(
                1,
                5,
                2,
                2023,
                None,
                QuestionType::SingleChoice,
            )]),
        );
        *api.create_status.lock().unwrap() = Some(500);
        let mut wizard = wizard(&api);
        wizard.set_session_type(SessionType::Practice);
        fill_required(&mut wizard);
        wizard.set_title("Cardio");
        wizard.settle().await;

        let err = wizard.submit().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "The server ran into an error. Please try again later."
        );
        assert_eq!(wizard.state().phase(), Phase::Ready);

        *api.create_status.lock().unwrap() = None;
        wizard.submit().await.unwrap();
        let created = api.created.lock().unwrap();
        assert_eq!(created[0].session_type, SessionType::Practice);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_selection_mid_count_drops_the_lookup() {
        let api = Arc::new(FakeBank::new());
        let mut wizard = wizard(&api);
        fill_required(&mut wizard);
        tokio::time::sleep(Duration::from_millis(100)).await;
        wizard.select_module(Some(ModuleId(30)));
        assert!(wizard.state().criteria().is_empty());

        tokio::time::sleep(Duration::from_secs(1)).await;
        wizard.settle().await;
        assert_eq!(wizard.poll_counts(), 0);
        assert_eq!(wizard.state().phase(), Phase::SelectingCriteria);
        assert_eq!(wizard.state().available_count(), 0);
        assert!(api.count_calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn settle_returns_when_the_lookup_panics() {
        let mut bank = FakeBank::new();
        bank.count_delay = Duration::from_secs(1);
        bank.count_panics = true;
        let api = Arc::new(bank);
        let mut wizard = wizard(&api);
        fill_required(&mut wizard);

        wizard.settle().await;
        assert_eq!(wizard.state().phase(), Phase::Counting);
        assert_eq!(wizard.state().available_count(), 0);
        assert_eq!(api.count_calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_count_reads_as_zero() {
        let api = Arc::new(FakeBank::new());
        *api.count_response.lock().unwrap() = Err(503);
        let mut wizard = wizard(&api);
        fill_required(&mut wizard);
        wizard.settle().await;
        assert_eq!(wizard.state().available_count(), 0);
        assert_eq!(wizard.state().phase(), Phase::EmptyResult);
    }

    #[tokio::test]
    async fn load_fetches_the_content_tree() {
        let api = Arc::new(FakeBank::new());
        let wizard = SessionWizard::load(api, DEFAULT_QUIESCENCE).await.unwrap();
        assert_eq!(wizard.unit_options().len(), 2);
        let modules = wizard.module_options();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].label, "Pharmacology");
    }

    #[tokio::test]
    async fn criteria_options_follow_the_selection() {
        let api = Arc::new(FakeBank::new().with_questions(vec![
            question(1, 5, 2, 2023, None, QuestionType::SingleChoice),
            question(2, 6, 2, 2021, Some(Rotation::R2), QuestionType::MultipleChoice),
        ]));
        let mut wizard = wizard(&api);
        assert!(wizard.load_criteria_options().await.unwrap().is_empty());
        assert!(api.question_calls.lock().unwrap().is_empty());

        wizard.select_module(Some(ModuleId(30)));
        wizard.set_university(Some(UniversityId(6)));
        let options = wizard.load_criteria_options().await.unwrap();
        assert_eq!(options.universities.len(), 2);
        assert_eq!(options.years.iter().copied().collect::<Vec<_>>(), vec![2021]);
        assert_eq!(
            *api.question_calls.lock().unwrap(),
            vec![QuestionsQuery::Module {
                module_id: ModuleId(30)
            }]
        );
    }
}
