use exam_model::{
    FilterCriteria, MIN_TITLE_LEN, ModuleId, QuestionSourceId, QuestionType, Rotation, Selection,
    UnitId, UniversityId,
};

/// Where the wizard is in its lifecycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Nothing selected.
    #[default]
    Empty,
    /// A unit or module is selected but a required filter is missing.
    SelectingCriteria,
    /// Filters are complete and a count is pending or in flight.
    Counting,
    /// Last count was positive.
    Ready,
    /// Last count was zero, or the lookup failed.
    EmptyResult,
    Submitting,
    /// Terminal unless the selection changes.
    Submitted,
}

/// Snapshot of the (selection, criteria) combination a count was computed for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FilterKey(String);

impl FilterKey {
    fn new(selection: Selection, criteria: &FilterCriteria) -> Option<Self> {
        serde_json::to_string(&(selection, criteria))
            .inspect_err(|e| log::error!("could not serialize filter key: {e:?}"))
            .ok()
            .map(FilterKey)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WizardEvent {
    /// `None` deselects the unit, if one is selected.
    SelectUnit(Option<UnitId>),
    /// `None` deselects the module, if one is selected.
    SelectModule(Option<ModuleId>),
    SetUniversity(Option<UniversityId>),
    SetSource(Option<QuestionSourceId>),
    SetYear(Option<u16>),
    SetRotation(Option<Rotation>),
    SetQuestionType(Option<QuestionType>),
    SetTitle(String),
    CountResolved { key: FilterKey, count: u32 },
    CountFailed { key: FilterKey },
    SubmitStarted,
    SubmitFailed,
    SubmitSucceeded,
}

/// Everything the student has entered so far, plus the negotiated question count.
///
/// Only [`WizardState::apply`] changes it, which is what keeps the rules in one place:
/// - a unit and a module are never selected together;
/// - changing the selection clears every filter and the count;
/// - changing a filter clears the count until a new one comes in;
/// - counts computed for an older combination of filters are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WizardState {
    selection: Selection,
    criteria: FilterCriteria,
    title: String,
    available_count: u32,
    phase: Phase,
}

impl WizardState {
    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn available_count(&self) -> u32 {
        self.available_count
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn required_filters_complete(&self) -> bool {
        !self.selection.is_none() && self.criteria.is_complete()
    }

    pub fn title_is_valid(&self) -> bool {
        self.title.trim().chars().count() >= MIN_TITLE_LEN
    }

    pub fn can_submit(&self) -> bool {
        self.required_filters_complete() && self.title_is_valid()
    }

    /// `None` until the required filters are complete.
    pub fn filter_key(&self) -> Option<FilterKey> {
        if !self.required_filters_complete() {
            return None;
        }
        FilterKey::new(self.selection, &self.criteria)
    }

    pub fn apply(self, event: &WizardEvent) -> Self {
        use WizardEvent::*;
        match event {
            SelectUnit(Some(id)) => self.with_selection(Selection::Unit(*id)),
            SelectUnit(None) if self.selection.unit().is_some() => {
                self.with_selection(Selection::None)
            }
            SelectModule(Some(id)) => self.with_selection(Selection::Module(*id)),
            SelectModule(None) if self.selection.module().is_some() => {
                self.with_selection(Selection::None)
            }
            SelectUnit(None) | SelectModule(None) => self,
            SetUniversity(value) => self.with_criteria(|c| c.university = *value),
            SetSource(value) => self.with_criteria(|c| c.source = *value),
            SetYear(value) => self.with_criteria(|c| c.year = *value),
            SetRotation(value) => self.with_criteria(|c| c.rotation = *value),
            SetQuestionType(value) => self.with_criteria(|c| c.question_type = *value),
            SetTitle(title) => Self {
                title: title.clone(),
                ..self
            },
            CountResolved { key, count } => self.with_count(key, *count),
            CountFailed { key } => self.with_count(key, 0),
            SubmitStarted => {
                if self.phase == Phase::Ready && self.can_submit() {
                    Self {
                        phase: Phase::Submitting,
                        ..self
                    }
                } else {
                    log::debug!("ignoring submit from {:?}", self.phase);
                    self
                }
            }
            SubmitFailed if self.phase == Phase::Submitting => {
                let phase = self.count_phase();
                Self { phase, ..self }
            }
            SubmitSucceeded if self.phase == Phase::Submitting => Self {
                phase: Phase::Submitted,
                ..self
            },
            SubmitFailed | SubmitSucceeded => self,
        }
    }

    fn with_selection(self, selection: Selection) -> Self {
        if selection == self.selection {
            return self;
        }
        Self {
            selection,
            criteria: FilterCriteria::default(),
            available_count: 0,
            phase: if selection.is_none() {
                Phase::Empty
            } else {
                Phase::SelectingCriteria
            },
            title: self.title,
        }
    }

    fn with_criteria(self, update: impl FnOnce(&mut FilterCriteria)) -> Self {
        let mut criteria = self.criteria.clone();
        update(&mut criteria);
        if criteria == self.criteria {
            return self;
        }
        // Only a new selection leaves a submission behind.
        let phase = if matches!(self.phase, Phase::Submitting | Phase::Submitted) {
            self.phase
        } else if self.selection.is_none() {
            Phase::Empty
        } else if criteria.is_complete() {
            Phase::Counting
        } else {
            Phase::SelectingCriteria
        };
        Self {
            criteria,
            available_count: 0,
            phase,
            ..self
        }
    }

    fn with_count(self, key: &FilterKey, count: u32) -> Self {
        if self.filter_key().as_ref() != Some(key) {
            log::debug!("dropping count {count} computed for stale filters");
            return self;
        }
        let mut next = Self {
            available_count: count,
            ..self
        };
        if !matches!(next.phase, Phase::Submitting | Phase::Submitted) {
            next.phase = next.count_phase();
        }
        next
    }

    fn count_phase(&self) -> Phase {
        if self.available_count > 0 {
            Phase::Ready
        } else {
            Phase::EmptyResult
        }
    }
}
