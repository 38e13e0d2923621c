use std::sync::Arc;
use std::time::Duration;

use exam_model::{ContentFilters, QuestionCountRequest};
use qbank_client::{ApiError, QuestionBank};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::hierarchy::resolve_course_ids;
use crate::{FilterKey, WizardEvent, WizardState};

/// How long the filters have to stay unchanged before a count is requested.
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(300);

/// Count request for the current filters, or `None` while a required filter is missing.
pub fn build_count_request(
    state: &WizardState,
    filters: &ContentFilters,
) -> Option<QuestionCountRequest> {
    if state.selection().is_none() {
        return None;
    }
    let required = state.criteria().required()?;
    let course_ids = resolve_course_ids(filters, state.selection())
        .into_iter()
        .collect();
    Some(QuestionCountRequest::new(
        course_ids,
        required,
        state.criteria(),
    ))
}

#[derive(Debug)]
pub struct CountOutcome {
    pub key: FilterKey,
    pub result: Result<u32, ApiError>,
}

impl CountOutcome {
    /// Failures are logged here and otherwise just mean "zero questions".
    pub fn into_event(self) -> WizardEvent {
        match self.result {
            Ok(count) => WizardEvent::CountResolved {
                key: self.key,
                count,
            },
            Err(e) => {
                log::warn!("question count lookup failed: {e}");
                WizardEvent::CountFailed { key: self.key }
            }
        }
    }
}

/// Debounces question-count lookups.
///
/// Every call to [`CountNegotiator::schedule`] with a new combination of filters cancels whatever
/// was scheduled before (including a request already in flight) and starts a task that waits out
/// the quiescence window before asking the API. Asking again for the combination that is already
/// scheduled does nothing, so there is at most one request per combination and never more than
/// one outstanding.
pub struct CountNegotiator<A> {
    api: Arc<A>,
    quiescence: Duration,
    scheduled: Option<FilterKey>,
    pending: Option<JoinHandle<()>>,
    outcomes: mpsc::UnboundedSender<CountOutcome>,
}

impl<A: QuestionBank + 'static> CountNegotiator<A> {
    pub fn new(
        api: Arc<A>,
        quiescence: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<CountOutcome>) {
        let (outcomes, receiver) = mpsc::unbounded_channel();
        let negotiator = Self {
            api,
            quiescence,
            scheduled: None,
            pending: None,
            outcomes,
        };
        (negotiator, receiver)
    }

    /// Returns true if a new lookup was started.
    pub fn schedule(&mut self, state: &WizardState, filters: &ContentFilters) -> bool {
        let (Some(key), Some(request)) = (state.filter_key(), build_count_request(state, filters))
        else {
            self.cancel();
            self.scheduled = None;
            return false;
        };
        if self.scheduled.as_ref() == Some(&key) {
            return false;
        }

        self.cancel();
        self.scheduled = Some(key.clone());

        if request.course_ids.is_empty() {
            log::debug!("selection has no courses, not asking for a count");
            let _ = self.outcomes.send(CountOutcome {
                key,
                result: Ok(0),
            });
            return true;
        }

        let api = self.api.clone();
        let outcomes = self.outcomes.clone();
        let quiescence = self.quiescence;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiescence).await;
            log::debug!(
                "requesting question count for {} courses",
                request.course_ids.len()
            );
            let result = api
                .question_count(&request)
                .await
                .map(|response| response.available());
            // The receiver is gone once the wizard is dropped, nothing left to tell.
            let _ = outcomes.send(CountOutcome { key, result });
        }));
        true
    }

    /// Aborts the scheduled lookup, if any. The remembered key is kept.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Resolves once the scheduled lookup has finished, been aborted or panicked.
    ///
    /// A lookup that panicked sent nothing, so its key is forgotten and the same filters can be
    /// scheduled again.
    pub async fn wait_idle(&mut self) {
        let Some(handle) = self.pending.as_mut() else {
            return;
        };
        if let Err(e) = handle.await
            && e.is_panic()
        {
            log::error!("question count lookup panicked");
            self.scheduled = None;
        }
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<A> Drop for CountNegotiator<A> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
