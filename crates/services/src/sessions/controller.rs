use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use quiz_core::Clock;
use quiz_core::model::{
    ExamSettings, Quiz, QuizId, QuizMode, QuizSession, Score, SelectOutcome, SessionPhase,
    SessionState, StoredResult, SubmitCheck,
};
use storage::{Partition, SessionPartitions};

use crate::api::QuizApi;
use crate::error::{ApiError, SessionError};
use crate::notify::{Notifier, Toast};

use super::{sync, timer};

//
// ─── PUBLIC TYPES ──────────────────────────────────────────────────────────────
//

/// How `open` satisfied the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Fetched from the quiz API.
    Fetched,
    /// The session was already loaded here or persisted by an earlier run.
    Resumed,
    /// Another `open` for the same quiz is still fetching.
    Pending,
    /// The session was reset while the fetch was outstanding.
    Discarded,
}

/// Result of `request_submit`.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitRequest {
    NeedsConfirmation { unanswered: u32 },
    Submitted(SubmitOutcome),
}

/// Result of `finalize_submit`.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Graded; navigate to the results view.
    Accepted { result: StoredResult, score: Score },
    /// Another submission is already in flight.
    InFlight,
    /// The session was reset or replaced before the response arrived.
    Discarded,
}

/// Noteworthy things that happened outside a direct call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    AutoSubmitted { unanswered: u32 },
    Submitted,
    SubmitFailed,
    Reloaded,
    Mismatch,
    ClearedElsewhere,
}

/// Published on every change. `revision` increases monotonically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStatus {
    pub revision: u64,
    pub remaining_seconds: Option<u64>,
    pub event: Option<SessionEvent>,
}

/// Read-only copy of the loaded session for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub quiz: Quiz,
    pub state: SessionState,
    pub phase: SessionPhase,
    pub remaining_seconds: Option<u64>,
}

//
// ─── SHARED STATE ──────────────────────────────────────────────────────────────
//

pub(super) struct Shared {
    mode: QuizMode,
    api: Arc<dyn QuizApi>,
    partitions: SessionPartitions,
    notifier: Arc<dyn Notifier>,
    clock: Clock,
    inner: Mutex<Inner>,
    status: watch::Sender<SessionStatus>,
}

#[derive(Default)]
struct Inner {
    session: Option<QuizSession>,
    loading: Option<QuizId>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    sync: Option<JoinHandle<()>>,
    auto_submitted: bool,
    /// Fetched quiz not yet written to the `quiz` partition.
    unsaved_quiz: Option<Quiz>,
}

impl Inner {
    fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }

    /// Drop the session and invalidate every in-flight completion.
    fn unload(&mut self) {
        self.cancel_timer();
        self.session = None;
        self.loading = None;
        self.generation += 1;
        self.auto_submitted = false;
        self.unsaved_quiz = None;
    }
}

/// What a timer tick decided.
pub(super) enum Tick {
    Continue,
    Stop,
    Expired { unanswered: u32 },
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, remaining_seconds: Option<u64>, event: Option<SessionEvent>) {
        self.status.send_modify(|status| {
            status.revision += 1;
            status.remaining_seconds = remaining_seconds;
            status.event = event;
        });
    }

    fn remaining_locked(&self, inner: &Inner) -> Option<u64> {
        inner
            .session
            .as_ref()
            .and_then(|session| session.remaining_seconds(self.clock.now()))
    }

    /// Write the session partition, preceded by the quiz itself on the first
    /// write after a fetch. Opening a quiz alone never touches shared storage.
    async fn persist(&self, state: Option<SessionState>) {
        let Some(state) = state else {
            return;
        };
        let unsaved_quiz = self.lock().unsaved_quiz.take();
        if let Some(quiz) = unsaved_quiz {
            if let Err(err) = self.partitions.save_quiz(&quiz, self.clock.now()).await {
                warn!(error = %err, quiz_id = %quiz.id(), "failed to persist quiz");
            }
        }
        if let Err(err) = self.partitions.save_session(&state, self.clock.now()).await {
            warn!(error = %err, quiz_id = %state.quiz_id(), "failed to persist session");
        }
    }

    /// Recompute the remaining time for the timer task.
    ///
    /// On expiry the caller's own handle is detached here so the follow-up
    /// submission cannot abort the task that runs it.
    pub(super) fn timer_tick(&self, generation: u64) -> Tick {
        let mut inner = self.lock();
        if inner.generation != generation {
            return Tick::Stop;
        }
        let Some(session) = inner.session.as_ref() else {
            return Tick::Stop;
        };
        let phase = session.phase();
        let remaining = session.remaining_seconds(self.clock.now());
        let unanswered = session.unanswered();

        if matches!(phase, SessionPhase::Completed | SessionPhase::Loaded) || remaining.is_none()
        {
            return Tick::Stop;
        }

        let changed = self.status.send_if_modified(|status| {
            if status.remaining_seconds == remaining {
                return false;
            }
            status.revision += 1;
            status.remaining_seconds = remaining;
            status.event = None;
            true
        });
        if changed {
            debug!(remaining = ?remaining, "exam timer tick");
        }

        if remaining == Some(0) && phase.can_finalize() && !inner.auto_submitted {
            inner.auto_submitted = true;
            drop(inner.timer.take());
            return Tick::Expired { unanswered };
        }
        Tick::Continue
    }

    pub(super) async fn expire(&self, unanswered: u32) {
        info!(unanswered, "exam time expired, submitting");
        self.notifier.notify(Toast::info(format!(
            "Time's up! Submitting with {unanswered} unanswered question(s)."
        )));
        let remaining = self.remaining_locked(&self.lock());
        self.publish(remaining, Some(SessionEvent::AutoSubmitted { unanswered }));
        if let Err(err) = self.finalize_submit().await {
            debug!(error = %err, "automatic submission did not go through");
        }
    }

    async fn finalize_submit(&self) -> Result<SubmitOutcome, SessionError> {
        let (payload, generation, state) = {
            let mut inner = self.lock();
            let generation = inner.generation;
            let session = inner.session.as_mut().ok_or(SessionError::NotLoaded)?;
            let Some(payload) = session.begin_submit(self.clock.now())? else {
                return Ok(SubmitOutcome::InFlight);
            };
            (payload, generation, session.state().clone())
        };
        self.persist(Some(state)).await;
        info!(
            quiz_id = %payload.quiz_id,
            mode = %payload.mode,
            answered = payload.answered(),
            "submitting quiz"
        );

        let response = self.api.submit_quiz(&payload).await;

        match response {
            Ok(result) => {
                let score = {
                    let mut inner = self.lock();
                    if inner.generation != generation {
                        debug!(quiz_id = %payload.quiz_id, "discarding stale submission response");
                        return Ok(SubmitOutcome::Discarded);
                    }
                    let score = inner
                        .session
                        .as_mut()
                        .map(|session| {
                            session.submission_succeeded();
                            session.score()
                        })
                        .unwrap_or_else(|| Score::new(0, payload.total_questions));
                    inner.unload();
                    score
                };

                if let Err(err) = self.partitions.clear_session(self.mode).await {
                    warn!(error = %err, "failed to clear session partition");
                }
                if let Err(err) = self.partitions.clear_quiz().await {
                    warn!(error = %err, "failed to clear quiz partition");
                }
                self.notifier.notify(Toast::success("Quiz submitted."));
                self.publish(None, Some(SessionEvent::Submitted));
                Ok(SubmitOutcome::Accepted { result, score })
            }
            Err(err) => {
                let remaining = {
                    let mut inner = self.lock();
                    if inner.generation != generation {
                        debug!(quiz_id = %payload.quiz_id, "discarding stale submission failure");
                        return Ok(SubmitOutcome::Discarded);
                    }
                    if let Some(session) = inner.session.as_mut() {
                        session.submission_failed();
                    }
                    self.remaining_locked(&inner)
                };

                warn!(error = %err, quiz_id = %payload.quiz_id, "quiz submission failed");
                let err = SessionError::Submission(err);
                self.notifier.notify(Toast::error(err.user_message()));
                self.publish(remaining, Some(SessionEvent::SubmitFailed));
                Err(err)
            }
        }
    }

    /// Pick up a change another instance wrote to our partitions.
    pub(super) async fn reload(self: &Arc<Self>, partitions: &[Partition]) {
        let mode_partition = Partition::for_mode(self.mode);
        if !partitions
            .iter()
            .any(|p| *p == mode_partition || *p == Partition::Quiz)
        {
            return;
        }
        let persisted = match self.partitions.load_session(self.mode).await {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable session partition");
                return;
            }
        };

        let event = {
            let mut inner = self.lock();
            let Some(session) = inner.session.as_ref() else {
                return;
            };
            if session.phase() == SessionPhase::Submitting {
                return;
            }
            // A session that was only opened has not claimed the partition yet.
            let claimed = inner.unsaved_quiz.is_none() || session.state().is_underway();
            let foreign = persisted
                .as_ref()
                .is_none_or(|state| state.quiz_id() != session.quiz_id());
            if foreign && !claimed {
                return;
            }
            match persisted {
                None => {
                    inner.unload();
                    SessionEvent::ClearedElsewhere
                }
                Some(state) if state.quiz_id() != session.quiz_id() => {
                    warn!(
                        loaded = %session.quiz_id(),
                        persisted = %state.quiz_id(),
                        "another window switched quizzes"
                    );
                    inner.unload();
                    self.notifier.notify(Toast::error("Unable to load quiz."));
                    SessionEvent::Mismatch
                }
                Some(state) if state == *session.state() => return,
                Some(state) => {
                    let was_started = session.phase() != SessionPhase::Loaded;
                    match QuizSession::resume(session.quiz().clone(), state) {
                        Ok(mut resumed) => {
                            if was_started {
                                resumed.start(self.clock.now());
                            }
                            inner.session = Some(resumed);
                            inner.generation += 1;
                            inner.cancel_timer();
                            if was_started {
                                self.spawn_timer_locked(&mut inner);
                            }
                            SessionEvent::Reloaded
                        }
                        Err(err) => {
                            warn!(error = %err, "ignoring inconsistent session partition");
                            return;
                        }
                    }
                }
            }
        };
        info!(event = ?event, "session changed in another window");
        let remaining = self.remaining_locked(&self.lock());
        self.publish(remaining, Some(event));
    }

    fn spawn_timer_locked(self: &Arc<Self>, inner: &mut Inner) {
        inner.cancel_timer();
        let timed = inner
            .session
            .as_ref()
            .is_some_and(|session| session.state().is_timed());
        if timed && !inner.auto_submitted {
            inner.timer = Some(timer::spawn(Arc::downgrade(self), inner.generation));
        }
    }
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Drives one quiz-taking view: load, answer, navigate, submit.
///
/// Owns the timer and sync tasks; dropping the controller aborts them.
pub struct SessionController {
    shared: Arc<Shared>,
}

impl SessionController {
    #[must_use]
    pub fn new(
        mode: QuizMode,
        api: Arc<dyn QuizApi>,
        partitions: SessionPartitions,
        notifier: Arc<dyn Notifier>,
        clock: Clock,
    ) -> Self {
        let (status, _) = watch::channel(SessionStatus::default());
        Self {
            shared: Arc::new(Shared {
                mode,
                api,
                partitions,
                notifier,
                clock,
                inner: Mutex::new(Inner::default()),
                status,
            }),
        }
    }

    #[must_use]
    pub fn mode(&self) -> QuizMode {
        self.shared.mode
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.shared.status.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        let inner = self.shared.lock();
        let session = inner.session.as_ref()?;
        Some(SessionSnapshot {
            quiz: session.quiz().clone(),
            state: session.state().clone(),
            phase: session.phase(),
            remaining_seconds: session.remaining_seconds(self.shared.clock.now()),
        })
    }

    #[must_use]
    pub fn phase(&self) -> Option<SessionPhase> {
        self.shared.lock().session.as_ref().map(QuizSession::phase)
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> Option<u64> {
        self.shared.remaining_locked(&self.shared.lock())
    }

    #[must_use]
    pub fn score(&self) -> Option<Score> {
        self.shared.lock().session.as_ref().map(QuizSession::score)
    }

    /// Load the quiz for this view.
    ///
    /// Resumes an in-memory or persisted session for the same id, otherwise
    /// fetches it once. Failures are reported to the notifier; the caller
    /// redirects home after `SessionError::redirect_delay`.
    ///
    /// # Errors
    ///
    /// Returns `QuizMismatch` if another quiz is loaded, `NotFound`/`Network`
    /// if the fetch fails.
    pub async fn open(&self, quiz_id: &QuizId) -> Result<OpenOutcome, SessionError> {
        let generation = {
            let mut inner = self.shared.lock();
            let busy_with = inner
                .session
                .as_ref()
                .map(|session| session.quiz_id().clone())
                .or_else(|| inner.loading.clone());
            match busy_with {
                Some(loaded) if loaded != *quiz_id => {
                    drop(inner);
                    warn!(%loaded, requested = %quiz_id, "quiz mismatch on open");
                    let err = SessionError::QuizMismatch {
                        loaded,
                        requested: quiz_id.clone(),
                    };
                    self.shared.notifier.notify(Toast::error(err.user_message()));
                    return Err(err);
                }
                Some(_) if inner.session.is_some() => return Ok(OpenOutcome::Resumed),
                Some(_) => return Ok(OpenOutcome::Pending),
                None => {}
            }
            inner.loading = Some(quiz_id.clone());
            inner.generation
        };

        let (session, outcome) = match self.resume_persisted(quiz_id).await {
            Some(session) => (session, OpenOutcome::Resumed),
            None => match self.shared.api.get_quiz(quiz_id).await {
                Ok(quiz) => (self.restore(quiz).await, OpenOutcome::Fetched),
                Err(err) => {
                    let err = match err {
                        ApiError::NotFound => SessionError::NotFound,
                        other => SessionError::Network(other),
                    };
                    {
                        let mut inner = self.shared.lock();
                        if inner.generation == generation {
                            inner.loading = None;
                        }
                    }
                    warn!(error = %err, %quiz_id, "quiz load failed");
                    self.shared.notifier.notify(Toast::error(err.user_message()));
                    return Err(err);
                }
            },
        };

        {
            let mut inner = self.shared.lock();
            if inner.generation != generation || inner.loading.as_ref() != Some(quiz_id) {
                return Ok(OpenOutcome::Discarded);
            }
            inner.unsaved_quiz =
                (outcome == OpenOutcome::Fetched).then(|| session.quiz().clone());
            inner.loading = None;
            inner.session = Some(session);
            inner.auto_submitted = false;
        }
        info!(%quiz_id, mode = %self.shared.mode, outcome = ?outcome, "quiz opened");

        self.ensure_sync();
        self.shared.publish(None, None);
        Ok(outcome)
    }

    async fn resume_persisted(&self, quiz_id: &QuizId) -> Option<QuizSession> {
        match self.shared.partitions.load_quiz().await {
            Ok(Some(quiz)) if quiz.id() == quiz_id => Some(self.restore(quiz).await),
            Ok(_) => None,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable quiz partition");
                None
            }
        }
    }

    /// Pair `quiz` with this mode's persisted state when it belongs to the same
    /// quiz, so an attempt survives another window replacing the `quiz`
    /// partition.
    async fn restore(&self, quiz: Quiz) -> QuizSession {
        let state = match self.shared.partitions.load_session(self.shared.mode).await {
            Ok(Some(state)) if state.quiz_id() == quiz.id() => state,
            Ok(_) => return QuizSession::new(quiz, self.shared.mode),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable session partition");
                return QuizSession::new(quiz, self.shared.mode);
            }
        };
        match QuizSession::resume(quiz.clone(), state) {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "starting fresh over stale session partition");
                QuizSession::new(quiz, self.shared.mode)
            }
        }
    }

    fn ensure_sync(&self) {
        let mut inner = self.shared.lock();
        if inner.sync.is_none() {
            inner.sync = Some(sync::spawn(
                Arc::downgrade(&self.shared),
                self.shared.partitions.subscribe(),
            ));
        }
    }

    /// Replace the timer settings of an exam that has not started yet.
    ///
    /// # Errors
    ///
    /// Returns `NotLoaded` without a session, or a model error for study
    /// sessions and exams already in progress.
    pub async fn configure_exam(&self, settings: ExamSettings) -> Result<(), SessionError> {
        let state = {
            let mut inner = self.shared.lock();
            let session = inner.session.as_mut().ok_or(SessionError::NotLoaded)?;
            session.configure_exam(settings)?;
            session.state().clone()
        };
        self.shared.persist(Some(state)).await;
        self.shared.publish(None, None);
        Ok(())
    }

    /// Enter `InProgress`, stamping the exam start and starting the timer.
    ///
    /// # Errors
    ///
    /// Returns `NotLoaded` without a session.
    pub async fn start(&self) -> Result<(), SessionError> {
        let (state, remaining) = {
            let mut inner = self.shared.lock();
            let now = self.shared.clock.now();
            let session = inner.session.as_mut().ok_or(SessionError::NotLoaded)?;
            if !session.start(now) {
                return Ok(());
            }
            let state = session.state().clone();
            let remaining = session.remaining_seconds(now);
            self.shared.spawn_timer_locked(&mut inner);
            (state, remaining)
        };
        self.shared.persist(Some(state)).await;
        self.shared.publish(remaining, None);
        Ok(())
    }

    /// Record an answer. Study mode keeps the first answer per question.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAnswer` for indices outside the quiz and `NotInProgress`
    /// once submission has begun.
    pub async fn select_option(
        &self,
        ordinal: u32,
        option_index: usize,
    ) -> Result<SelectOutcome, SessionError> {
        let (outcome, state) = {
            let mut inner = self.shared.lock();
            let session = inner.session.as_mut().ok_or(SessionError::NotLoaded)?;
            let outcome = session.select_option(ordinal, option_index)?;
            let state = (outcome == SelectOutcome::Recorded).then(|| session.state().clone());
            (outcome, state)
        };
        if state.is_some() {
            self.shared.persist(state).await;
            self.shared.publish(self.remaining_seconds(), None);
        }
        Ok(outcome)
    }

    /// Move to `page`. Out-of-range pages are ignored.
    ///
    /// # Errors
    ///
    /// Returns `NotLoaded` without a session.
    pub async fn go_to_page(&self, page: u32) -> Result<bool, SessionError> {
        let state = {
            let mut inner = self.shared.lock();
            let session = inner.session.as_mut().ok_or(SessionError::NotLoaded)?;
            if !session.go_to_page(page) {
                return Ok(false);
            }
            session.state().clone()
        };
        self.shared.persist(Some(state)).await;
        self.shared.publish(self.remaining_seconds(), None);
        Ok(true)
    }

    /// Ask to submit. A fully answered quiz is submitted right away; otherwise
    /// the caller shows a confirmation and then calls `finalize_submit`.
    ///
    /// # Errors
    ///
    /// Returns `EmptySubmission` (also sent to the notifier) when nothing is
    /// answered, and submission errors from `finalize_submit`.
    pub async fn request_submit(&self) -> Result<SubmitRequest, SessionError> {
        let check = {
            let mut inner = self.shared.lock();
            let session = inner.session.as_mut().ok_or(SessionError::NotLoaded)?;
            session.request_submit()
        };
        match check.map_err(SessionError::from) {
            Ok(SubmitCheck::Ready) => Ok(SubmitRequest::Submitted(self.finalize_submit().await?)),
            Ok(SubmitCheck::NeedsConfirmation { unanswered }) => {
                self.shared.publish(self.remaining_seconds(), None);
                Ok(SubmitRequest::NeedsConfirmation { unanswered })
            }
            Err(err @ SessionError::EmptySubmission) => {
                self.shared.notifier.notify(Toast::error(err.user_message()));
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Leave the confirmation prompt and keep answering.
    pub fn cancel_submit(&self) {
        let changed = {
            let mut inner = self.shared.lock();
            inner.session.as_mut().is_some_and(|session| {
                let before = session.phase();
                session.cancel_submit();
                before != session.phase()
            })
        };
        if changed {
            self.shared.publish(self.remaining_seconds(), None);
        }
    }

    /// Submit the session. A call while a submission is in flight does nothing.
    ///
    /// # Errors
    ///
    /// Returns `Submission` if the API rejects it; the session stays answerable
    /// and may be submitted again.
    pub async fn finalize_submit(&self) -> Result<SubmitOutcome, SessionError> {
        self.shared.finalize_submit().await
    }

    /// Throw the session away for a retake.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the persisted partitions cannot be cleared.
    pub async fn reset(&self) -> Result<(), SessionError> {
        self.shared.lock().unload();
        self.shared.partitions.clear_session(self.shared.mode).await?;
        self.shared.partitions.clear_quiz().await?;
        self.shared.publish(None, None);
        Ok(())
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        inner.cancel_timer();
        if let Some(handle) = inner.sync.take() {
            handle.abort();
        }
    }
}
