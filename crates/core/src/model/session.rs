use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::exam::ExamSettings;
use crate::model::ids::QuizId;
use crate::model::mode::QuizMode;
use crate::model::quiz::Quiz;
use crate::model::result::Score;
use crate::model::submission::{SubmissionPayload, SubmittedAnswer};
use crate::time::elapsed_whole_seconds;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("operation not allowed while session is {phase:?}")]
    InvalidPhase { phase: SessionPhase },

    #[error("question {ordinal} is outside 1..={total}")]
    OrdinalOutOfRange { ordinal: u32, total: u32 },

    #[error("option {option} does not exist for question {ordinal}")]
    OptionOutOfRange { ordinal: u32, option: usize },

    #[error("no questions have been answered")]
    EmptySubmission,

    #[error("exam settings only apply to exam sessions")]
    NotAnExam,

    #[error("persisted session belongs to quiz {persisted}, not {loaded}")]
    QuizMismatch { persisted: QuizId, loaded: QuizId },

    #[error("invalid persisted session: {0}")]
    InvalidPersistedState(String),
}

//
// ─── PERSISTED STATE ───────────────────────────────────────────────────────────
//

/// The serializable part of a quiz attempt.
///
/// This is what gets written to the `exam` / `study` partitions so a restart
/// or a second window resumes mid-session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    quiz_id: QuizId,
    mode: QuizMode,
    /// Ordinal (1-based) to chosen option index.
    selected_options: BTreeMap<u32, usize>,
    current_page: u32,
    completed: bool,
    exam_settings: Option<ExamSettings>,
    exam_started_at: Option<DateTime<Utc>>,
}

impl SessionState {
    #[must_use]
    pub fn new(quiz_id: QuizId, mode: QuizMode) -> Self {
        let exam_settings = match mode {
            QuizMode::Exam => Some(ExamSettings::untimed()),
            QuizMode::Study => None,
        };
        Self {
            quiz_id,
            mode,
            selected_options: BTreeMap::new(),
            current_page: 1,
            completed: false,
            exam_settings,
            exam_started_at: None,
        }
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    #[must_use]
    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    #[must_use]
    pub fn selected_options(&self) -> &BTreeMap<u32, usize> {
        &self.selected_options
    }

    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn exam_settings(&self) -> Option<ExamSettings> {
        self.exam_settings
    }

    #[must_use]
    pub fn exam_started_at(&self) -> Option<DateTime<Utc>> {
        self.exam_started_at
    }

    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.exam_settings.is_some_and(|s| s.is_timed())
    }

    /// The attempt was entered or answered at some point, in this window or
    /// another one.
    #[must_use]
    pub fn is_underway(&self) -> bool {
        self.exam_started_at.is_some() || !self.selected_options.is_empty()
    }
}

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Where a loaded session sits in its lifecycle.
///
/// `Unloaded` is represented by the absence of a `QuizSession`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loaded,
    InProgress,
    /// Submit requested with unanswered questions; waiting on the user.
    ConfirmPending { unanswered: u32 },
    Submitting,
    Completed,
}

impl SessionPhase {
    #[must_use]
    pub fn accepts_answers(self) -> bool {
        matches!(self, SessionPhase::Loaded | SessionPhase::InProgress)
    }

    #[must_use]
    pub fn can_finalize(self) -> bool {
        matches!(
            self,
            SessionPhase::InProgress | SessionPhase::ConfirmPending { .. }
        )
    }
}

/// Effect of a `select_option` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Recorded,
    /// Same option already recorded; nothing changed.
    Unchanged,
    /// Study mode: the question was already answered.
    Locked,
}

/// What the caller must do after asking to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitCheck {
    /// Every question is answered; finalize right away.
    Ready,
    /// Some questions are unanswered; a confirmation dialog decides.
    NeedsConfirmation { unanswered: u32 },
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// A quiz attempt: the loaded quiz, its persisted state and its phase.
///
/// All transitions take `now` from the caller so time stays deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    quiz: Quiz,
    state: SessionState,
    phase: SessionPhase,
}

impl QuizSession {
    #[must_use]
    pub fn new(quiz: Quiz, mode: QuizMode) -> Self {
        let state = SessionState::new(quiz.id().clone(), mode);
        Self {
            quiz,
            state,
            phase: SessionPhase::Loaded,
        }
    }

    /// Rehydrate a session from a persisted state for the given quiz.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::QuizMismatch` if the state belongs to another
    /// quiz, or `InvalidPersistedState` if answers or page fall outside the quiz.
    pub fn resume(quiz: Quiz, state: SessionState) -> Result<Self, SessionStateError> {
        if state.quiz_id != *quiz.id() {
            return Err(SessionStateError::QuizMismatch {
                persisted: state.quiz_id,
                loaded: quiz.id().clone(),
            });
        }
        let total = quiz.total_questions();
        if state.current_page == 0 || state.current_page > total {
            return Err(SessionStateError::InvalidPersistedState(format!(
                "current page {} outside 1..={total}",
                state.current_page
            )));
        }
        for (&ordinal, &option) in &state.selected_options {
            let question = quiz.question(ordinal).ok_or_else(|| {
                SessionStateError::InvalidPersistedState(format!("answer for question {ordinal}"))
            })?;
            if !question.has_option(option) {
                return Err(SessionStateError::InvalidPersistedState(format!(
                    "option {option} for question {ordinal}"
                )));
            }
        }
        if state.mode == QuizMode::Study && state.exam_settings.is_some() {
            return Err(SessionStateError::InvalidPersistedState(
                "study session with exam settings".into(),
            ));
        }
        Ok(Self {
            quiz,
            state,
            phase: SessionPhase::Loaded,
        })
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn mode(&self) -> QuizMode {
        self.state.mode
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        self.quiz.id()
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.quiz.total_questions()
    }

    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.state.current_page
    }

    #[must_use]
    pub fn selected_option(&self, ordinal: u32) -> Option<usize> {
        self.state.selected_options.get(&ordinal).copied()
    }

    #[must_use]
    pub fn answered(&self) -> u32 {
        u32::try_from(self.state.selected_options.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn unanswered(&self) -> u32 {
        self.total_questions().saturating_sub(self.answered())
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state.completed
    }

    /// Replace the exam timer settings. Only before the exam starts.
    ///
    /// # Errors
    ///
    /// Returns `NotAnExam` for study sessions and `InvalidPhase` once started.
    pub fn configure_exam(&mut self, settings: ExamSettings) -> Result<(), SessionStateError> {
        if self.state.mode != QuizMode::Exam {
            return Err(SessionStateError::NotAnExam);
        }
        if self.phase != SessionPhase::Loaded || self.state.is_underway() {
            return Err(SessionStateError::InvalidPhase { phase: self.phase });
        }
        self.state.exam_settings = Some(settings);
        Ok(())
    }

    /// `Loaded → InProgress`. Stamps the exam start the first time an exam is
    /// entered, timed or not; an existing stamp is never moved.
    ///
    /// Returns `true` if the session transitioned.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.phase != SessionPhase::Loaded {
            return false;
        }
        if self.state.mode == QuizMode::Exam && self.state.exam_started_at.is_none() {
            self.state.exam_started_at = Some(now);
        }
        self.phase = SessionPhase::InProgress;
        true
    }

    /// Record (or in exam mode, overwrite) the answer for a question.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPhase` outside `Loaded`/`InProgress`, and
    /// `OrdinalOutOfRange`/`OptionOutOfRange` for indices outside the quiz.
    pub fn select_option(
        &mut self,
        ordinal: u32,
        option_index: usize,
    ) -> Result<SelectOutcome, SessionStateError> {
        if !self.phase.accepts_answers() {
            return Err(SessionStateError::InvalidPhase { phase: self.phase });
        }
        let question =
            self.quiz
                .question(ordinal)
                .ok_or(SessionStateError::OrdinalOutOfRange {
                    ordinal,
                    total: self.quiz.total_questions(),
                })?;
        if !question.has_option(option_index) {
            return Err(SessionStateError::OptionOutOfRange {
                ordinal,
                option: option_index,
            });
        }

        let existing = self.state.selected_options.get(&ordinal).copied();
        match existing {
            Some(_) if self.state.mode.locks_answers() => Ok(SelectOutcome::Locked),
            Some(existing) if existing == option_index => Ok(SelectOutcome::Unchanged),
            _ => {
                self.state.selected_options.insert(ordinal, option_index);
                Ok(SelectOutcome::Recorded)
            }
        }
    }

    /// Move to a page. Out-of-range pages are ignored.
    ///
    /// Returns `true` if the page is valid and navigation is allowed.
    pub fn go_to_page(&mut self, page: u32) -> bool {
        if !self.phase.accepts_answers() {
            return false;
        }
        if page == 0 || page > self.total_questions() {
            return false;
        }
        self.state.current_page = page;
        true
    }

    /// Decide whether a submit can go straight through.
    ///
    /// # Errors
    ///
    /// Returns `EmptySubmission` (without changing state) when nothing is answered,
    /// and `InvalidPhase` outside `InProgress`.
    pub fn request_submit(&mut self) -> Result<SubmitCheck, SessionStateError> {
        if self.phase != SessionPhase::InProgress {
            return Err(SessionStateError::InvalidPhase { phase: self.phase });
        }
        if self.answered() == 0 {
            return Err(SessionStateError::EmptySubmission);
        }
        let unanswered = self.unanswered();
        if unanswered > 0 {
            self.phase = SessionPhase::ConfirmPending { unanswered };
            return Ok(SubmitCheck::NeedsConfirmation { unanswered });
        }
        Ok(SubmitCheck::Ready)
    }

    /// Dismiss a pending confirmation and keep answering.
    pub fn cancel_submit(&mut self) {
        if matches!(self.phase, SessionPhase::ConfirmPending { .. }) {
            self.phase = SessionPhase::InProgress;
        }
    }

    /// Enter `Submitting`, mark the session completed and build the payload.
    ///
    /// Returns `Ok(None)` if a submission is already in flight.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPhase` unless the session is `InProgress` or `ConfirmPending`.
    pub fn begin_submit(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Option<SubmissionPayload>, SessionStateError> {
        if self.phase == SessionPhase::Submitting {
            return Ok(None);
        }
        if !self.phase.can_finalize() {
            return Err(SessionStateError::InvalidPhase { phase: self.phase });
        }
        self.phase = SessionPhase::Submitting;
        self.state.completed = true;
        Ok(Some(self.build_payload(now)))
    }

    /// The grading endpoint accepted the submission.
    pub fn submission_succeeded(&mut self) {
        if self.phase == SessionPhase::Submitting {
            self.phase = SessionPhase::Completed;
        }
    }

    /// The grading endpoint rejected the submission or was unreachable.
    ///
    /// `completed` stays set; the session goes back to `InProgress` so the
    /// caller can retry explicitly.
    pub fn submission_failed(&mut self) {
        if self.phase == SessionPhase::Submitting {
            self.phase = SessionPhase::InProgress;
        }
    }

    /// Remaining exam time in whole seconds, if the exam is timed and started.
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> Option<u64> {
        let settings = self.state.exam_settings?;
        let started_at = self.state.exam_started_at?;
        settings.remaining_seconds(started_at, now)
    }

    /// Local score over the answers given so far.
    #[must_use]
    pub fn score(&self) -> Score {
        let correct = self
            .state
            .selected_options
            .iter()
            .filter(|&(&ordinal, &option)| {
                self.quiz
                    .question(ordinal)
                    .is_some_and(|q| q.is_correct(option))
            })
            .count();
        Score::new(
            u32::try_from(correct).unwrap_or(u32::MAX),
            self.total_questions(),
        )
    }

    fn build_payload(&self, now: DateTime<Utc>) -> SubmissionPayload {
        let time_spent = match self.state.mode {
            QuizMode::Exam => Some(
                self.state
                    .exam_started_at
                    .map_or(0, |started| elapsed_whole_seconds(started, now)),
            ),
            QuizMode::Study => None,
        };
        let answers = self
            .state
            .selected_options
            .iter()
            .filter_map(|(&ordinal, &selected)| {
                self.quiz.question(ordinal).map(|question| SubmittedAnswer {
                    question_id: question.id().clone(),
                    selected_option_index: selected,
                    correct_option_index: question.correct_answer(),
                })
            })
            .collect();

        SubmissionPayload {
            quiz_id: self.quiz.id().clone(),
            mode: self.state.mode,
            total_questions: self.total_questions(),
            time_spent,
            answers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::exam::TimeUnit;
    use crate::model::quiz::sample_quiz;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn started(mode: QuizMode, correct: &[usize]) -> QuizSession {
        let mut session = QuizSession::new(sample_quiz("quiz-1", correct), mode);
        session.start(fixed_now());
        session
    }

    #[test]
    fn go_to_page_only_accepts_valid_pages() {
        let mut session = started(QuizMode::Exam, &[0, 1, 2]);
        for page in 1..=3 {
            assert!(session.go_to_page(page));
            assert_eq!(session.current_page(), page);
        }
        for page in [0, 4, 99] {
            assert!(!session.go_to_page(page));
            assert_eq!(session.current_page(), 3);
        }
    }

    #[test]
    fn exam_answers_can_change_and_repeat_is_idempotent() {
        let mut session = started(QuizMode::Exam, &[0, 1]);
        assert_eq!(session.select_option(1, 2), Ok(SelectOutcome::Recorded));
        let snapshot = session.state().clone();
        assert_eq!(session.select_option(1, 2), Ok(SelectOutcome::Unchanged));
        assert_eq!(session.state(), &snapshot);
        assert_eq!(session.select_option(1, 3), Ok(SelectOutcome::Recorded));
        assert_eq!(session.selected_option(1), Some(3));
    }

    #[test]
    fn study_first_answer_is_final() {
        let mut session = started(QuizMode::Study, &[0, 1]);
        assert_eq!(session.select_option(1, 2), Ok(SelectOutcome::Recorded));
        assert_eq!(session.select_option(1, 0), Ok(SelectOutcome::Locked));
        assert_eq!(session.select_option(1, 2), Ok(SelectOutcome::Locked));
        assert_eq!(session.selected_option(1), Some(2));
        // The lock is per question.
        assert_eq!(session.select_option(2, 0), Ok(SelectOutcome::Recorded));
    }

    #[test]
    fn select_rejects_out_of_range() {
        let mut session = started(QuizMode::Exam, &[0]);
        assert_eq!(
            session.select_option(2, 0),
            Err(SessionStateError::OrdinalOutOfRange { ordinal: 2, total: 1 })
        );
        assert_eq!(
            session.select_option(1, 4),
            Err(SessionStateError::OptionOutOfRange { ordinal: 1, option: 4 })
        );
    }

    #[test]
    fn empty_submission_leaves_state_alone() {
        let mut session = started(QuizMode::Exam, &[0, 1]);
        assert_eq!(session.request_submit(), Err(SessionStateError::EmptySubmission));
        assert_eq!(session.phase(), SessionPhase::InProgress);
        assert!(!session.is_completed());
    }

    #[test]
    fn partial_submission_needs_confirmation() {
        let mut session = started(QuizMode::Exam, &[0, 1, 2]);
        session.select_option(1, 0).unwrap();
        assert_eq!(
            session.request_submit(),
            Ok(SubmitCheck::NeedsConfirmation { unanswered: 2 })
        );
        assert_eq!(session.phase(), SessionPhase::ConfirmPending { unanswered: 2 });
        session.cancel_submit();
        assert_eq!(session.phase(), SessionPhase::InProgress);
    }

    #[test]
    fn begin_submit_is_single_flight_and_optimistic() {
        let mut session = started(QuizMode::Study, &[0, 1]);
        session.select_option(1, 0).unwrap();
        session.select_option(2, 1).unwrap();
        assert_eq!(session.request_submit(), Ok(SubmitCheck::Ready));

        let payload = session.begin_submit(fixed_now()).unwrap().unwrap();
        assert!(session.is_completed());
        assert_eq!(payload.answers.len(), 2);
        assert_eq!(payload.time_spent, None);
        assert_eq!(session.begin_submit(fixed_now()), Ok(None));

        session.submission_failed();
        assert_eq!(session.phase(), SessionPhase::InProgress);
        assert!(session.is_completed());

        assert!(session.begin_submit(fixed_now()).unwrap().is_some());
        session.submission_succeeded();
        assert_eq!(session.phase(), SessionPhase::Completed);
        assert!(session.select_option(1, 1).is_err());
    }

    #[test]
    fn exam_payload_carries_time_spent_and_correct_indices() {
        let mut session = QuizSession::new(sample_quiz("quiz-1", &[3, 1, 0]), QuizMode::Exam);
        session
            .configure_exam(ExamSettings::timed(1, TimeUnit::Minutes).unwrap())
            .unwrap();
        session.start(fixed_now());
        session.select_option(2, 0).unwrap();

        let now = fixed_now() + Duration::milliseconds(42_900);
        let payload = session.begin_submit(now).unwrap().unwrap();
        assert_eq!(payload.time_spent, Some(42));
        assert_eq!(payload.total_questions, 3);
        assert_eq!(payload.answers.len(), 1);
        assert_eq!(payload.answers[0].question_id.as_str(), "q2");
        assert_eq!(payload.answers[0].selected_option_index, 0);
        assert_eq!(payload.answers[0].correct_option_index, 1);
    }

    #[test]
    fn exam_start_is_stamped_once() {
        let mut session = QuizSession::new(sample_quiz("quiz-1", &[0]), QuizMode::Exam);
        session.configure_exam(ExamSettings::default()).unwrap();
        assert!(session.start(fixed_now()));
        assert!(!session.start(fixed_now() + Duration::seconds(30)));
        assert_eq!(session.state().exam_started_at(), Some(fixed_now()));
        assert!(session.configure_exam(ExamSettings::untimed()).is_err());
    }

    #[test]
    fn untimed_exam_reports_real_time_spent() {
        let mut session = QuizSession::new(sample_quiz("quiz-1", &[0, 1]), QuizMode::Exam);
        session.configure_exam(ExamSettings::untimed()).unwrap();
        assert!(!session.state().is_underway());
        session.start(fixed_now());
        assert_eq!(session.state().exam_started_at(), Some(fixed_now()));
        assert!(session.state().is_underway());
        assert_eq!(session.remaining_seconds(fixed_now()), None);
        session.select_option(1, 0).unwrap();

        let payload = session
            .begin_submit(fixed_now() + Duration::seconds(42))
            .unwrap()
            .unwrap();
        assert_eq!(payload.time_spent, Some(42));
    }

    #[test]
    fn answered_exam_cannot_be_reconfigured() {
        let mut session = QuizSession::new(sample_quiz("quiz-1", &[0, 1]), QuizMode::Exam);
        session.select_option(1, 0).unwrap();
        assert_eq!(session.phase(), SessionPhase::Loaded);
        assert!(matches!(
            session.configure_exam(ExamSettings::default()),
            Err(SessionStateError::InvalidPhase { .. })
        ));
    }

    #[test]
    fn study_start_leaves_exam_clock_unset() {
        let session = started(QuizMode::Study, &[0]);
        assert_eq!(session.state().exam_started_at(), None);
        assert!(!session.state().is_underway());
    }

    #[test]
    fn resume_keeps_start_time_and_remaining_is_derived() {
        let mut session = QuizSession::new(sample_quiz("quiz-1", &[0, 1]), QuizMode::Exam);
        session
            .configure_exam(ExamSettings::timed(1, TimeUnit::Minutes).unwrap())
            .unwrap();
        session.start(fixed_now());
        session.select_option(1, 1).unwrap();
        let persisted = session.state().clone();

        let mut resumed =
            QuizSession::resume(sample_quiz("quiz-1", &[0, 1]), persisted).unwrap();
        let later = fixed_now() + Duration::seconds(20);
        resumed.start(later);
        assert_eq!(resumed.state().exam_started_at(), Some(fixed_now()));
        assert_eq!(resumed.remaining_seconds(later), Some(40));
        assert_eq!(resumed.selected_option(1), Some(1));
    }

    #[test]
    fn resume_rejects_other_quiz() {
        let state = SessionState::new(QuizId::new("other"), QuizMode::Study);
        let err = QuizSession::resume(sample_quiz("quiz-1", &[0]), state).unwrap_err();
        assert!(matches!(err, SessionStateError::QuizMismatch { .. }));
    }

    #[test]
    fn study_score_counts_correct_answers() {
        let mut session = started(QuizMode::Study, &[1, 2]);
        session.select_option(1, 1).unwrap();
        session.select_option(2, 0).unwrap();
        let score = session.score();
        assert_eq!((score.correct, score.total, score.percentage), (1, 2, 50));
    }
}
