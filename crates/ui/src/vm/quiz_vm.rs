use quiz_core::model::{QuizMode, SessionPhase};
use services::SessionSnapshot;

use super::time_fmt::format_countdown;

/// Seconds left at which the countdown turns red.
pub const TIMER_WARNING_SECS: u64 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionState {
    Neutral,
    Selected,
    Correct,
    Wrong,
    Dimmed,
}

impl OptionState {
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            OptionState::Neutral => "option",
            OptionState::Selected => "option option--selected",
            OptionState::Correct => "option option--correct",
            OptionState::Wrong => "option option--wrong",
            OptionState::Dimmed => "option option--dimmed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub index: usize,
    pub letter: char,
    pub text: String,
    pub state: OptionState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub ordinal: u32,
    pub prompt: String,
    pub options: Vec<OptionVm>,
    /// Only revealed once a study question is answered.
    pub explanation: Option<String>,
    pub locked: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavCellVm {
    pub ordinal: u32,
    pub class: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionVm {
    pub document_name: String,
    pub mode: QuizMode,
    pub question: Option<QuestionVm>,
    pub nav: Vec<NavCellVm>,
    pub progress_label: String,
    pub answered_label: String,
    pub countdown: Option<String>,
    pub timer_warning: bool,
    pub can_go_prev: bool,
    pub can_go_next: bool,
    pub confirm_unanswered: Option<u32>,
    pub submitting: bool,
}

#[must_use]
pub fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .map_or('?', char::from)
}

/// Styling of one option given the mode, the chosen answer and the key.
#[must_use]
pub fn option_state(
    mode: QuizMode,
    index: usize,
    selected: Option<usize>,
    correct: usize,
) -> OptionState {
    match (mode.shows_feedback_immediately(), selected) {
        (_, None) => OptionState::Neutral,
        (false, Some(chosen)) if chosen == index => OptionState::Selected,
        (false, Some(_)) => OptionState::Neutral,
        (true, Some(_)) if index == correct => OptionState::Correct,
        (true, Some(chosen)) if chosen == index => OptionState::Wrong,
        (true, Some(_)) => OptionState::Dimmed,
    }
}

#[must_use]
pub fn map_session(snapshot: &SessionSnapshot) -> SessionVm {
    let quiz = &snapshot.quiz;
    let state = &snapshot.state;
    let mode = state.mode();
    let total = quiz.total_questions();
    let page = state.current_page();
    let selected = state.selected_options();

    let question = quiz.question(page).map(|question| {
        let chosen = selected.get(&page).copied();
        let options = question
            .options()
            .iter()
            .enumerate()
            .map(|(index, text)| OptionVm {
                index,
                letter: option_letter(index),
                text: text.clone(),
                state: option_state(mode, index, chosen, question.correct_answer()),
            })
            .collect();
        let answered = chosen.is_some();
        QuestionVm {
            ordinal: page,
            prompt: question.prompt().to_string(),
            options,
            explanation: (answered
                && mode.shows_feedback_immediately()
                && !question.explanation().is_empty())
            .then(|| question.explanation().to_string()),
            locked: answered && mode.locks_answers(),
        }
    });

    let nav = (1..=total)
        .map(|ordinal| {
            let class = match (ordinal == page, selected.contains_key(&ordinal)) {
                (true, _) => "nav-cell nav-cell--current",
                (false, true) => "nav-cell nav-cell--answered",
                (false, false) => "nav-cell",
            };
            NavCellVm { ordinal, class }
        })
        .collect();

    let answered = u32::try_from(selected.len()).unwrap_or(u32::MAX);
    SessionVm {
        document_name: quiz.document_name().to_string(),
        mode,
        question,
        nav,
        progress_label: format!("Question {page} of {total}"),
        answered_label: format!("{answered} of {total} answered"),
        countdown: snapshot.remaining_seconds.map(format_countdown),
        timer_warning: snapshot
            .remaining_seconds
            .is_some_and(|secs| secs <= TIMER_WARNING_SECS),
        can_go_prev: page > 1,
        can_go_next: page < total,
        confirm_unanswered: match snapshot.phase {
            SessionPhase::ConfirmPending { unanswered } => Some(unanswered),
            _ => None,
        },
        submitting: snapshot.phase == SessionPhase::Submitting,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{
        ExamSettings, QuestionDraft, QuestionId, Quiz, QuizId, QuizSession, TimeUnit,
    };
    use quiz_core::time::fixed_now;

    fn quiz() -> Quiz {
        let questions = (1..=3)
            .map(|n| {
                QuestionDraft {
                    id: QuestionId::new(format!("q{n}")),
                    number: n,
                    prompt: format!("Prompt {n}"),
                    options: vec!["one".into(), "two".into(), "three".into()],
                    correct_answer: 1,
                    explanation: "two is right".into(),
                }
                .validate()
                .unwrap()
            })
            .collect();
        Quiz::new(QuizId::new("quiz-1"), "notes.pdf", questions).unwrap()
    }

    fn snapshot(session: &QuizSession, remaining: Option<u64>) -> SessionSnapshot {
        SessionSnapshot {
            quiz: session.quiz().clone(),
            state: session.state().clone(),
            phase: session.phase(),
            remaining_seconds: remaining,
        }
    }

    #[test]
    fn study_feedback_marks_correct_and_wrong() {
        assert_eq!(option_state(QuizMode::Study, 1, Some(0), 1), OptionState::Correct);
        assert_eq!(option_state(QuizMode::Study, 0, Some(0), 1), OptionState::Wrong);
        assert_eq!(option_state(QuizMode::Study, 2, Some(0), 1), OptionState::Dimmed);
        assert_eq!(option_state(QuizMode::Study, 2, None, 1), OptionState::Neutral);
    }

    #[test]
    fn exam_only_highlights_the_choice() {
        assert_eq!(option_state(QuizMode::Exam, 0, Some(0), 1), OptionState::Selected);
        assert_eq!(option_state(QuizMode::Exam, 1, Some(0), 1), OptionState::Neutral);
    }

    #[test]
    fn study_session_reveals_explanation_after_answer() {
        let mut session = QuizSession::new(quiz(), QuizMode::Study);
        session.start(fixed_now());
        session.select_option(1, 2).unwrap();

        let vm = map_session(&snapshot(&session, None));
        let question = vm.question.unwrap();
        assert!(question.locked);
        assert_eq!(question.explanation.as_deref(), Some("two is right"));
        assert_eq!(question.options[2].state, OptionState::Wrong);
        assert_eq!(vm.answered_label, "1 of 3 answered");
        assert!(!vm.can_go_prev);
        assert!(vm.can_go_next);
    }

    #[test]
    fn exam_session_shows_countdown_and_confirmation() {
        let mut session = QuizSession::new(quiz(), QuizMode::Exam);
        session
            .configure_exam(ExamSettings::timed(1, TimeUnit::Hours).unwrap())
            .unwrap();
        session.start(fixed_now());
        session.select_option(1, 0).unwrap();
        session.go_to_page(2);
        session.request_submit().unwrap();

        let vm = map_session(&snapshot(&session, Some(45)));
        assert_eq!(vm.countdown.as_deref(), Some("0:45"));
        assert!(vm.timer_warning);
        assert_eq!(vm.confirm_unanswered, Some(2));
        assert_eq!(vm.progress_label, "Question 2 of 3");
        assert_eq!(vm.nav[0].class, "nav-cell nav-cell--answered");
        assert_eq!(vm.nav[1].class, "nav-cell nav-cell--current");
        assert!(vm.question.unwrap().explanation.is_none());
    }

    #[test]
    fn letters_follow_option_order() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(3), 'D');
    }
}
