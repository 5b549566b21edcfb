use quiz_core::model::{QuizMode, QuizResult, ScoreBand};

use super::quiz_vm::{OptionState, OptionVm, option_letter, option_state};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewItemVm {
    pub number: usize,
    pub prompt: String,
    pub options: Vec<OptionVm>,
    pub explanation: String,
    pub status_label: &'static str,
    pub status_class: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub title: String,
    pub mode_label: &'static str,
    pub percentage_label: String,
    pub score_label: String,
    pub band_class: &'static str,
    pub headline: &'static str,
    pub review: Vec<ReviewItemVm>,
}

fn band_copy(band: ScoreBand) -> (&'static str, &'static str) {
    match band {
        ScoreBand::High => ("score score--high", "Excellent work!"),
        ScoreBand::Medium => ("score score--medium", "Good effort!"),
        ScoreBand::Low => ("score score--low", "Keep practicing!"),
    }
}

#[must_use]
pub fn map_results(result: &QuizResult) -> ResultsVm {
    let score = result.as_score();
    let (band_class, headline) = band_copy(score.grade());
    let review = result
        .questions
        .iter()
        .enumerate()
        .map(|(idx, question)| {
            let options = question
                .options
                .iter()
                .enumerate()
                .map(|(index, text)| OptionVm {
                    index,
                    letter: option_letter(index),
                    text: text.clone(),
                    // Graded review always shows the key, even for skipped questions.
                    state: match question.selected_option {
                        None if index == question.correct_answer => OptionState::Correct,
                        selected => {
                            option_state(QuizMode::Study, index, selected, question.correct_answer)
                        }
                    },
                })
                .collect();
            let (status_label, status_class) = match question.selected_option {
                None => ("Not answered", "review-status review-status--skipped"),
                Some(_) if question.is_correct() => ("Correct", "review-status review-status--correct"),
                Some(_) => ("Incorrect", "review-status review-status--wrong"),
            };
            ReviewItemVm {
                number: idx + 1,
                prompt: question.prompt.clone(),
                options,
                explanation: question.explanation.clone(),
                status_label,
                status_class,
            }
        })
        .collect();

    ResultsVm {
        title: result.document_name.clone(),
        mode_label: match result.mode {
            QuizMode::Exam => "Exam results",
            QuizMode::Study => "Study results",
        },
        percentage_label: format!("{}%", score.percentage),
        score_label: format!("{} / {} correct", score.correct, score.total),
        band_class,
        headline,
        review,
    }
}
