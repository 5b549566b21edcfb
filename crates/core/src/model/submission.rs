use serde::{Deserialize, Serialize};

use crate::model::ids::{QuestionId, QuizId};
use crate::model::mode::QuizMode;

/// One answered question inside a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub selected_option_index: usize,
    /// Looked up from the loaded question at submission time.
    pub correct_option_index: usize,
}

/// Completed session handed to the grading endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub quiz_id: QuizId,
    pub mode: QuizMode,
    pub total_questions: u32,
    /// Whole seconds since the exam started; exam mode only.
    pub time_spent: Option<u64>,
    pub answers: Vec<SubmittedAnswer>,
}

impl SubmissionPayload {
    #[must_use]
    pub fn answered(&self) -> usize {
        self.answers.len()
    }
}
