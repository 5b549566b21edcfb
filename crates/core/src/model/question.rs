use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question number must be >= 1")]
    InvalidNumber,

    #[error("question needs at least two options, got {len}")]
    TooFewOptions { len: usize },

    #[error("correct answer index {index} is outside {len} options")]
    CorrectAnswerOutOfRange { index: usize, len: usize },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Unvalidated question fields, as received from the API or storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub id: QuestionId,
    pub number: u32,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is empty, there are fewer than two
    /// options, or the correct answer does not index into the options.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if self.number == 0 {
            return Err(QuestionError::InvalidNumber);
        }
        if self.options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                len: self.options.len(),
            });
        }
        if self.correct_answer >= self.options.len() {
            return Err(QuestionError::CorrectAnswerOutOfRange {
                index: self.correct_answer,
                len: self.options.len(),
            });
        }
        Ok(Question { draft: self })
    }
}

/// A multiple-choice question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionDraft", into = "QuestionDraft")]
pub struct Question {
    draft: QuestionDraft,
}

impl TryFrom<QuestionDraft> for Question {
    type Error = QuestionError;

    fn try_from(draft: QuestionDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<Question> for QuestionDraft {
    fn from(question: Question) -> Self {
        question.draft
    }
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.draft.id
    }

    /// 1-based position as issued by the generator.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.draft.number
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.draft.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.draft.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> usize {
        self.draft.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.draft.explanation
    }

    #[must_use]
    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.draft.correct_answer
    }

    #[must_use]
    pub fn has_option(&self, option_index: usize) -> bool {
        option_index < self.draft.options.len()
    }
}

#[cfg(test)]
pub(crate) fn sample_question(number: u32, correct_answer: usize) -> Question {
    QuestionDraft {
        id: QuestionId::new(format!("q{number}")),
        number,
        prompt: format!("Question {number}?"),
        options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        correct_answer,
        explanation: format!("Because {correct_answer}."),
    }
    .validate()
    .expect("sample question is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            id: QuestionId::new("q1"),
            number: 1,
            prompt: "What is 2 + 2?".into(),
            options: vec!["3".into(), "4".into()],
            correct_answer: 1,
            explanation: "Arithmetic.".into(),
        }
    }

    #[test]
    fn rejects_out_of_range_correct_answer() {
        let mut bad = draft();
        bad.correct_answer = 2;
        assert_eq!(
            bad.validate(),
            Err(QuestionError::CorrectAnswerOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn rejects_single_option() {
        let mut bad = draft();
        bad.options.truncate(1);
        bad.correct_answer = 0;
        assert_eq!(bad.validate(), Err(QuestionError::TooFewOptions { len: 1 }));
    }

    #[test]
    fn deserialize_runs_validation() {
        let mut bad = draft();
        bad.prompt = "  ".into();
        let json = serde_json::to_string(&bad).unwrap();
        assert!(serde_json::from_str::<Question>(&json).is_err());

        let json = serde_json::to_string(&draft()).unwrap();
        let question: Question = serde_json::from_str(&json).unwrap();
        assert!(question.is_correct(1));
    }
}
