use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuizId;
use crate::model::question::{Question, QuestionError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("too many questions in a single quiz: {len}")]
    TooManyQuestions { len: usize },

    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// A loaded quiz: the document it was generated from and its ordered questions.
///
/// Questions are addressed by ordinal (`1..=len`) in list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    id: QuizId,
    document_name: String,
    questions: Vec<Question>,
}

impl Quiz {
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` for an empty question list.
    pub fn new(
        id: QuizId,
        document_name: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        if u32::try_from(questions.len()).is_err() {
            return Err(QuizError::TooManyQuestions {
                len: questions.len(),
            });
        }
        Ok(Self {
            id,
            document_name: document_name.into(),
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> &QuizId {
        &self.id
    }

    #[must_use]
    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        // Bounded in `new`.
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }

    /// Question at a 1-based ordinal.
    #[must_use]
    pub fn question(&self, ordinal: u32) -> Option<&Question> {
        let index = usize::try_from(ordinal).ok()?.checked_sub(1)?;
        self.questions.get(index)
    }
}

/// Sidebar listing entry for a previously generated quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: QuizId,
    pub document_name: String,
    pub created_at: DateTime<Utc>,
    pub total_questions: u32,
}

#[cfg(test)]
pub(crate) fn sample_quiz(id: &str, correct: &[usize]) -> Quiz {
    let questions = correct
        .iter()
        .enumerate()
        .map(|(idx, answer)| {
            let number = u32::try_from(idx + 1).expect("small test quiz");
            crate::model::question::sample_question(number, *answer)
        })
        .collect();
    Quiz::new(QuizId::new(id), "notes.pdf", questions).expect("sample quiz is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_quiz_is_rejected() {
        assert_eq!(
            Quiz::new(QuizId::new("x"), "doc.pdf", Vec::new()),
            Err(QuizError::NoQuestions)
        );
    }

    #[test]
    fn question_lookup_is_one_based() {
        let quiz = sample_quiz("x", &[0, 1, 2]);
        assert_eq!(quiz.question(1).map(Question::number), Some(1));
        assert_eq!(quiz.question(3).map(Question::number), Some(3));
        assert!(quiz.question(0).is_none());
        assert!(quiz.question(4).is_none());
    }
}
