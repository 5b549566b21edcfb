use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown quiz mode: {0}")]
pub struct ParseModeError(pub String);

/// How a quiz is taken.
///
/// - `Exam`: no feedback until the end, optional timer, answers can change
///   until the final submission.
/// - `Study`: immediate feedback, the first answer to each question is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    Exam,
    Study,
}

impl QuizMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuizMode::Exam => "exam",
            QuizMode::Study => "study",
        }
    }

    /// Whether correctness is revealed as soon as a question is answered.
    #[must_use]
    pub fn shows_feedback_immediately(self) -> bool {
        matches!(self, QuizMode::Study)
    }

    /// Whether the first answer to a question locks it.
    #[must_use]
    pub fn locks_answers(self) -> bool {
        matches!(self, QuizMode::Study)
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exam" => Ok(Self::Exam),
            "study" => Ok(Self::Study),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}
