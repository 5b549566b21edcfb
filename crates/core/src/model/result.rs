use serde::{Deserialize, Serialize};

use crate::model::ids::{QuestionId, QuizId};
use crate::model::mode::QuizMode;

/// Correct / total / rounded percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
}

impl Score {
    /// Percentage is rounded half up; an empty quiz scores 0.
    #[must_use]
    pub fn new(correct: u32, total: u32) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            let scaled = u64::from(correct) * 100;
            let total_wide = u64::from(total);
            u32::try_from((scaled * 2 + total_wide) / (total_wide * 2)).unwrap_or(100)
        };
        Self {
            correct,
            total,
            percentage,
        }
    }

    #[must_use]
    pub fn grade(&self) -> ScoreBand {
        match self.percentage {
            80.. => ScoreBand::High,
            60..=79 => ScoreBand::Medium,
            _ => ScoreBand::Low,
        }
    }
}

/// Coarse band used by result screens to pick a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

/// Stored result acknowledged by the grading endpoint after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResult {
    pub quiz_id: QuizId,
    pub mode: QuizMode,
    pub score: u32,
    pub total_questions: u32,
}

/// Per-question line of a graded result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultQuestion {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<String>,
    pub selected_option: Option<usize>,
    pub correct_answer: usize,
    pub explanation: String,
}

impl ResultQuestion {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.selected_option == Some(self.correct_answer)
    }
}

/// Graded result fetched for the results screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub quiz_id: QuizId,
    pub mode: QuizMode,
    pub document_name: String,
    pub score: u32,
    pub percentage: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub questions: Vec<ResultQuestion>,
}

impl QuizResult {
    #[must_use]
    pub fn as_score(&self) -> Score {
        Score {
            correct: self.correct_answers,
            total: self.total_questions,
            percentage: self.percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(Score::new(1, 2).percentage, 50);
        assert_eq!(Score::new(2, 3).percentage, 67);
        assert_eq!(Score::new(1, 3).percentage, 33);
        assert_eq!(Score::new(1, 8).percentage, 13);
        assert_eq!(Score::new(0, 0).percentage, 0);
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(Score::new(4, 5).grade(), ScoreBand::High);
        assert_eq!(Score::new(3, 5).grade(), ScoreBand::Medium);
        assert_eq!(Score::new(1, 5).grade(), ScoreBand::Low);
    }
}
