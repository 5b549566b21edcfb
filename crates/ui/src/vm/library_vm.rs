use std::path::Path;

use quiz_core::model::{Difficulty, DocumentUpload, QuizSummary};

use super::time_fmt::format_datetime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizCardVm {
    pub id: String,
    pub title: String,
    pub created_label: String,
    pub questions_label: String,
}

#[must_use]
pub fn map_quiz_card(summary: &QuizSummary) -> QuizCardVm {
    let questions_label = match summary.total_questions {
        1 => "1 question".to_string(),
        n => format!("{n} questions"),
    };
    QuizCardVm {
        id: summary.id.as_str().to_string(),
        title: summary.document_name.clone(),
        created_label: format_datetime(summary.created_at),
        questions_label,
    }
}

/// Raw state of the upload form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadForm {
    pub path: String,
    pub question_count: u32,
    pub difficulty: Difficulty,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self {
            path: String::new(),
            question_count: DocumentUpload::MIN_QUESTIONS,
            difficulty: Difficulty::default(),
        }
    }
}

impl UploadForm {
    #[must_use]
    pub fn file_name(&self) -> String {
        Path::new(self.path.trim())
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.path.trim().is_empty()
    }
}

/// Parse the question count field, clamped to what the generator accepts.
#[must_use]
pub fn parse_question_count(raw: &str) -> u32 {
    raw.trim().parse::<u32>().map_or(DocumentUpload::MIN_QUESTIONS, |count| {
        count.clamp(DocumentUpload::MIN_QUESTIONS, DocumentUpload::MAX_QUESTIONS)
    })
}
