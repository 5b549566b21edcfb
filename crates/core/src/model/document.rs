use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::QuizId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("only PDF documents can be uploaded")]
    NotPdf,

    #[error("document is empty")]
    Empty,
}

/// Difficulty requested from the question generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Auto,
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Auto,
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Auto => "auto",
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Difficulty::Auto => "Auto (Smart Mix)",
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == key)
    }
}

/// Export format offered by the quiz download endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }

    #[must_use]
    pub fn file_name(self, quiz_id: &QuizId) -> String {
        format!("quiz_{}.{}", quiz_id.short(), self.extension())
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A PDF picked for quiz generation, with the generator knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    file_name: String,
    bytes: Vec<u8>,
    question_count: u32,
    difficulty: Difficulty,
}

impl DocumentUpload {
    pub const MIN_QUESTIONS: u32 = 10;
    pub const MAX_QUESTIONS: u32 = 100;

    /// Accepts a PDF by extension and magic bytes. The question count is clamped
    /// into `MIN_QUESTIONS..=MAX_QUESTIONS`.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Empty` for empty input and `DocumentError::NotPdf`
    /// if the file is not a PDF.
    pub fn pdf(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        question_count: u32,
        difficulty: Difficulty,
    ) -> Result<Self, DocumentError> {
        let file_name = file_name.into();
        if bytes.is_empty() {
            return Err(DocumentError::Empty);
        }
        let has_pdf_ext = file_name.to_ascii_lowercase().ends_with(".pdf");
        if !has_pdf_ext || !bytes.starts_with(b"%PDF") {
            return Err(DocumentError::NotPdf);
        }
        Ok(Self {
            file_name,
            bytes,
            question_count: question_count.clamp(Self::MIN_QUESTIONS, Self::MAX_QUESTIONS),
            difficulty,
        })
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Human readable size ("12.5 KB", "3.1 MB").
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn readable_size(&self) -> String {
        let size = self.bytes.len() as f64;
        if size < 1024.0 * 1024.0 {
            format!("{:.1} KB", size / 1024.0)
        } else {
            format!("{:.1} MB", size / (1024.0 * 1024.0))
        }
    }
}
