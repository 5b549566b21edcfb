//! Contract with the external quiz backend.

mod http;
mod wire;

use async_trait::async_trait;

use quiz_core::model::{
    DocumentFormat, DocumentUpload, Quiz, QuizId, QuizMode, QuizResult, QuizSummary,
    StoredResult, SubmissionPayload,
};

use crate::error::ApiError;

pub use http::{ApiConfig, HttpQuizApi};

/// Operations the client consumes from the quiz backend.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// Fetch a quiz with its questions.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids, other variants for transport failures.
    async fn get_quiz(&self, quiz_id: &QuizId) -> Result<Quiz, ApiError>;

    /// Hand a completed session to the grading endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the backend rejects the submission or is unreachable.
    async fn submit_quiz(&self, payload: &SubmissionPayload) -> Result<StoredResult, ApiError>;

    /// Fetch the graded result for a quiz in a mode.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the result cannot be fetched.
    async fn get_quiz_result(&self, quiz_id: &QuizId, mode: QuizMode)
    -> Result<QuizResult, ApiError>;

    /// List previously generated quizzes.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the listing cannot be fetched.
    async fn list_quizzes(&self) -> Result<Vec<QuizSummary>, ApiError>;

    /// Upload a PDF and have the backend generate a quiz from it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the upload or generation fails.
    async fn upload_and_generate(&self, upload: &DocumentUpload) -> Result<Quiz, ApiError>;

    /// Download the quiz as a document.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the export cannot be fetched.
    async fn download_quiz(
        &self,
        quiz_id: &QuizId,
        format: DocumentFormat,
    ) -> Result<Vec<u8>, ApiError>;
}
