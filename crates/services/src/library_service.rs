use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use quiz_core::model::{
    Difficulty, DocumentFormat, DocumentUpload, Quiz, QuizId, QuizMode, QuizResult, QuizSummary,
};

use crate::api::QuizApi;
use crate::error::LibraryError;
use crate::notify::{Notifier, Toast};

/// A downloaded export, ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedQuiz {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Quiz listing, generation from PDFs, exports and graded results.
#[derive(Clone)]
pub struct LibraryService {
    api: Arc<dyn QuizApi>,
    notifier: Arc<dyn Notifier>,
    revision: watch::Sender<u64>,
}

impl LibraryService {
    #[must_use]
    pub fn new(api: Arc<dyn QuizApi>, notifier: Arc<dyn Notifier>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            api,
            notifier,
            revision,
        }
    }

    /// Bumped whenever the set of quizzes changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// # Errors
    ///
    /// Returns `LibraryError::Api` if the listing cannot be fetched.
    pub async fn list(&self) -> Result<Vec<QuizSummary>, LibraryError> {
        let mut quizzes = self.api.list_quizzes().await?;
        quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(quizzes)
    }

    /// Validate a PDF and ask the backend to generate a quiz from it.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Document` for non-PDF input (nothing is uploaded)
    /// and `LibraryError::Api` if generation fails.
    pub async fn generate(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        question_count: u32,
        difficulty: Difficulty,
    ) -> Result<Quiz, LibraryError> {
        let upload = match DocumentUpload::pdf(file_name, bytes, question_count, difficulty) {
            Ok(upload) => upload,
            Err(err) => {
                self.notifier.notify(Toast::error(err.to_string()));
                return Err(err.into());
            }
        };
        info!(
            file = upload.file_name(),
            size = %upload.readable_size(),
            questions = upload.question_count(),
            difficulty = upload.difficulty().as_str(),
            "generating quiz"
        );
        match self.api.upload_and_generate(&upload).await {
            Ok(quiz) => {
                self.revision.send_modify(|rev| *rev += 1);
                self.notifier.notify(Toast::success("Quiz generated successfully!"));
                Ok(quiz)
            }
            Err(err) => {
                warn!(error = %err, "quiz generation failed");
                self.notifier
                    .notify(Toast::error("Failed to generate quiz. Please try again."));
                Err(err.into())
            }
        }
    }

    /// # Errors
    ///
    /// Returns `LibraryError::Api` if the export cannot be fetched.
    pub async fn download(
        &self,
        quiz_id: &QuizId,
        format: DocumentFormat,
    ) -> Result<DownloadedQuiz, LibraryError> {
        match self.api.download_quiz(quiz_id, format).await {
            Ok(bytes) => Ok(DownloadedQuiz {
                file_name: format.file_name(quiz_id),
                bytes,
            }),
            Err(err) => {
                warn!(error = %err, %quiz_id, "quiz download failed");
                self.notifier.notify(Toast::error("Failed to download quiz."));
                Err(err.into())
            }
        }
    }

    /// # Errors
    ///
    /// Returns `LibraryError::Api` if the result cannot be fetched.
    pub async fn result(&self, quiz_id: &QuizId, mode: QuizMode) -> Result<QuizResult, LibraryError> {
        self.api
            .get_quiz_result(quiz_id, mode)
            .await
            .map_err(|err| {
                warn!(error = %err, %quiz_id, %mode, "result fetch failed");
                self.notifier.notify(Toast::error("Failed to load results."));
                err.into()
            })
    }
}
