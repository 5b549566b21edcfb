//! Shared error types for the services crate.

use std::time::Duration;

use thiserror::Error;

use quiz_core::model::{DocumentError, QuizId, SessionPhase, SessionStateError};
use storage::StorageError;
use storage::sqlite::SqliteInitError;

/// How long a failed load waits before sending the user home.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1_500);

/// Errors emitted by the quiz API client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,
    #[error("quiz api request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Network(#[from] reqwest::Error),
    #[error("quiz api returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid quiz api url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<quiz_core::Error> for ApiError {
    fn from(err: quiz_core::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

/// Errors emitted by `SessionController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("quiz not found")]
    NotFound,
    #[error("quiz could not be loaded: {0}")]
    Network(#[source] ApiError),
    #[error("session holds quiz {loaded}, not {requested}")]
    QuizMismatch { loaded: QuizId, requested: QuizId },
    #[error("no questions have been answered")]
    EmptySubmission,
    #[error("invalid answer: {0}")]
    InvalidAnswer(#[source] SessionStateError),
    #[error("session is not in progress ({phase:?})")]
    NotInProgress { phase: SessionPhase },
    #[error("no quiz is loaded")]
    NotLoaded,
    #[error("submission failed: {0}")]
    Submission(#[source] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Model(SessionStateError),
}

impl From<SessionStateError> for SessionError {
    fn from(err: SessionStateError) -> Self {
        match err {
            SessionStateError::EmptySubmission => Self::EmptySubmission,
            SessionStateError::InvalidPhase { phase } => Self::NotInProgress { phase },
            SessionStateError::OrdinalOutOfRange { .. }
            | SessionStateError::OptionOutOfRange { .. } => Self::InvalidAnswer(err),
            other => Self::Model(other),
        }
    }
}

impl SessionError {
    /// Whether the view should give up and return to the home screen.
    #[must_use]
    pub fn redirects_home(&self) -> bool {
        matches!(
            self,
            SessionError::NotFound | SessionError::Network(_) | SessionError::QuizMismatch { .. }
        )
    }

    /// Delay before redirecting home, for errors that end the session view.
    #[must_use]
    pub fn redirect_delay(&self) -> Option<Duration> {
        self.redirects_home().then_some(REDIRECT_DELAY)
    }

    /// Message shown to the user for this error.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::NotFound => "Quiz not found.",
            SessionError::Network(_) | SessionError::QuizMismatch { .. } => {
                "Unable to load quiz."
            }
            SessionError::EmptySubmission => {
                "Please answer at least one question before submitting."
            }
            SessionError::Submission(_) => "Failed to submit result. Please try again.",
            SessionError::Storage(_) => "Unable to save quiz progress.",
            SessionError::NotLoaded => "No quiz is loaded.",
            SessionError::InvalidAnswer(_)
            | SessionError::NotInProgress { .. }
            | SessionError::Model(_) => "That action is not available right now.",
        }
    }
}

/// Errors emitted by `LibraryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LibraryError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
