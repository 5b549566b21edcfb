use thiserror::Error;

use crate::model::{
    DocumentError, ExamSettingsError, QuestionError, QuizError, SessionStateError,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    ExamSettings(#[from] ExamSettingsError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Session(#[from] SessionStateError),
}
