mod document;
mod exam;
mod ids;
mod mode;
mod question;
mod quiz;
mod result;
mod session;
mod submission;

pub use document::{Difficulty, DocumentError, DocumentFormat, DocumentUpload};
pub use exam::{ExamSettings, ExamSettingsError, TimeUnit};
pub use ids::{QuestionId, QuizId};
pub use mode::{ParseModeError, QuizMode};
pub use question::{Question, QuestionDraft, QuestionError};
pub use quiz::{Quiz, QuizError, QuizSummary};
pub use result::{QuizResult, ResultQuestion, Score, ScoreBand, StoredResult};
pub use session::{
    QuizSession, SelectOutcome, SessionPhase, SessionState, SessionStateError, SubmitCheck,
};
pub use submission::{SubmissionPayload, SubmittedAnswer};
