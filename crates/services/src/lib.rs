#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod error;
pub mod library_service;
pub mod notify;
pub mod sessions;

pub use quiz_core::Clock;

pub use api::{ApiConfig, HttpQuizApi, QuizApi};
pub use app_services::AppServices;
pub use error::{ApiError, AppServicesError, LibraryError, REDIRECT_DELAY, SessionError};
pub use library_service::{DownloadedQuiz, LibraryService};
pub use notify::{MemoryNotifier, Notifier, Toast, ToastLevel};
pub use sessions::{
    OpenOutcome, SessionController, SessionEvent, SessionSnapshot, SessionStatus, SubmitOutcome,
    SubmitRequest, TIMER_TICK,
};
