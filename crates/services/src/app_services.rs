use std::sync::Arc;

use quiz_core::model::QuizMode;
use storage::{SessionPartitions, SessionStore, Storage};

use crate::Clock;
use crate::api::{ApiConfig, HttpQuizApi, QuizApi};
use crate::error::AppServicesError;
use crate::library_service::LibraryService;
use crate::notify::Notifier;
use crate::sessions::SessionController;

/// Assembles app-facing services over one session store and one API client.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    api: Arc<dyn QuizApi>,
    sessions: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    library: Arc<LibraryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP quiz API.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        api: ApiConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(
            Clock::default_clock(),
            Arc::new(HttpQuizApi::new(api)),
            storage,
            notifier,
        ))
    }

    #[must_use]
    pub fn new(
        clock: Clock,
        api: Arc<dyn QuizApi>,
        storage: Storage,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let library = Arc::new(LibraryService::new(
            Arc::clone(&api),
            Arc::clone(&notifier),
        ));
        Self {
            clock,
            api,
            sessions: storage.sessions,
            notifier,
            library,
        }
    }

    /// A fresh controller for one quiz-taking view.
    ///
    /// Each controller writes under its own instance id, so controllers built
    /// here see each other's partition changes.
    #[must_use]
    pub fn session_controller(&self, mode: QuizMode) -> SessionController {
        SessionController::new(
            mode,
            Arc::clone(&self.api),
            SessionPartitions::new(Arc::clone(&self.sessions)),
            Arc::clone(&self.notifier),
            self.clock.clone(),
        )
    }

    #[must_use]
    pub fn library(&self) -> Arc<LibraryService> {
        Arc::clone(&self.library)
    }

    #[must_use]
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.notifier)
    }
}
