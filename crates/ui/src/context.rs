use std::sync::Arc;

use quiz_core::model::QuizMode;
use services::{LibraryService, SessionController};

use crate::vm::ToastChannel;

pub trait UiApp: Send + Sync {
    /// A fresh controller per mounted quiz view.
    fn session_controller(&self, mode: QuizMode) -> SessionController;
    fn library(&self) -> Arc<LibraryService>;
    fn toasts(&self) -> ToastChannel;
}

#[derive(Clone)]
pub struct AppContext {
    app: Arc<dyn UiApp>,
    library: Arc<LibraryService>,
    toasts: ToastChannel,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            app: Arc::clone(app),
            library: app.library(),
            toasts: app.toasts(),
        }
    }

    #[must_use]
    pub fn session_controller(&self, mode: QuizMode) -> SessionController {
        self.app.session_controller(mode)
    }

    #[must_use]
    pub fn library(&self) -> Arc<LibraryService> {
        Arc::clone(&self.library)
    }

    #[must_use]
    pub fn toasts(&self) -> ToastChannel {
        self.toasts.clone()
    }
}

// Provided by the composition root in `crates/app`.

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
