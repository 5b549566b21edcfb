//! Transient user notifications ("toasts").

use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }
}

/// Sink for toasts. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Keeps every toast in memory; handy for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    toasts: Arc<Mutex<Vec<Toast>>>,
}

impl MemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.toasts().into_iter().map(|t| t.message).collect()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(toast);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_notifier_shares_history_between_clones() {
        let notifier = MemoryNotifier::new();
        let clone = notifier.clone();
        clone.notify(Toast::error("boom"));
        notifier.notify(Toast::success("ok"));
        assert_eq!(
            notifier.toasts(),
            vec![Toast::error("boom"), Toast::success("ok")]
        );
    }
}
