use std::time::Duration;

use services::{Notifier, Toast, ToastLevel};
use tokio::sync::broadcast;

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(4);

const CHANNEL_CAPACITY: usize = 32;

/// Fans toasts out to every mounted toast area.
///
/// Sending without subscribers drops the toast; services never wait on the UI.
#[derive(Clone, Debug)]
pub struct ToastChannel {
    sender: broadcast::Sender<Toast>,
}

impl Default for ToastChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastChannel {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.sender.subscribe()
    }
}

impl Notifier for ToastChannel {
    fn notify(&self, toast: Toast) {
        let _ = self.sender.send(toast);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToastVm {
    pub id: u64,
    pub class: &'static str,
    pub message: String,
}

#[must_use]
pub fn map_toast(id: u64, toast: &Toast) -> ToastVm {
    let class = match toast.level {
        ToastLevel::Success => "toast toast--success",
        ToastLevel::Error => "toast toast--error",
        ToastLevel::Info => "toast toast--info",
    };
    ToastVm {
        id,
        class,
        message: toast.message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_receive_toasts() {
        let channel = ToastChannel::new();
        let mut rx = channel.subscribe();
        channel.notify(Toast::error("Quiz not found."));
        let toast = rx.try_recv().unwrap();
        assert_eq!(map_toast(7, &toast).class, "toast toast--error");
        assert_eq!(toast.message, "Quiz not found.");
    }

    #[test]
    fn notify_without_subscribers_is_dropped() {
        let channel = ToastChannel::new();
        channel.notify(Toast::success("ok"));
        let mut rx = channel.subscribe();
        assert!(rx.try_recv().is_err());
    }
}
