use dioxus::prelude::*;
use tokio::sync::broadcast::error::RecvError;

use crate::context::AppContext;
use crate::vm::{TOAST_TTL, ToastVm, map_toast};

/// Stack of transient notifications; each one expires after `TOAST_TTL`.
#[component]
pub fn ToastArea() -> Element {
    let ctx = use_context::<AppContext>();
    let channel = ctx.toasts();
    let mut toasts = use_signal(Vec::<ToastVm>::new);

    use_future(move || {
        let mut incoming = channel.subscribe();
        async move {
            let mut next_id = 0_u64;
            loop {
                match incoming.recv().await {
                    Ok(toast) => {
                        next_id += 1;
                        let id = next_id;
                        toasts.write().push(map_toast(id, &toast));
                        spawn(async move {
                            tokio::time::sleep(TOAST_TTL).await;
                            toasts.write().retain(|toast| toast.id != id);
                        });
                    }
                    Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
            }
        }
    });

    rsx! {
        div { class: "toast-area", aria_live: "polite",
            for toast in toasts() {
                div {
                    key: "{toast.id}",
                    class: toast.class,
                    onclick: move |_| toasts.write().retain(|item| item.id != toast.id),
                    "{toast.message}"
                }
            }
        }
    }
}
