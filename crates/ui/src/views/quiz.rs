use std::rc::Rc;

use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use quiz_core::model::{QuizId, QuizMode};
use services::{SessionController, SessionEvent};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, redirect_home_after};
use crate::vm::{NavCellVm, QuestionVm, SessionVm, map_session};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionIntent {
    Select { ordinal: u32, option: usize },
    GoTo(u32),
    Submit,
    Confirm,
    KeepAnswering,
}

#[component]
pub fn ExamView(quiz_id: String) -> Element {
    rsx! {
        QuizSessionView { quiz_id, mode: QuizMode::Exam }
    }
}

#[component]
pub fn StudyView(quiz_id: String) -> Element {
    rsx! {
        QuizSessionView { quiz_id, mode: QuizMode::Study }
    }
}

fn refresh(controller: &SessionController, mut vm: Signal<Option<SessionVm>>) {
    // Keep the last frame once the session unloads after submitting.
    if let Some(snapshot) = controller.snapshot() {
        vm.set(Some(map_session(&snapshot)));
    }
}

#[component]
fn QuizSessionView(quiz_id: String, mode: QuizMode) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let controller = use_hook(|| Rc::new(ctx.session_controller(mode)));
    let vm = use_signal(|| None::<SessionVm>);
    let mut load_error = use_signal(|| None::<ViewError>);
    let mut action_error = use_signal(|| None::<&'static str>);

    // Load, then enter InProgress (which starts the exam timer).
    {
        let controller = Rc::clone(&controller);
        let quiz_id = quiz_id.clone();
        use_future(move || {
            let controller = Rc::clone(&controller);
            let quiz_id = QuizId::new(quiz_id.clone());
            async move {
                let loaded = match controller.open(&quiz_id).await {
                    Ok(_) => controller.start().await,
                    Err(err) => Err(err),
                };
                match loaded {
                    Ok(()) => refresh(&controller, vm),
                    Err(err) => {
                        load_error.set(Some(ViewError::from(&err)));
                        redirect_home_after(navigator, &err).await;
                    }
                }
            }
        });
    }

    // Timer ticks, auto-submit and changes made by other windows.
    {
        let controller = Rc::clone(&controller);
        let quiz_id = quiz_id.clone();
        use_future(move || {
            let controller = Rc::clone(&controller);
            let quiz_id = quiz_id.clone();
            async move {
                let mut status = controller.subscribe();
                while status.changed().await.is_ok() {
                    let event = status.borrow_and_update().event;
                    match event {
                        Some(SessionEvent::Submitted) => {
                            let _ = navigator.replace(Route::Results { quiz_id, mode });
                            return;
                        }
                        Some(SessionEvent::ClearedElsewhere | SessionEvent::Mismatch) => {
                            let _ = navigator.replace(Route::Home {});
                            return;
                        }
                        _ => refresh(&controller, vm),
                    }
                }
            }
        });
    }

    let dispatch = {
        let controller = Rc::clone(&controller);
        use_callback(move |intent: SessionIntent| {
            let controller = Rc::clone(&controller);
            spawn(async move {
                let result = match intent {
                    SessionIntent::Select { ordinal, option } => {
                        controller.select_option(ordinal, option).await.map(|_| ())
                    }
                    SessionIntent::GoTo(page) => controller.go_to_page(page).await.map(|_| ()),
                    SessionIntent::Submit => controller.request_submit().await.map(|_| ()),
                    SessionIntent::Confirm => controller.finalize_submit().await.map(|_| ()),
                    SessionIntent::KeepAnswering => {
                        controller.cancel_submit();
                        Ok(())
                    }
                };
                match result {
                    Ok(()) => action_error.set(None),
                    Err(err) => action_error.set(Some(err.user_message())),
                }
                refresh(&controller, vm);
            });
        })
    };

    let vm_guard = vm.read();
    let title = match mode {
        QuizMode::Exam => "Exam",
        QuizMode::Study => "Study",
    };
    let current_page = vm_guard
        .as_ref()
        .and_then(|session| session.question.as_ref())
        .map_or(1, |question| question.ordinal);
    let countdown_class = if vm_guard.as_ref().is_some_and(|session| session.timer_warning) {
        "countdown countdown--warning"
    } else {
        "countdown"
    };
    let submit_label = if vm_guard.as_ref().is_some_and(|session| session.submitting) {
        "Submitting..."
    } else {
        "Submit"
    };

    rsx! {
        div { class: "page quiz-page",
            match (load_error(), vm_guard.as_ref()) {
                (Some(err), _) => rsx! {
                    p { "{err.message()}" }
                    Link { to: Route::Home {}, "Back to quizzes" }
                },
                (None, None) => rsx! {
                    p { "Loading..." }
                },
                (None, Some(session)) => rsx! {
                    header { class: "quiz-header",
                        div {
                            h2 { "{session.document_name}" }
                            p { class: "quiz-header__mode", "{title} · {session.progress_label} · {session.answered_label}" }
                        }
                        if let Some(countdown) = session.countdown.clone() {
                            span { class: countdown_class, "{countdown}" }
                        }
                    }
                    if let Some(question) = session.question.clone() {
                        QuestionCard { question, on_intent: dispatch }
                    }
                    NavGrid { cells: session.nav.clone(), on_intent: dispatch }
                    if let Some(message) = action_error() {
                        p { class: "form-error", "{message}" }
                    }
                    footer { class: "quiz-footer",
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            disabled: !session.can_go_prev,
                            onclick: move |_| dispatch.call(SessionIntent::GoTo(current_page.saturating_sub(1))),
                            "Previous"
                        }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            disabled: !session.can_go_next,
                            onclick: move |_| dispatch.call(SessionIntent::GoTo(current_page + 1)),
                            "Next"
                        }
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            disabled: session.submitting,
                            onclick: move |_| dispatch.call(SessionIntent::Submit),
                            "{submit_label}"
                        }
                    }
                    if let Some(unanswered) = session.confirm_unanswered {
                        ConfirmDialog { unanswered, on_intent: dispatch }
                    }
                },
            }
        }
    }
}

#[component]
fn QuestionCard(question: QuestionVm, on_intent: Callback<SessionIntent>) -> Element {
    let QuestionVm {
        ordinal,
        prompt,
        options,
        explanation,
        locked,
    } = question;
    rsx! {
        article { class: "question-card",
            h3 { class: "question-card__prompt", "{ordinal}. {prompt}" }
            ul { class: "question-card__options",
                for option in options {
                    li { key: "{option.index}",
                        button {
                            class: option.state.class(),
                            r#type: "button",
                            disabled: locked,
                            onclick: move |_| on_intent.call(SessionIntent::Select { ordinal, option: option.index }),
                            span { class: "option__letter", "{option.letter}" }
                            span { class: "option__text", "{option.text}" }
                        }
                    }
                }
            }
            if let Some(explanation) = explanation {
                p { class: "question-card__explanation", "{explanation}" }
            }
        }
    }
}

#[component]
fn NavGrid(cells: Vec<NavCellVm>, on_intent: Callback<SessionIntent>) -> Element {
    rsx! {
        nav { class: "nav-grid",
            for cell in cells {
                button {
                    key: "{cell.ordinal}",
                    class: cell.class,
                    r#type: "button",
                    onclick: move |_| on_intent.call(SessionIntent::GoTo(cell.ordinal)),
                    "{cell.ordinal}"
                }
            }
        }
    }
}

#[component]
fn ConfirmDialog(unanswered: u32, on_intent: Callback<SessionIntent>) -> Element {
    let noun = if unanswered == 1 { "question" } else { "questions" };
    rsx! {
        div { class: "dialog-overlay",
            div { class: "dialog", role: "dialog", aria_modal: "true",
                h3 { "Submit quiz?" }
                p { "You have {unanswered} unanswered {noun}. Submit anyway?" }
                div { class: "dialog__actions",
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| on_intent.call(SessionIntent::KeepAnswering),
                        "Keep answering"
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        onclick: move |_| on_intent.call(SessionIntent::Confirm),
                        "Submit"
                    }
                }
            }
        }
    }
}
