use std::rc::Rc;

use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use quiz_core::model::{QuizId, QuizMode, TimeUnit};
use services::SessionEvent;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, redirect_home_after, view_state_from_resource};
use crate::vm::{ExamSettingsForm, unit_from_key, unit_key};

#[derive(Clone, Debug, PartialEq)]
struct LandingData {
    title: String,
    total_questions: u32,
    exam_in_progress: bool,
}

/// Quiz overview: pick exam settings, then start an exam or study.
#[component]
pub fn LandingView(quiz_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    // Exam-mode controller: configuring the exam persists its settings for
    // the exam view to resume from.
    let controller = use_hook(|| Rc::new(ctx.session_controller(QuizMode::Exam)));
    let mut form = use_signal(ExamSettingsForm::default);
    let mut form_error = use_signal(|| None::<&'static str>);

    let mut resource = {
        let controller = Rc::clone(&controller);
        let quiz_id = quiz_id.clone();
        use_resource(move || {
            let controller = Rc::clone(&controller);
            let quiz_id = QuizId::new(quiz_id.clone());
            async move {
                if let Err(err) = controller.open(&quiz_id).await {
                    let view_err = ViewError::from(&err);
                    spawn(async move { redirect_home_after(navigator, &err).await });
                    return Err(view_err);
                }
                let snapshot = controller.snapshot().ok_or(ViewError::Unknown)?;
                Ok::<_, ViewError>(LandingData {
                    title: snapshot.quiz.document_name().to_string(),
                    total_questions: snapshot.quiz.total_questions(),
                    exam_in_progress: snapshot.state.is_underway(),
                })
            }
        })
    };
    let state = view_state_from_resource(&resource);

    // An exam started or cleared in another window changes which button applies.
    {
        let controller = Rc::clone(&controller);
        use_future(move || {
            let controller = Rc::clone(&controller);
            async move {
                let mut status = controller.subscribe();
                while status.changed().await.is_ok() {
                    let event = status.borrow_and_update().event;
                    if matches!(
                        event,
                        Some(SessionEvent::Reloaded | SessionEvent::ClearedElsewhere)
                    ) {
                        resource.restart();
                    }
                }
            }
        });
    }

    let on_start_exam = {
        let controller = Rc::clone(&controller);
        let quiz_id = quiz_id.clone();
        use_callback(move |()| {
            let settings = match form.read().to_settings() {
                Ok(settings) => settings,
                Err(message) => {
                    form_error.set(Some(message));
                    return;
                }
            };
            form_error.set(None);
            let controller = Rc::clone(&controller);
            let quiz_id = quiz_id.clone();
            spawn(async move {
                match controller.configure_exam(settings).await {
                    Ok(()) => {
                        let _ = navigator.push(Route::Exam { quiz_id });
                    }
                    Err(err) => {
                        form_error.set(Some(err.user_message()));
                        resource.restart();
                    }
                }
            });
        })
    };

    let on_resume_exam = {
        let quiz_id = quiz_id.clone();
        use_callback(move |()| {
            let _ = navigator.push(Route::Exam {
                quiz_id: quiz_id.clone(),
            });
        })
    };

    let current = form();

    rsx! {
        div { class: "page landing-page",
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    Link { to: Route::Home {}, "Back to quizzes" }
                },
                ViewState::Ready(data) => rsx! {
                    h2 { "{data.title}" }
                    p { class: "landing-meta", "{data.total_questions} questions" }

                    section { class: "landing-mode",
                        h3 { "Exam mode" }
                        p { "Answer everything, then submit for a score. Answers can change until you submit." }
                        if data.exam_in_progress {
                            if let Some(message) = form_error() {
                                p { class: "form-error", "{message}" }
                            }
                            button {
                                class: "btn btn-primary",
                                r#type: "button",
                                onclick: move |_| on_resume_exam.call(()),
                                "Resume exam"
                            }
                        } else {
                            label { class: "field field--inline",
                                input {
                                    r#type: "checkbox",
                                    checked: current.timed,
                                    onchange: move |evt: FormEvent| form.write().timed = evt.checked(),
                                }
                                span { "Timed exam" }
                            }
                            if current.timed {
                                div { class: "field-row",
                                    input {
                                        r#type: "number",
                                        min: "1",
                                        value: "{current.limit}",
                                        oninput: move |evt: FormEvent| form.write().limit = evt.value(),
                                    }
                                    select {
                                        value: "{unit_key(current.unit)}",
                                        onchange: move |evt: FormEvent| form.write().unit = unit_from_key(&evt.value()),
                                        option { value: "{unit_key(TimeUnit::Minutes)}", "Minutes" }
                                        option { value: "{unit_key(TimeUnit::Hours)}", "Hours" }
                                    }
                                }
                            }
                            if let Some(message) = form_error() {
                                p { class: "form-error", "{message}" }
                            }
                            button {
                                class: "btn btn-primary",
                                r#type: "button",
                                onclick: move |_| on_start_exam.call(()),
                                "Start exam"
                            }
                        }
                    }

                    section { class: "landing-mode",
                        h3 { "Study mode" }
                        p { "See the answer and explanation right after each question." }
                        Link {
                            class: "btn btn-secondary",
                            to: Route::Study { quiz_id: quiz_id.clone() },
                            "Start studying"
                        }
                    }
                },
            }
        }
    }
}
