use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use quiz_core::model::{Difficulty, DocumentFormat, QuizId};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{QuizCardVm, UploadForm, map_quiz_card, parse_question_count};

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let library = ctx.library();

    let resource = {
        let library = library.clone();
        use_resource(move || {
            let library = library.clone();
            async move {
                let quizzes = library.list().await.map_err(|_| ViewError::Unknown)?;
                Ok::<_, ViewError>(quizzes.iter().map(map_quiz_card).collect::<Vec<_>>())
            }
        })
    };

    // Reload the list whenever a quiz is generated.
    {
        let library = library.clone();
        use_future(move || {
            let mut revisions = library.subscribe();
            let mut resource = resource;
            async move {
                while revisions.changed().await.is_ok() {
                    resource.restart();
                }
            }
        });
    }

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "Your quizzes" }
            UploadPanel {}

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(cards) => rsx! {
                    if cards.is_empty() {
                        p { "No quizzes yet. Upload a PDF to get started." }
                    } else {
                        ul { class: "quiz-list",
                            for card in cards {
                                QuizCard { key: "{card.id}", card }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
            }
        }
    }
}

#[component]
fn QuizCard(card: QuizCardVm) -> Element {
    let ctx = use_context::<AppContext>();
    let mut downloading = use_signal(|| false);
    let mut saved_to = use_signal(|| None::<String>);

    let download = {
        let library = ctx.library();
        let quiz_id = QuizId::new(card.id.clone());
        use_callback(move |format: DocumentFormat| {
            let library = library.clone();
            let quiz_id = quiz_id.clone();
            spawn(async move {
                downloading.set(true);
                if let Ok(file) = library.download(&quiz_id, format).await {
                    // Export lands in the working directory.
                    if tokio::fs::write(&file.file_name, &file.bytes).await.is_ok() {
                        saved_to.set(Some(file.file_name));
                    }
                }
                downloading.set(false);
            });
        })
    };

    rsx! {
        li { class: "quiz-card",
            Link { class: "quiz-card__link", to: Route::Landing { quiz_id: card.id.clone() },
                span { class: "quiz-card__title", "{card.title}" }
            }
            p { class: "quiz-card__meta", "{card.questions_label} · {card.created_label}" }
            div { class: "quiz-card__actions",
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    disabled: downloading(),
                    onclick: move |_| download.call(DocumentFormat::Pdf),
                    "Download PDF"
                }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    disabled: downloading(),
                    onclick: move |_| download.call(DocumentFormat::Docx),
                    "Download DOCX"
                }
            }
            if let Some(path) = saved_to() {
                p { class: "quiz-card__saved", "Saved {path}" }
            }
        }
    }
}

#[component]
fn UploadPanel() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let mut form = use_signal(UploadForm::default);
    let mut busy = use_signal(|| false);
    let mut read_error = use_signal(|| None::<String>);

    let on_generate = {
        let library = ctx.library();
        use_callback(move |()| {
            let library = library.clone();
            let current = form();
            if !current.can_submit() || busy() {
                return;
            }
            spawn(async move {
                busy.set(true);
                read_error.set(None);
                match tokio::fs::read(current.path.trim()).await {
                    Ok(bytes) => {
                        let generated = library
                            .generate(
                                &current.file_name(),
                                bytes,
                                current.question_count,
                                current.difficulty,
                            )
                            .await;
                        if let Ok(quiz) = generated {
                            form.set(UploadForm::default());
                            let _ = navigator.push(Route::Landing {
                                quiz_id: quiz.id().as_str().to_string(),
                            });
                        }
                    }
                    Err(err) => {
                        read_error.set(Some(format!("Unable to read {}: {err}", current.path.trim())));
                    }
                }
                busy.set(false);
            });
        })
    };

    let current = form();
    let label = if busy() { "Generating..." } else { "Generate quiz" };

    rsx! {
        section { class: "upload-panel",
            h3 { "Generate a quiz from a PDF" }
            label { class: "field",
                span { "PDF file path" }
                input {
                    r#type: "text",
                    placeholder: "/path/to/document.pdf",
                    value: "{current.path}",
                    oninput: move |evt: FormEvent| form.write().path = evt.value(),
                }
            }
            label { class: "field",
                span { "Number of questions" }
                input {
                    r#type: "number",
                    min: "10",
                    max: "100",
                    value: "{current.question_count}",
                    oninput: move |evt: FormEvent| {
                        form.write().question_count = parse_question_count(&evt.value());
                    },
                }
            }
            label { class: "field",
                span { "Difficulty" }
                select {
                    value: "{current.difficulty.as_str()}",
                    onchange: move |evt: FormEvent| {
                        if let Some(difficulty) = Difficulty::from_key(&evt.value()) {
                            form.write().difficulty = difficulty;
                        }
                    },
                    for difficulty in Difficulty::ALL {
                        option { value: "{difficulty.as_str()}", "{difficulty.title()}" }
                    }
                }
            }
            if let Some(message) = read_error() {
                p { class: "form-error", "{message}" }
            }
            button {
                class: "btn btn-primary",
                r#type: "button",
                disabled: busy() || !current.can_submit(),
                onclick: move |_| on_generate.call(()),
                "{label}"
            }
        }
    }
}
