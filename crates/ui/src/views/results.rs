use dioxus::prelude::*;
use dioxus_router::Link;

use quiz_core::model::{QuizId, QuizMode};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ResultsVm, ReviewItemVm, map_results};

#[component]
pub fn ResultsView(quiz_id: String, mode: QuizMode) -> Element {
    let ctx = use_context::<AppContext>();
    let library = ctx.library();

    let resource = {
        let quiz_id = quiz_id.clone();
        use_resource(move || {
            let library = library.clone();
            let quiz_id = QuizId::new(quiz_id.clone());
            async move {
                let result = library
                    .result(&quiz_id, mode)
                    .await
                    .map_err(|err| ViewError::from(&err))?;
                Ok::<_, ViewError>(map_results(&result))
            }
        })
    };
    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page results-page",
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
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
                ViewState::Ready(results) => rsx! {
                    ResultsBody { results, quiz_id: quiz_id.clone() }
                },
            }
        }
    }
}

#[component]
fn ResultsBody(results: ResultsVm, quiz_id: String) -> Element {
    rsx! {
        header { class: "results-header",
            p { class: "results-header__mode", "{results.mode_label}" }
            h2 { "{results.title}" }
        }
        section { class: results.band_class,
            span { class: "score__percentage", "{results.percentage_label}" }
            span { class: "score__detail", "{results.score_label}" }
            p { class: "score__headline", "{results.headline}" }
        }
        div { class: "results-actions",
            Link { class: "btn btn-primary", to: Route::Landing { quiz_id }, "Try again" }
            Link { class: "btn btn-secondary", to: Route::Home {}, "All quizzes" }
        }
        h3 { "Review" }
        ol { class: "review-list",
            for item in results.review {
                ReviewItem { key: "{item.number}", item }
            }
        }
    }
}

#[component]
fn ReviewItem(item: ReviewItemVm) -> Element {
    rsx! {
        li { class: "review-item",
            div { class: "review-item__head",
                span { class: "review-item__prompt", "{item.prompt}" }
                span { class: item.status_class, "{item.status_label}" }
            }
            ul { class: "question-card__options",
                for option in item.options {
                    li { key: "{option.index}", class: option.state.class(),
                        span { class: "option__letter", "{option.letter}" }
                        span { class: "option__text", "{option.text}" }
                    }
                }
            }
            if !item.explanation.is_empty() {
                p { class: "question-card__explanation", "{item.explanation}" }
            }
        }
    }
}
