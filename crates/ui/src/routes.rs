use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use quiz_core::model::QuizMode;

use crate::views::{ExamView, HomeView, LandingView, ResultsView, StudyView, ToastArea};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/quiz/:quiz_id", LandingView)] Landing { quiz_id: String },
        #[route("/quiz/:quiz_id/exam", ExamView)] Exam { quiz_id: String },
        #[route("/quiz/:quiz_id/study", StudyView)] Study { quiz_id: String },
        #[route("/quiz/:quiz_id/results/:mode", ResultsView)] Results { quiz_id: String, mode: QuizMode },
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
            ToastArea {}
        }
    }
}

#[component]
fn Sidebar() -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Quiz" }
            ul {
                li { Link { to: Route::Home {}, "Quizzes" } }
            }
        }
    }
}
