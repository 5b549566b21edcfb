use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use quiz_core::model::{
    DocumentFormat, DocumentUpload, QuestionDraft, QuestionId, Quiz, QuizId, QuizMode,
    QuizResult, QuizSummary, ResultQuestion, StoredResult, SubmissionPayload,
};
use quiz_core::time::{fixed_clock, fixed_now};
use services::{ApiError, AppServices, LibraryService, QuizApi, SessionController};
use storage::Storage;

use crate::context::{UiApp, build_app_context};
use crate::views::{ExamView, HomeView, LandingView, ResultsView, StudyView, ToastArea};
use crate::vm::ToastChannel;

pub const QUIZ_ID: &str = "quiz-1";

pub fn sample_quiz() -> Quiz {
    let questions = (1..=2)
        .map(|number| {
            QuestionDraft {
                id: QuestionId::new(format!("q{number}")),
                number,
                prompt: format!("Question {number}?"),
                options: vec!["Red".into(), "Green".into(), "Blue".into()],
                correct_answer: 1,
                explanation: format!("Green is right for {number}."),
            }
            .validate()
            .expect("valid question")
        })
        .collect();
    Quiz::new(QuizId::new(QUIZ_ID), "physics.pdf", questions).expect("valid quiz")
}

/// Serves `sample_quiz` and nothing else.
#[derive(Default)]
pub struct FakeApi {
    pub fail_listing: AtomicBool,
    fetches: AtomicUsize,
}

impl FakeApi {
    pub fn quiz_fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuizApi for FakeApi {
    async fn get_quiz(&self, quiz_id: &QuizId) -> Result<Quiz, ApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if quiz_id.as_str() == QUIZ_ID {
            Ok(sample_quiz())
        } else {
            Err(ApiError::NotFound)
        }
    }

    async fn submit_quiz(&self, payload: &SubmissionPayload) -> Result<StoredResult, ApiError> {
        Ok(StoredResult {
            quiz_id: payload.quiz_id.clone(),
            mode: payload.mode,
            score: 0,
            total_questions: payload.total_questions,
        })
    }

    async fn get_quiz_result(
        &self,
        quiz_id: &QuizId,
        mode: QuizMode,
    ) -> Result<QuizResult, ApiError> {
        if quiz_id.as_str() != QUIZ_ID {
            return Err(ApiError::NotFound);
        }
        Ok(QuizResult {
            quiz_id: quiz_id.clone(),
            mode,
            document_name: "physics.pdf".into(),
            score: 2,
            percentage: 100,
            total_questions: 2,
            correct_answers: 2,
            incorrect_answers: 0,
            questions: vec![ResultQuestion {
                id: QuestionId::new("q1"),
                prompt: "Question 1?".into(),
                options: vec!["Red".into(), "Green".into(), "Blue".into()],
                selected_option: Some(1),
                correct_answer: 1,
                explanation: "Green is right for 1.".into(),
            }],
        })
    }

    async fn list_quizzes(&self) -> Result<Vec<QuizSummary>, ApiError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(ApiError::InvalidResponse("boom".into()));
        }
        Ok(vec![QuizSummary {
            id: QuizId::new(QUIZ_ID),
            document_name: "physics.pdf".into(),
            created_at: fixed_now(),
            total_questions: 2,
        }])
    }

    async fn upload_and_generate(&self, _upload: &DocumentUpload) -> Result<Quiz, ApiError> {
        Ok(sample_quiz())
    }

    async fn download_quiz(
        &self,
        _quiz_id: &QuizId,
        _format: DocumentFormat,
    ) -> Result<Vec<u8>, ApiError> {
        Ok(b"%PDF-1.4".to_vec())
    }
}

#[derive(Clone)]
struct TestApp {
    services: AppServices,
    toasts: ToastChannel,
}

impl UiApp for TestApp {
    fn session_controller(&self, mode: QuizMode) -> SessionController {
        self.services.session_controller(mode)
    }

    fn library(&self) -> Arc<LibraryService> {
        self.services.library()
    }

    fn toasts(&self) -> ToastChannel {
        self.toasts.clone()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Landing(String),
    Exam(String),
    Study(String),
    Results(String, QuizMode),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    let page = match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Landing(quiz_id) => rsx! { LandingView { quiz_id } },
        ViewKind::Exam(quiz_id) => rsx! { ExamView { quiz_id } },
        ViewKind::Study(quiz_id) => rsx! { StudyView { quiz_id } },
        ViewKind::Results(quiz_id, mode) => rsx! { ResultsView { quiz_id, mode } },
    };
    rsx! {
        {page}
        ToastArea {}
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub api: Arc<FakeApi>,
    pub services: AppServices,
    pub toasts: ToastChannel,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild, then let resources and futures settle.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..8 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_view_harness(view: ViewKind) -> ViewHarness {
    setup_view_harness_with_api(view, Arc::new(FakeApi::default()))
}

pub fn setup_view_harness_with_api(view: ViewKind, api: Arc<FakeApi>) -> ViewHarness {
    let toasts = ToastChannel::new();
    let services = AppServices::new(
        fixed_clock(),
        Arc::clone(&api) as Arc<dyn QuizApi>,
        Storage::in_memory(),
        Arc::new(toasts.clone()),
    );
    let app = Arc::new(TestApp {
        services: services.clone(),
        toasts: toasts.clone(),
    });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });
    ViewHarness {
        dom,
        api,
        services,
        toasts,
    }
}
