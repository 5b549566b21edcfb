use std::sync::Arc;
use std::sync::atomic::Ordering;

use quiz_core::model::{ExamSettings, QuizId, QuizMode, TimeUnit};
use services::{Notifier, Toast};

use super::test_harness::{FakeApi, QUIZ_ID, ViewKind, setup_view_harness, setup_view_harness_with_api};

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_lists_quizzes() {
    let mut harness = setup_view_harness(ViewKind::Home);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("physics.pdf"), "missing quiz title in {html}");
    assert!(html.contains("2 questions"), "missing question count in {html}");
    assert!(html.contains("Generate quiz"), "missing upload form in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_error_state() {
    let api = Arc::new(FakeApi::default());
    api.fail_listing.store(true, Ordering::SeqCst);
    let mut harness = setup_view_harness_with_api(ViewKind::Home, api);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Something went wrong"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn landing_view_smoke_offers_both_modes() {
    let mut harness = setup_view_harness(ViewKind::Landing(QUIZ_ID.into()));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("physics.pdf"), "missing title in {html}");
    assert!(html.contains("Start exam"), "missing exam button in {html}");
    assert!(html.contains("Timed exam"), "missing timer settings in {html}");
    assert!(html.contains("Start studying"), "missing study link in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn landing_view_smoke_offers_resume_for_started_exam() {
    let mut harness = setup_view_harness(ViewKind::Landing(QUIZ_ID.into()));
    {
        let exam = harness.services.session_controller(QuizMode::Exam);
        exam.open(&QuizId::new(QUIZ_ID)).await.unwrap();
        exam.start().await.unwrap();
    }
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Resume exam"), "missing resume button in {html}");
    assert!(!html.contains("Timed exam"), "settings shown for a running exam: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn landing_view_smoke_unknown_quiz() {
    let mut harness = setup_view_harness(ViewKind::Landing("missing".into()));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Quiz not found."), "missing not found in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn study_view_smoke_renders_first_question() {
    let mut harness = setup_view_harness(ViewKind::Study(QUIZ_ID.into()));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Question 1?"), "missing prompt in {html}");
    assert!(html.contains("Green"), "missing option in {html}");
    assert!(html.contains("Question 1 of 2"), "missing progress in {html}");
    assert!(!html.contains("countdown"), "study has no timer: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_resumes_configured_exam() {
    let mut harness = setup_view_harness(ViewKind::Exam(QUIZ_ID.into()));
    {
        // What the landing page does before navigating to the exam.
        let landing = harness.services.session_controller(QuizMode::Exam);
        landing.open(&QuizId::new(QUIZ_ID)).await.unwrap();
        let settings = ExamSettings::timed(10, TimeUnit::Minutes).unwrap();
        landing.configure_exam(settings).await.unwrap();
    }
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Question 1?"), "missing prompt in {html}");
    assert!(html.contains("10:00"), "missing countdown in {html}");
    assert_eq!(harness.api.quiz_fetches(), 1, "exam view refetched the quiz");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_smoke_renders_score() {
    let mut harness = setup_view_harness(ViewKind::Results(QUIZ_ID.into(), QuizMode::Exam));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("100%"), "missing percentage in {html}");
    assert!(html.contains("Excellent work!"), "missing headline in {html}");
    assert!(html.contains("Exam results"), "missing mode in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn toast_area_smoke_shows_notifications() {
    let mut harness = setup_view_harness(ViewKind::Home);
    harness.settle().await;
    harness.toasts.notify(Toast::error("Unable to load quiz."));
    for _ in 0..4 {
        harness.drive_async().await;
    }
    let html = harness.render();
    assert!(html.contains("Unable to load quiz."), "missing toast in {html}");
}
