use std::sync::Arc;

use quiz_core::model::{
    ExamSettings, Question, QuestionDraft, QuestionId, Quiz, QuizId, QuizMode, QuizSession,
    TimeUnit,
};
use quiz_core::time::fixed_now;
use storage::repository::{InstanceId, Partition, SessionStore};
use storage::sqlite::SqliteRepository;
use storage::SessionPartitions;

fn build_quiz(id: &str) -> Quiz {
    let questions: Vec<Question> = (1..=3)
        .map(|n| {
            QuestionDraft {
                id: QuestionId::new(format!("{id}-q{n}")),
                number: n,
                prompt: format!("Prompt {n}"),
                options: vec!["yes".into(), "no".into(), "maybe".into()],
                correct_answer: 0,
                explanation: String::new(),
            }
            .validate()
            .unwrap()
        })
        .collect();
    Quiz::new(QuizId::new(id), "lecture.pdf", questions).unwrap()
}

#[tokio::test]
async fn sqlite_partitions_persist_quiz_and_session() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_partitions?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // Migrations are idempotent.
    repo.migrate().await.expect("migrate twice");

    let partitions = SessionPartitions::new(Arc::new(repo.clone()));
    let quiz = build_quiz("abc");
    let mut session = QuizSession::new(quiz.clone(), QuizMode::Exam);
    session
        .configure_exam(ExamSettings::timed(2, TimeUnit::Minutes).unwrap())
        .unwrap();
    session.start(fixed_now());
    session.select_option(2, 1).unwrap();

    partitions.save_quiz(&quiz, fixed_now()).await.unwrap();
    partitions
        .save_session(session.state(), fixed_now())
        .await
        .unwrap();

    let other_window = SessionPartitions::new(Arc::new(repo));
    let loaded_quiz = other_window.load_quiz().await.unwrap().expect("quiz");
    let loaded_state = other_window
        .load_session(QuizMode::Exam)
        .await
        .unwrap()
        .expect("session");
    assert_eq!(loaded_quiz, quiz);
    assert_eq!(&loaded_state, session.state());
    assert!(other_window.load_session(QuizMode::Study).await.unwrap().is_none());

    let resumed = QuizSession::resume(loaded_quiz, loaded_state).unwrap();
    assert_eq!(resumed.selected_option(2), Some(1));
    assert_eq!(resumed.state().exam_started_at(), Some(fixed_now()));
}

#[tokio::test]
async fn sqlite_clear_removes_partition_and_notifies() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_clear?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let mut changes = repo.subscribe();
    let origin = InstanceId::random();
    repo.save(Partition::Study, "{}", origin, fixed_now())
        .await
        .unwrap();
    let stored = repo.load(Partition::Study).await.unwrap().expect("stored");
    assert_eq!(stored.origin, origin);
    assert_eq!(stored.updated_at, fixed_now());

    repo.clear(Partition::Study, origin).await.unwrap();
    assert!(repo.load(Partition::Study).await.unwrap().is_none());

    assert_eq!(changes.recv().await.unwrap().partition, Partition::Study);
    assert_eq!(changes.recv().await.unwrap().partition, Partition::Study);
}
