//! End-to-end session scenarios: admission, violation policy, forced
//! cancellation, scoring, and save-failure handling.

use std::sync::Arc;

use exam_proctor_core::{
    monitor::ClipboardOp, ExamDefinition, HostEvent, Lifecycle, MemoryGateway, NullObserver,
    ProctorError, ProctoringSession, Question, SessionConfig, StudentIdentity, ViolationPool,
};

fn two_question_exam() -> Arc<ExamDefinition> {
    Arc::new(ExamDefinition {
        id: "exam-101".into(),
        title: "General Knowledge".into(),
        duration_secs: 1800,
        questions: vec![
            Question {
                id: "q1".into(),
                text: "Capital of France?".into(),
                passage: None,
                options: vec!["Paris".into(), "Lyon".into(), "Nice".into()],
                correct_answer: 0,
            },
            Question {
                id: "q2".into(),
                text: "Largest planet?".into(),
                passage: None,
                options: vec!["Mars".into(), "Jupiter".into(), "Venus".into()],
                correct_answer: 1,
            },
        ],
    })
}

fn student() -> StudentIdentity {
    StudentIdentity::new("stu-42", "Ada Lovelace", "ADM-2042")
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

async fn start_session(gateway: Arc<MemoryGateway>) -> ProctoringSession {
    init_logging();
    ProctoringSession::start(
        two_question_exam(),
        student(),
        SessionConfig::default(),
        gateway,
        Arc::new(NullObserver),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn ten_copy_attempts_cancel_the_attempt() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut session = start_session(Arc::clone(&gateway)).await;

    for i in 1..=10u32 {
        session.handle_event(&HostEvent::Clipboard {
            op: ClipboardOp::Copy,
        });
        if i < 10 {
            assert!(session.is_active(), "active after {} copies", i);
        }
    }

    assert!(!session.is_active());
    let result = session.attempt().result().unwrap();
    assert_eq!(session.attempt().lifecycle(), Lifecycle::Cancelled);
    assert_eq!(
        result.cancellation_reason.as_deref(),
        Some("Exceeded maximum allowed copy/paste attempts (10)")
    );
    // Cancelled attempts are zero-scored
    assert_eq!(result.correct_answers, 0);
    assert_eq!(result.score_percentage, 0.0);
    // Pools are independent
    assert_eq!(session.ledger().pool_count(ViolationPool::TabSwitch), 0);
    assert_eq!(session.ledger().pool_count(ViolationPool::CopyPaste), 10);

    // Background save lands
    tokio::task::yield_now().await;
    assert_eq!(gateway.cancellations().len(), 1);
    assert_eq!(
        gateway.cancellations()[0].reason,
        "Exceeded maximum allowed copy/paste attempts (10)"
    );
}

#[tokio::test]
async fn events_past_the_threshold_are_idempotent() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut session = start_session(gateway).await;

    for _ in 0..15 {
        session.handle_event(&HostEvent::Clipboard {
            op: ClipboardOp::Paste,
        });
    }
    // Counting stopped at teardown; exactly one cancellation
    assert_eq!(session.ledger().pool_count(ViolationPool::CopyPaste), 10);
    assert_eq!(session.attempt().lifecycle(), Lifecycle::Cancelled);
}

#[tokio::test]
async fn prior_attempt_blocks_admission() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut first = start_session(Arc::clone(&gateway)).await;
    first.attempt_mut().record_answer(&"q1".into(), 0);
    first.submit().await.unwrap();

    let err = ProctoringSession::start(
        two_question_exam(),
        student(),
        SessionConfig::default(),
        gateway,
        Arc::new(NullObserver),
    )
    .await
    .unwrap_err();

    match err {
        ProctorError::AlreadyTaken {
            student_id,
            exam_id,
        } => {
            assert_eq!(student_id, "stu-42");
            assert_eq!(exam_id, "exam-101");
        }
        other => panic!("expected AlreadyTaken, got {:?}", other),
    }
}

#[tokio::test]
async fn violation_persistence_failure_never_stops_counting() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.set_fail_violations(true);
    let mut session = start_session(Arc::clone(&gateway)).await;

    for _ in 0..5 {
        session.handle_event(&HostEvent::Clipboard {
            op: ClipboardOp::Copy,
        });
    }
    tokio::task::yield_now().await;

    assert!(session.is_active());
    assert_eq!(session.ledger().pool_count(ViolationPool::CopyPaste), 5);
    assert!(gateway.violations().is_empty());
}

#[tokio::test]
async fn flagged_correct_answer_forfeits_credit() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut session = start_session(gateway).await;

    // Both answered correctly, q2 left flagged for review
    session.attempt_mut().record_answer(&"q1".into(), 0);
    session.attempt_mut().record_answer(&"q2".into(), 1);
    session.attempt_mut().toggle_flag(&"q2".into());

    let result = session.submit().await.unwrap();
    assert_eq!(result.total_questions, 2);
    assert_eq!(result.correct_answers, 1);
    assert_eq!(result.score_percentage, 50.0);
    assert_eq!(result.flagged_questions, vec!["q2".to_string()]);
}

#[tokio::test]
async fn double_submit_returns_the_same_result() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut session = start_session(Arc::clone(&gateway)).await;
    session.attempt_mut().record_answer(&"q1".into(), 0);

    let first = session.submit().await.unwrap();
    // Second submit re-saves the cached result, it does not re-score
    session.attempt_mut().record_answer(&"q2".into(), 1);
    let second = session.submit().await.unwrap();

    assert_eq!(first.attempt_id, second.attempt_id);
    assert_eq!(first.correct_answers, second.correct_answers);
    assert_eq!(first.submitted_at, second.submitted_at);
    assert_eq!(gateway.results().len(), 1);
}

#[tokio::test]
async fn teardown_stops_the_ledger() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut session = start_session(gateway).await;

    session.handle_event(&HostEvent::VisibilityChanged { hidden: true });
    assert_eq!(session.ledger().pool_count(ViolationPool::TabSwitch), 1);

    session.teardown();
    session.handle_event(&HostEvent::VisibilityChanged { hidden: false });
    session.handle_event(&HostEvent::VisibilityChanged { hidden: true });
    assert_eq!(session.ledger().pool_count(ViolationPool::TabSwitch), 1);
}

#[tokio::test]
async fn forced_cancellation_preserves_answer_snapshot() {
    let gateway = Arc::new(MemoryGateway::new());
    let mut session = start_session(gateway).await;

    session.attempt_mut().record_answer(&"q1".into(), 0);
    for _ in 0..10 {
        session.handle_event(&HostEvent::Clipboard {
            op: ClipboardOp::Copy,
        });
    }

    let result = session.attempt().result().unwrap();
    // Answers stay on record for audit even though the score is zeroed
    assert_eq!(result.answers.get("q1"), Some(&0));
    assert_eq!(result.correct_answers, 0);
}
