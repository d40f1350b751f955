//! End-to-end tests for the application workflow engine.

use std::sync::Arc;
use vigil_core::{
    AnswerOutcome, PositionDefinition, QUESTION_COUNT, VigilConfig, WorkflowEngine,
};
use vigil_error::WorkflowErrorKind;

const GUILD: u64 = 900;
const ALICE: u64 = 1;
const BOB: u64 = 2;

fn position(name: &str, limit: usize) -> PositionDefinition {
    let toml = format!(
        r#"
        name = "{name}"
        limit = {limit}
        color = 0xFF0000
        emoji = "👑"
        questions = [
            "1. Why should you be {name}?",
            "2. What specific changes would you implement?",
            "3. How would you handle staff conflicts?",
            "4. Describe your vision for server growth",
            "5. What is your daily availability?",
            "6. Share your leadership experience",
            "7. Final message: why choose you?",
        ]
        "#
    );
    toml::from_str(&toml).expect("valid position toml")
}

fn engine_with(positions: Vec<PositionDefinition>) -> WorkflowEngine {
    let config = VigilConfig::default()
        .with_role_name("Pic Perms")
        .with_status_trigger("/Watchtower")
        .with_positions(positions);
    config.validate().expect("valid config");
    WorkflowEngine::new(Arc::new(config))
}

fn answer_all(engine: &WorkflowEngine, user: u64) {
    for i in 0..QUESTION_COUNT {
        engine
            .record_answer(user, GUILD, i, format!("answer {i}"))
            .expect("answer recorded");
    }
}

#[test]
fn test_scenario_full_application_lifecycle() {
    // Manager has limit 1 and 0 current holders: open for applications.
    let engine = engine_with(vec![position("Manager", 1)]);

    let outcome = engine
        .begin_application(ALICE, GUILD, "Manager", 0, &[])
        .expect("begin accepted");
    assert!(outcome.first_question.contains("Why should you be Manager"));

    for i in 0..QUESTION_COUNT {
        let outcome = engine
            .record_answer(ALICE, GUILD, i, format!("answer {i}"))
            .expect("answer recorded");
        match outcome {
            AnswerOutcome::NextQuestion { index, .. } => {
                assert_eq!(index, i + 1);
                assert!(i + 1 < QUESTION_COUNT);
            }
            AnswerOutcome::Review { preview, .. } => {
                assert_eq!(i, QUESTION_COUNT - 1);
                assert_eq!(preview.len(), 3);
                assert_eq!(preview[0], "answer 0");
            }
        }
    }

    let application = engine
        .submit(ALICE, GUILD, "alice", None)
        .expect("submit accepted");

    assert_eq!(application.answers().len(), QUESTION_COUNT);
    assert!(application.answers().iter().all(|a| !a.is_empty()));
    assert_eq!(application.id().len(), 6);
    assert!(
        application
            .id()
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    );

    // The record landed in the pending list and the session is gone.
    let pending = engine.pending_applications(GUILD);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id(), application.id());
    assert!(engine.active_session(ALICE, GUILD).is_none());
}

#[test]
fn test_scenario_concurrent_applicants_do_not_cross_contaminate() {
    let engine = engine_with(vec![position("Manager", 2)]);

    engine
        .begin_application(ALICE, GUILD, "Manager", 0, &[])
        .expect("alice begins");
    for i in 0..3 {
        engine
            .record_answer(ALICE, GUILD, i, format!("alice {i}"))
            .expect("alice answers");
    }

    // Bob starts mid-way through Alice's session.
    engine
        .begin_application(BOB, GUILD, "Manager", 0, &[])
        .expect("bob begins");
    answer_all(&engine, BOB);
    let bob_application = engine.submit(BOB, GUILD, "bob", None).expect("bob submits");
    assert!(bob_application.answers().iter().all(|a| a.starts_with("answer")));

    // Alice's partial answers are untouched.
    for i in 3..QUESTION_COUNT {
        engine
            .record_answer(ALICE, GUILD, i, format!("alice {i}"))
            .expect("alice answers");
    }
    let alice_application = engine
        .submit(ALICE, GUILD, "alice", None)
        .expect("alice submits");
    assert!(alice_application.answers().iter().all(|a| a.starts_with("alice")));
    assert_ne!(alice_application.id(), bob_application.id());
}

#[test]
fn test_full_position_rejects_begin_regardless_of_history() {
    let engine = engine_with(vec![position("Manager", 1)]);

    let err = engine
        .begin_application(ALICE, GUILD, "Manager", 1, &[])
        .unwrap_err();
    assert!(matches!(err.kind(), WorkflowErrorKind::PositionFull(_)));

    // Occupancy above the limit reads the same.
    let err = engine
        .begin_application(ALICE, GUILD, "Manager", 5, &[])
        .unwrap_err();
    assert!(matches!(err.kind(), WorkflowErrorKind::PositionFull(_)));
}

#[test]
fn test_unknown_position_is_rejected() {
    let engine = engine_with(vec![position("Manager", 1)]);
    let err = engine
        .begin_application(ALICE, GUILD, "Janitor", 0, &[])
        .unwrap_err();
    assert!(matches!(err.kind(), WorkflowErrorKind::UnknownPosition(_)));
}

#[test]
fn test_existing_session_blocks_second_begin() {
    let engine = engine_with(vec![position("Manager", 2), position("Helper", 2)]);

    engine
        .begin_application(ALICE, GUILD, "Manager", 0, &[])
        .expect("first begin");
    let err = engine
        .begin_application(ALICE, GUILD, "Helper", 0, &[])
        .unwrap_err();
    assert!(matches!(err.kind(), WorkflowErrorKind::SessionInProgress));

    // The original session survives the rejected attempt.
    let (name, _) = engine.active_session(ALICE, GUILD).expect("session alive");
    assert_eq!(name, "Manager");
}

#[test]
fn test_pending_application_blocks_reapplication() {
    let engine = engine_with(vec![position("Manager", 5)]);

    engine
        .begin_application(ALICE, GUILD, "Manager", 0, &[])
        .expect("begin");
    answer_all(&engine, ALICE);
    engine.submit(ALICE, GUILD, "alice", None).expect("submit");

    let err = engine
        .begin_application(ALICE, GUILD, "Manager", 0, &[])
        .unwrap_err();
    assert!(matches!(err.kind(), WorkflowErrorKind::DuplicatePending));
}

#[test]
fn test_single_pending_enforcement_can_be_disabled() {
    let config = VigilConfig::default()
        .with_role_name("Pic Perms")
        .with_status_trigger("/Watchtower")
        .with_enforce_single_pending(false)
        .with_positions(vec![position("Manager", 5)]);
    let engine = WorkflowEngine::new(Arc::new(config));

    engine
        .begin_application(ALICE, GUILD, "Manager", 0, &[])
        .expect("begin");
    answer_all(&engine, ALICE);
    engine.submit(ALICE, GUILD, "alice", None).expect("submit");

    engine
        .begin_application(ALICE, GUILD, "Manager", 0, &[])
        .expect("second application allowed with enforcement off");
}

#[test]
fn test_held_position_role_blocks_begin() {
    let engine = engine_with(vec![position("Manager", 2)]);
    let err = engine
        .begin_application(ALICE, GUILD, "Manager", 0, &["Helper".to_string()])
        .unwrap_err();
    assert!(matches!(err.kind(), WorkflowErrorKind::AlreadyStaff(_)));
}

#[test]
fn test_submit_requires_all_answers_non_blank() {
    let engine = engine_with(vec![position("Manager", 1)]);
    engine
        .begin_application(ALICE, GUILD, "Manager", 0, &[])
        .expect("begin");

    for i in 0..QUESTION_COUNT {
        let text = if i == 4 { "   " } else { "fine" };
        engine
            .record_answer(ALICE, GUILD, i, text)
            .expect("answer recorded");
    }

    let err = engine.submit(ALICE, GUILD, "alice", None).unwrap_err();
    assert!(matches!(
        err.kind(),
        WorkflowErrorKind::UnansweredQuestion { index: 4 }
    ));

    // Fixing the blank slot unblocks submission.
    engine
        .record_answer(ALICE, GUILD, 4, "now answered")
        .expect("rewrite");
    for i in 5..QUESTION_COUNT {
        engine
            .record_answer(ALICE, GUILD, i, "fine")
            .expect("answer recorded");
    }
    engine.submit(ALICE, GUILD, "alice", None).expect("submit");
}

#[test]
fn test_record_answer_without_session_is_expired() {
    let engine = engine_with(vec![position("Manager", 1)]);
    let err = engine.record_answer(ALICE, GUILD, 0, "hello").unwrap_err();
    assert!(matches!(err.kind(), WorkflowErrorKind::SessionExpired));
}

#[test]
fn test_cancel_is_idempotent() {
    let engine = engine_with(vec![position("Manager", 1)]);
    assert!(!engine.cancel(ALICE, GUILD));

    engine
        .begin_application(ALICE, GUILD, "Manager", 0, &[])
        .expect("begin");
    assert!(engine.cancel(ALICE, GUILD));
    assert!(!engine.cancel(ALICE, GUILD));
    assert!(engine.active_session(ALICE, GUILD).is_none());
}

#[test]
fn test_sessions_are_scoped_per_guild() {
    let engine = engine_with(vec![position("Manager", 2)]);
    let other_guild = GUILD + 1;

    engine
        .begin_application(ALICE, GUILD, "Manager", 0, &[])
        .expect("guild one");
    engine
        .begin_application(ALICE, other_guild, "Manager", 0, &[])
        .expect("guild two runs independently");

    engine.record_answer(ALICE, GUILD, 0, "one").expect("answer");
    let (_, state) = engine.active_session(ALICE, other_guild).expect("session");
    assert_eq!(format!("{state}"), "answering question 1");
}

#[test]
fn test_log_channel_roundtrip() {
    let engine = engine_with(vec![]);
    assert_eq!(engine.log_channel(GUILD), None);
    engine.set_log_channel(GUILD, 555);
    assert_eq!(engine.log_channel(GUILD), Some(555));
    engine.set_log_channel(GUILD, 777);
    assert_eq!(engine.log_channel(GUILD), Some(777));
}
