// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::OrchestratorError;
use sb_core::{AgentId, Outcome, WorkItemRef};

#[tokio::test]
async fn pause_rejects_commands_resume_accepts_again() {
    let fx = fixture();
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();

    fx.orch.publish_command(create_branch(session, "feature/a")).await;
    stream.take(3, WAIT).await;

    fx.orch.pause_session(&session).unwrap();
    let paused = stream.take(1, WAIT).await;
    match &paused[0].kind {
        EventKind::SessionStatusChanged { status, .. } => {
            assert_eq!(*status, SessionStatus::Paused);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    fx.orch.publish_command(create_branch(session, "feature/b")).await;
    let rejected = stream.take(1, WAIT).await;
    match &rejected[0].kind {
        EventKind::CommandRejected { reason, policy_rule } => {
            assert_eq!(reason, "Session not accepting commands");
            assert_eq!(policy_rule.as_deref(), Some("Paused"));
        }
        other => panic!("unexpected event: {:?}", other),
    }

    fx.orch.resume_session(&session).unwrap();
    stream.take(1, WAIT).await;
    fx.orch.publish_command(create_branch(session, "feature/c")).await;
    let events = stream.take(2, WAIT).await;
    assert_eq!(kind_names(&events), vec!["command-accepted", "command-completed"]);
}

#[tokio::test]
async fn every_transition_emits_a_status_event() {
    let fx = fixture();
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();

    fx.orch.pause_session(&session).unwrap();
    fx.orch.resume_session(&session).unwrap();
    fx.orch.complete_session(&session).unwrap();

    let statuses: Vec<SessionStatus> = fx
        .orch
        .session_events(&session)
        .unwrap()
        .iter()
        .filter_map(|event| match &event.kind {
            EventKind::SessionStatusChanged { status, .. } => Some(*status),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            SessionStatus::Running,
            SessionStatus::Paused,
            SessionStatus::Running,
            SessionStatus::Completed
        ]
    );
}

#[tokio::test]
async fn invalid_transitions_error_without_emitting() {
    let fx = fixture();
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();

    fx.orch.pause_session(&session).unwrap();
    let before = fx.orch.session_events(&session).unwrap().len();

    // Paused -> Paused and Paused -> Completed are both inadmissible.
    assert!(matches!(
        fx.orch.pause_session(&session),
        Err(OrchestratorError::Transition(_))
    ));
    assert!(matches!(
        fx.orch.complete_session(&session),
        Err(OrchestratorError::Transition(_))
    ));
    assert_eq!(fx.orch.session_events(&session).unwrap().len(), before);
}

#[tokio::test]
async fn terminal_sessions_reject_with_their_status_as_rule() {
    let fx = fixture();
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();
    stream.take(1, WAIT).await;

    fx.orch.complete_session(&session).unwrap();
    stream.take(1, WAIT).await;

    fx.orch.publish_command(create_branch(session, "feature/late")).await;
    let events = stream.take(1, WAIT).await;
    match &events[0].kind {
        EventKind::CommandRejected { policy_rule, .. } => {
            assert_eq!(policy_rule.as_deref(), Some("Completed"));
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn abort_cancels_in_flight_work() {
    let fx = fixture_with(|config| config.with_wall_clock(Duration::from_secs(10)));
    fx.fake.behave_default(Behavior::Hang);
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();

    fx.orch.publish_command(run_tests(session)).await;
    let prefix = stream.take(2, WAIT).await;
    assert_eq!(kind_names(&prefix), vec!["session-status-changed", "command-accepted"]);

    fx.orch.abort_session(&session).unwrap();

    let rest = stream.take(2, WAIT).await;
    let mut saw_aborted = false;
    let mut saw_cancelled = false;
    for event in &rest {
        match &event.kind {
            EventKind::SessionStatusChanged { status: SessionStatus::Aborted, .. } => {
                saw_aborted = true;
            }
            EventKind::CommandCompleted { outcome, message, .. } => {
                assert_eq!(*outcome, Outcome::Failure);
                assert_eq!(message.as_deref(), Some("cancelled"));
                saw_cancelled = true;
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
    assert!(saw_aborted && saw_cancelled);
}

#[tokio::test]
async fn teardown_releases_workspace_and_claims() {
    let fx = fixture();
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();
    let workspace = fx.orch.workspace_path(&session).unwrap();
    assert!(workspace.is_dir());

    fx.orch.claims().try_claim(
        &WorkItemRef::new("PROJ-1"),
        &AgentId::new("executor"),
        &session,
        None,
    );
    assert_eq!(fx.orch.claims().active_claims().len(), 1);

    fx.orch.complete_session(&session).unwrap();

    assert!(!workspace.exists(), "provider-created workspace should be removed");
    assert!(fx.orch.claims().active_claims().is_empty());
    assert!(fx.orch.workspace_path(&session).is_none());
}

#[tokio::test]
async fn lifecycle_calls_on_unknown_sessions_error() {
    let fx = fixture();
    let ghost = SessionId::new();
    assert!(matches!(
        fx.orch.pause_session(&ghost),
        Err(OrchestratorError::SessionNotFound(_))
    ));
    assert!(matches!(
        fx.orch.session_status(&ghost),
        Err(OrchestratorError::SessionNotFound(_))
    ));
}

#[tokio::test]
async fn duplicate_session_ids_are_refused() {
    let fx = fixture();
    let config = session_config(PolicyProfile::named("open"));
    let duplicate = config.clone();
    fx.orch.create_session(config).await.unwrap();
    assert!(matches!(
        fx.orch.create_session(duplicate).await,
        Err(OrchestratorError::SessionExists(_))
    ));
}

#[tokio::test]
async fn approve_before_request_just_sets_the_flag() {
    let fx = fixture();
    let profile =
        PolicyProfile { require_approval_for_push: true, ..PolicyProfile::named("approved") };
    let session = fx.orch.create_session(session_config(profile)).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();
    stream.take(1, WAIT).await;

    // Unapproved push is rejected.
    fx.orch.publish_command(push(session, "feature/x")).await;
    let events = stream.take(1, WAIT).await;
    assert_eq!(kind_names(&events), vec!["command-rejected"]);

    // Approving while Running leaves the status alone but opens the gate.
    fx.orch.approve_session(&session).unwrap();
    assert_eq!(fx.orch.session_status(&session).unwrap(), SessionStatus::Running);

    fx.orch.publish_command(push(session, "feature/x")).await;
    let events = stream.take(2, WAIT).await;
    assert_eq!(kind_names(&events), vec!["command-accepted", "command-completed"]);
}
