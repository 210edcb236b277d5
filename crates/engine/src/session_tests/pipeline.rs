// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sb_adapters::{AdapterRegistry, RunnerConfig};
use sb_core::{CommandKind, Outcome, RateLimits};

fn completed(event: &Event) -> Option<(Outcome, Option<&str>, Option<&str>)> {
    match &event.kind {
        EventKind::CommandCompleted { outcome, message, error_code } => {
            Some((*outcome, message.as_deref(), error_code.as_deref()))
        }
        _ => None,
    }
}

#[tokio::test]
async fn accepted_command_runs_gate_dispatch_emit() {
    let fx = fixture();
    let config = session_config(PolicyProfile::named("open"));
    let session = fx.orch.create_session(config).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();

    fx.orch.publish_command(create_branch(session, "feature/x")).await;

    let events = stream.take(3, WAIT).await;
    assert_eq!(
        kind_names(&events),
        vec!["session-status-changed", "command-accepted", "command-completed"]
    );
    let (outcome, _, _) = completed(&events[2]).unwrap();
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(fx.fake.handled_kinds(), vec![CommandKind::CreateBranch]);
}

#[tokio::test]
async fn response_events_carry_the_issuer() {
    let fx = fixture();
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();

    fx.orch.publish_command(create_branch(session, "feature/x")).await;

    let events = stream.take(3, WAIT).await;
    // The birth status event is broad: no issuer.
    assert!(events[0].correlation.issuer_agent_id.is_none());
    for event in &events[1..] {
        assert_eq!(
            event.correlation.issuer_agent_id.as_ref().map(|a| a.as_str()),
            Some("executor"),
            "{} should carry the issuer",
            event.kind_name()
        );
        assert!(event.correlation.command_id.is_some());
    }
}

#[tokio::test]
async fn policy_rejection_emits_no_accept_and_skips_the_adapter() {
    let fx = fixture();
    let profile = PolicyProfile {
        command_blacklist: Some(vec![CommandKind::CreateBranch]),
        ..PolicyProfile::named("guarded")
    };
    let session = fx.orch.create_session(session_config(profile)).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();

    fx.orch.publish_command(create_branch(session, "feature/x")).await;

    let events = stream.take(2, WAIT).await;
    assert_eq!(kind_names(&events), vec!["session-status-changed", "command-rejected"]);
    match &events[1].kind {
        EventKind::CommandRejected { reason, policy_rule } => {
            assert_eq!(reason, "Policy violation");
            assert_eq!(policy_rule.as_deref(), Some("Command in blacklist"));
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert!(fx.fake.handled().is_empty());
    assert!(stream.next_timeout(Duration::from_millis(100)).await.is_none());
}

#[tokio::test]
async fn throttled_command_gets_no_rejection_and_no_dispatch() {
    let fx = fixture();
    let profile =
        PolicyProfile::named("limited").with_limits(RateLimits::per_minute(1, 1));
    let session = fx.orch.create_session(session_config(profile)).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();

    fx.orch.publish_command(create_branch(session, "feature/a")).await;
    fx.orch.publish_command(create_branch(session, "feature/b")).await;

    let events = stream.take(4, WAIT).await;
    assert_eq!(
        kind_names(&events),
        vec!["session-status-changed", "command-accepted", "command-completed", "throttled"]
    );
    match &events[3].kind {
        EventKind::Throttled { scope, retry_after_ms } => {
            assert_eq!(scope, "Rate limit exceeded");
            assert!(retry_after_ms.unwrap_or(0) > 0);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    // Only the first command reached the adapter.
    assert_eq!(fx.fake.handled().len(), 1);
}

#[tokio::test]
async fn unknown_session_commands_vanish_without_state_changes() {
    let fx = fixture();
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();

    let ghost = SessionId::new();
    fx.orch.publish_command(create_branch(ghost, "feature/x")).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(fx.fake.handled().is_empty());
    // The live session saw nothing beyond its birth event.
    let events = fx.orch.session_events(&session).unwrap();
    assert_eq!(kind_names(&events), vec!["session-status-changed"]);
}

#[tokio::test]
async fn unhandled_kind_completes_no_adapter() {
    let root = tempfile::tempdir().unwrap();
    let config = OrchestratorConfig::default().with_workspace_root(root.path());
    let fake = FakeAdapter::for_kinds([CommandKind::Push]);
    let orch = Orchestrator::with_clock(
        config,
        vec![Arc::new(fake.clone()) as Arc<dyn Adapter>],
        FakeClock::new(),
    );
    let session = orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();
    let mut stream = orch.subscribe(&session).unwrap();

    orch.publish_command(run_tests(session)).await;

    let events = stream.take(3, WAIT).await;
    assert_eq!(
        kind_names(&events),
        vec!["session-status-changed", "command-accepted", "command-completed"]
    );
    let (outcome, message, _) = completed(&events[2]).unwrap();
    assert_eq!(outcome, Outcome::Failure);
    assert_eq!(message, Some("no adapter"));
    assert!(fake.handled().is_empty());
}

#[tokio::test]
async fn adapter_errors_translate_to_failed_completions() {
    let fx = fixture();
    fx.fake.behave_default(Behavior::Error("exploded".into()));
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();

    fx.orch.publish_command(run_tests(session)).await;

    let events = stream.take(3, WAIT).await;
    let (outcome, message, code) = completed(&events[2]).unwrap();
    assert_eq!(outcome, Outcome::Failure);
    assert_eq!(message, Some("exploded"));
    assert_eq!(code, Some("ADAPTER_ERROR"));
}

#[tokio::test]
async fn missing_completion_is_synthesized_as_timeout() {
    let fx = fixture();
    fx.fake.behave_default(Behavior::NoCompletion);
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();

    fx.orch.publish_command(run_tests(session)).await;

    let events = stream.take(3, WAIT).await;
    let (outcome, message, code) = completed(&events[2]).unwrap();
    assert_eq!(outcome, Outcome::Failure);
    assert_eq!(message, Some("timeout"));
    assert_eq!(code, Some("TIMEOUT"));
}

#[tokio::test]
async fn wall_clock_ceiling_interrupts_slow_adapters() {
    let fx = fixture_with(|config| config.with_wall_clock(Duration::from_millis(100)));
    fx.fake.behave_default(Behavior::Stall { duration: Duration::from_secs(30) });
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();

    fx.orch.publish_command(run_tests(session)).await;

    let events = stream.take(3, WAIT).await;
    let (outcome, message, _) = completed(&events[2]).unwrap();
    assert_eq!(outcome, Outcome::Failure);
    assert_eq!(message, Some("timeout"));
}

#[tokio::test]
async fn request_approval_is_engine_handled() {
    let fx = fixture();
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();

    fx.orch
        .publish_command(command(
            session,
            CommandIntent::RequestApproval { reason: Some("pushing soon".into()) },
        ))
        .await;

    let events = stream.take(4, WAIT).await;
    assert_eq!(
        kind_names(&events),
        vec![
            "session-status-changed",
            "command-accepted",
            "session-status-changed",
            "command-completed"
        ]
    );
    match &events[2].kind {
        EventKind::SessionStatusChanged { status, reason } => {
            assert_eq!(*status, SessionStatus::NeedsApproval);
            assert_eq!(reason.as_deref(), Some("pushing soon"));
        }
        other => panic!("unexpected event: {:?}", other),
    }
    // Never routed to an adapter.
    assert!(fx.fake.handled().is_empty());

    // Parked sessions reject commands with the status as rule.
    fx.orch.publish_command(run_tests(session)).await;
    let rejected = stream.take(1, WAIT).await;
    match &rejected[0].kind {
        EventKind::CommandRejected { policy_rule, .. } => {
            assert_eq!(policy_rule.as_deref(), Some("NeedsApproval"));
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // Approval returns the session to Running.
    fx.orch.approve_session(&session).unwrap();
    assert_eq!(fx.orch.session_status(&session).unwrap(), SessionStatus::Running);
}

#[tokio::test]
async fn tests_before_push_history_tracks_runs_and_commits() {
    let fx = fixture();
    let profile =
        PolicyProfile { require_tests_before_push: true, ..PolicyProfile::named("tested") };
    let session = fx.orch.create_session(session_config(profile)).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();
    let _birth = stream.take(1, WAIT).await;

    // No observed test success yet: push is rejected.
    fx.orch.publish_command(push(session, "feature/x")).await;
    let events = stream.take(1, WAIT).await;
    match &events[0].kind {
        EventKind::CommandRejected { policy_rule, .. } => {
            assert_eq!(policy_rule.as_deref(), Some("Tests required"));
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // A successful run-tests opens the gate.
    fx.orch.publish_command(run_tests(session)).await;
    stream.take(2, WAIT).await;
    fx.orch.publish_command(push(session, "feature/x")).await;
    let events = stream.take(2, WAIT).await;
    assert_eq!(kind_names(&events), vec!["command-accepted", "command-completed"]);

    // A commit invalidates the evidence; the next push is rejected again.
    fx.orch.publish_command(commit(session, "more work")).await;
    stream.take(2, WAIT).await;
    fx.orch.publish_command(push(session, "feature/x")).await;
    let events = stream.take(1, WAIT).await;
    assert_eq!(kind_names(&events), vec!["command-rejected"]);
}

#[tokio::test]
async fn work_item_query_events_flow_through() {
    let fx = fixture();
    fx.fake.behave(
        CommandKind::QueryBacklog,
        Behavior::Artifact(sb_core::Artifact::inline(
            sb_core::ArtifactKind::Plan,
            "backlog.json",
            "[]",
        )),
    );
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();

    fx.orch
        .publish_command(command(
            session,
            CommandIntent::QueryBacklog { filter: None, limit: None },
        ))
        .await;

    let events = stream.take(4, WAIT).await;
    assert_eq!(
        kind_names(&events),
        vec![
            "session-status-changed",
            "command-accepted",
            "artifact-available",
            "command-completed"
        ]
    );
}

#[tokio::test]
async fn accepted_commands_get_exactly_one_terminal_event() {
    let fx = fixture();
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();

    for n in 0..5 {
        fx.orch.publish_command(create_branch(session, &format!("feature/{n}"))).await;
    }
    let events = stream.take(11, WAIT).await;
    assert_eq!(events.len(), 11);

    let mut by_command: std::collections::HashMap<String, (usize, usize)> =
        std::collections::HashMap::new();
    for event in &events {
        let Some(command_id) = event.correlation.command_id else { continue };
        let entry = by_command.entry(command_id.to_string()).or_default();
        match &event.kind {
            EventKind::CommandAccepted => entry.0 += 1,
            kind if kind.is_terminal_for_command() => entry.1 += 1,
            _ => {}
        }
    }
    assert_eq!(by_command.len(), 5);
    for (command_id, (accepted, terminal)) in by_command {
        assert_eq!(accepted, 1, "{command_id} accepted count");
        assert_eq!(terminal, 1, "{command_id} terminal count");
    }
}

#[tokio::test]
async fn adapters_receive_the_published_command_verbatim() {
    let fx = fixture();
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();

    let published = run_tests(session);
    fx.orch.publish_command(published.clone()).await;
    stream.take(3, WAIT).await;

    assert_eq!(fx.fake.handled(), vec![published]);
}

#[tokio::test]
async fn throttle_clears_once_the_bucket_refills() {
    let fx = fixture();
    let profile =
        PolicyProfile::named("limited").with_limits(RateLimits::per_minute(60, 1));
    let session = fx.orch.create_session(session_config(profile)).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();
    stream.take(1, WAIT).await;

    fx.orch.publish_command(create_branch(session, "feature/a")).await;
    let events = stream.take(2, WAIT).await;
    assert_eq!(kind_names(&events), vec!["command-accepted", "command-completed"]);

    fx.orch.publish_command(create_branch(session, "feature/b")).await;
    let events = stream.take(1, WAIT).await;
    assert_eq!(kind_names(&events), vec!["throttled"]);

    // One token per second at 60/min; a two-second advance restores one.
    fx.clock.advance(Duration::from_secs(2));
    fx.orch.publish_command(create_branch(session, "feature/c")).await;
    let events = stream.take(2, WAIT).await;
    assert_eq!(kind_names(&events), vec!["command-accepted", "command-completed"]);
}

#[tokio::test]
async fn uploaded_artifacts_land_on_the_log_without_an_adapter() {
    let fx = fixture();
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();
    let mut stream = fx.orch.subscribe(&session).unwrap();

    let artifact =
        sb_core::Artifact::inline(sb_core::ArtifactKind::Plan, "plan.md", "1. fix widget");
    fx.orch
        .publish_command(command(session, CommandIntent::UploadArtifact { artifact }))
        .await;

    let events = stream.take(4, WAIT).await;
    assert_eq!(
        kind_names(&events),
        vec![
            "session-status-changed",
            "command-accepted",
            "artifact-available",
            "command-completed"
        ]
    );
    assert!(fx.fake.handled().is_empty());
}

#[tokio::test]
async fn registry_selection_defines_dispatch_order() {
    let registry = AdapterRegistry::with_defaults(RunnerConfig::default());
    let root = tempfile::tempdir().unwrap();
    let config = OrchestratorConfig::default().with_workspace_root(root.path());
    let orch = Orchestrator::from_registry(config, &registry).unwrap();
    assert_eq!(orch.adapters(), vec!["git", "command-runner", "memory"]);
}
