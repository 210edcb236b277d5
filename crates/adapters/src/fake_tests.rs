// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::SessionContext;
use sb_core::{CommandIntent, LivePolicy, Outcome, PolicyProfile, RepoRef, SessionConfig};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

fn command(intent: CommandIntent, config: &SessionConfig) -> Command {
    Command::new(Correlation::session(config.session_id), intent)
}

fn context(sink: Arc<RecordingSink>, config: Arc<SessionConfig>, cmd: &Command) -> SessionContext {
    SessionContext::new(
        sink,
        config,
        PathBuf::from("/tmp/ws"),
        LivePolicy::default(),
        tracing::Span::none(),
        CancellationToken::new(),
        cmd,
    )
}

fn config() -> Arc<SessionConfig> {
    Arc::new(SessionConfig::new(PolicyProfile::named("p"), RepoRef::new("r", "/tmp/r")))
}

#[tokio::test]
async fn succeeds_and_records_by_default() {
    let fake = FakeAdapter::new();
    let config = config();
    let cmd = command(CommandIntent::RunTests { selector: None, timeout_ms: None }, &config);
    let sink = Arc::new(RecordingSink::new());
    let ctx = context(sink.clone(), config, &cmd);

    fake.handle(&cmd, &ctx).await.unwrap();

    assert_eq!(fake.handled_kinds(), vec![sb_core::CommandKind::RunTests]);
    assert_eq!(sink.kind_names(), vec!["command-completed"]);
    assert_eq!(ctx.outcome(), Some(Outcome::Success));
}

#[tokio::test]
async fn kind_filter_limits_can_handle() {
    let fake = FakeAdapter::for_kinds([sb_core::CommandKind::Push]);
    let config = config();
    let push = command(
        CommandIntent::Push { repo: RepoRef::new("r", "/tmp/r"), branch: "main".into(), set_upstream: false },
        &config,
    );
    let tests = command(CommandIntent::RunTests { selector: None, timeout_ms: None }, &config);

    assert!(fake.can_handle(&push));
    assert!(!fake.can_handle(&tests));
}

#[tokio::test]
async fn scripted_failure_carries_code() {
    let fake = FakeAdapter::new();
    fake.behave(
        sb_core::CommandKind::Push,
        Behavior::Fail { message: "remote rejected".into(), code: Some("AUTH_ERROR".into()) },
    );
    let config = config();
    let cmd = command(
        CommandIntent::Push { repo: RepoRef::new("r", "/tmp/r"), branch: "main".into(), set_upstream: false },
        &config,
    );
    let sink = Arc::new(RecordingSink::new());
    let ctx = context(sink.clone(), config, &cmd);

    fake.handle(&cmd, &ctx).await.unwrap();

    match &sink.events()[0].0 {
        EventKind::CommandCompleted { outcome, message, error_code } => {
            assert_eq!(*outcome, Outcome::Failure);
            assert_eq!(message.as_deref(), Some("remote rejected"));
            assert_eq!(error_code.as_deref(), Some("AUTH_ERROR"));
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn conflict_behavior_emits_conflict_then_failure() {
    let fake = FakeAdapter::new();
    fake.behave(
        sb_core::CommandKind::ApplyPatch,
        Behavior::Conflict { details: "hunk mismatch".into() },
    );
    let config = config();
    let cmd = command(
        CommandIntent::ApplyPatch { repo: RepoRef::new("r", "/tmp/r"), patch: "diff".into() },
        &config,
    );
    let sink = Arc::new(RecordingSink::new());
    let ctx = context(sink.clone(), config, &cmd);

    fake.handle(&cmd, &ctx).await.unwrap();
    assert_eq!(sink.kind_names(), vec!["conflict-detected", "command-completed"]);
}

#[tokio::test]
async fn hang_behavior_completes_cancelled_on_cancellation() {
    let fake = FakeAdapter::new();
    fake.behave_default(Behavior::Hang);
    let config = config();
    let cmd = command(CommandIntent::RunTests { selector: None, timeout_ms: None }, &config);
    let sink = Arc::new(RecordingSink::new());
    let token = CancellationToken::new();
    let ctx = Arc::new(SessionContext::new(
        sink.clone(),
        config,
        PathBuf::from("/tmp/ws"),
        LivePolicy::default(),
        tracing::Span::none(),
        token.clone(),
        &cmd,
    ));

    let task = tokio::spawn({
        let fake = fake.clone();
        let cmd = cmd.clone();
        let ctx = ctx.clone();
        async move { fake.handle(&cmd, &ctx).await }
    });

    token.cancel();
    task.await.unwrap().unwrap();

    assert_eq!(ctx.outcome(), Some(Outcome::Failure));
    assert_eq!(sink.kind_names(), vec!["command-completed"]);
}

#[tokio::test]
async fn stall_behavior_succeeds_when_not_cancelled() {
    let fake = FakeAdapter::new();
    fake.behave_default(Behavior::Stall { duration: std::time::Duration::from_millis(5) });
    let config = config();
    let cmd = command(CommandIntent::RunTests { selector: None, timeout_ms: None }, &config);
    let sink = Arc::new(RecordingSink::new());
    let ctx = context(sink.clone(), config, &cmd);

    fake.handle(&cmd, &ctx).await.unwrap();
    assert_eq!(ctx.outcome(), Some(Outcome::Success));
}

#[tokio::test]
async fn no_completion_behavior_leaves_context_incomplete() {
    let fake = FakeAdapter::new();
    fake.behave_default(Behavior::NoCompletion);
    let config = config();
    let cmd = command(CommandIntent::RunTests { selector: None, timeout_ms: None }, &config);
    let sink = Arc::new(RecordingSink::new());
    let ctx = context(sink.clone(), config, &cmd);

    fake.handle(&cmd, &ctx).await.unwrap();
    assert!(!ctx.completed());
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn error_behavior_returns_the_error() {
    let fake = FakeAdapter::new();
    fake.behave_default(Behavior::Error("exploded".into()));
    let config = config();
    let cmd = command(CommandIntent::RunTests { selector: None, timeout_ms: None }, &config);
    let sink = Arc::new(RecordingSink::new());
    let ctx = context(sink.clone(), config, &cmd);

    let err = fake.handle(&cmd, &ctx).await.unwrap_err();
    assert_eq!(err.code(), "ADAPTER_ERROR");
    assert!(!ctx.completed());
}
