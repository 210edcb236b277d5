// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-manager tests: pipeline, subscription, lifecycle.

use super::*;
use crate::config::OrchestratorConfig;
use sb_adapters::{Behavior, FakeAdapter};
use sb_core::{
    Command, CommandIntent, Correlation, Event, EventKind, FakeClock, PolicyProfile, RepoRef,
};
use std::time::Duration;

mod lifecycle;
mod pipeline;
mod subscribe;

const WAIT: Duration = Duration::from_secs(2);

/// Opt-in test logging: `RUST_LOG=sb_engine=debug cargo test`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

pub(crate) struct Fixture {
    pub orch: Orchestrator<FakeClock>,
    pub fake: FakeAdapter,
    pub clock: FakeClock,
    _root: tempfile::TempDir,
}

pub(crate) fn fixture() -> Fixture {
    fixture_with(|config| config)
}

pub(crate) fn fixture_with(
    tune: impl FnOnce(OrchestratorConfig) -> OrchestratorConfig,
) -> Fixture {
    init_tracing();
    let root = tempfile::tempdir().unwrap();
    let config = tune(
        OrchestratorConfig::default()
            .with_workspace_root(root.path())
            .with_wall_clock(Duration::from_millis(250)),
    );
    let clock = FakeClock::new();
    let fake = FakeAdapter::new();
    let orch =
        Orchestrator::with_clock(config, vec![Arc::new(fake.clone()) as Arc<dyn Adapter>], clock.clone());
    Fixture { orch, fake, clock, _root: root }
}

pub(crate) fn session_config(profile: PolicyProfile) -> SessionConfig {
    SessionConfig::new(profile, RepoRef::new("demo", "/tmp/demo"))
}

pub(crate) fn command(session: SessionId, intent: CommandIntent) -> Command {
    Command::new(Correlation::session(session).with_issuer("executor"), intent)
}

pub(crate) fn create_branch(session: SessionId, branch: &str) -> Command {
    command(
        session,
        CommandIntent::CreateBranch {
            repo: RepoRef::new("demo", "/tmp/demo"),
            branch: branch.to_string(),
            start_point: None,
        },
    )
}

pub(crate) fn run_tests(session: SessionId) -> Command {
    command(session, CommandIntent::RunTests { selector: None, timeout_ms: None })
}

pub(crate) fn push(session: SessionId, branch: &str) -> Command {
    command(
        session,
        CommandIntent::Push {
            repo: RepoRef::new("demo", "/tmp/demo"),
            branch: branch.to_string(),
            set_upstream: false,
        },
    )
}

pub(crate) fn commit(session: SessionId, message: &str) -> Command {
    command(
        session,
        CommandIntent::Commit {
            repo: RepoRef::new("demo", "/tmp/demo"),
            message: message.to_string(),
            include_paths: vec![],
            branch: None,
        },
    )
}

pub(crate) fn kind_names(events: &[Event]) -> Vec<&'static str> {
    events.iter().map(Event::kind_name).collect()
}
