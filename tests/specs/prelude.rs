// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the scenario specs.

use sb_adapters::{Adapter, FakeAdapter};
use sb_core::{
    Command, CommandIntent, Correlation, Event, FakeClock, PolicyProfile, RepoRef, SessionConfig,
    SessionId,
};
use sb_engine::{Orchestrator, OrchestratorConfig};
use std::sync::Arc;
use std::time::Duration;

pub const WAIT: Duration = Duration::from_secs(2);

pub struct World {
    pub orch: Orchestrator<FakeClock>,
    pub fake: FakeAdapter,
    pub clock: FakeClock,
    _root: tempfile::TempDir,
}

pub fn world() -> World {
    world_with(|config| config)
}

pub fn world_with(tune: impl FnOnce(OrchestratorConfig) -> OrchestratorConfig) -> World {
    let root = tempfile::tempdir().expect("temp workspace root");
    let config = tune(OrchestratorConfig::default().with_workspace_root(root.path()));
    let clock = FakeClock::new();
    let fake = FakeAdapter::new();
    let orch = Orchestrator::with_clock(
        config,
        vec![Arc::new(fake.clone()) as Arc<dyn Adapter>],
        clock.clone(),
    );
    World { orch, fake, clock, _root: root }
}

/// Profile for the happy-path scenarios: no lists, `main` protected, no
/// limits.
pub fn open_profile() -> PolicyProfile {
    PolicyProfile::named("open").with_protected_branches(["main"])
}

pub fn session(profile: PolicyProfile) -> SessionConfig {
    SessionConfig::new(profile, RepoRef::new("demo", "/tmp/demo"))
}

pub fn create_branch(session: SessionId, branch: &str) -> Command {
    Command::new(
        Correlation::session(session).with_issuer("executor"),
        CommandIntent::CreateBranch {
            repo: RepoRef::new("demo", "/tmp/demo"),
            branch: branch.to_string(),
            start_point: None,
        },
    )
}

pub fn kinds(events: &[Event]) -> Vec<&'static str> {
    events.iter().map(Event::kind_name).collect()
}
