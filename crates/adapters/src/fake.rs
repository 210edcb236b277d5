// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted adapter and recording sink for tests.

use crate::{Adapter, AdapterError, SessionContext};
use async_trait::async_trait;
use parking_lot::Mutex;
use sb_core::{Artifact, Command, CommandKind, Correlation, EventKind};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// What [`FakeAdapter`] does with a handled command.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Emit `command-completed(success)`.
    Succeed,
    /// Emit an artifact, then succeed.
    Artifact(Artifact),
    /// Emit `command-completed(failure, message, code)`.
    Fail { message: String, code: Option<String> },
    /// Emit `conflict-detected`, then fail with "conflict".
    Conflict { details: String },
    /// Sleep, then succeed; completes with "cancelled" if cancelled first.
    Stall { duration: Duration },
    /// Wait for cancellation, then complete with "cancelled".
    Hang,
    /// Return without emitting any completion.
    NoCompletion,
    /// Return the given error without emitting anything.
    Error(String),
}

#[derive(Debug)]
struct FakeInner {
    kinds: Option<HashSet<CommandKind>>,
    default_behavior: Mutex<Behavior>,
    behaviors: Mutex<HashMap<CommandKind, Behavior>>,
    handled: Mutex<Vec<Command>>,
}

/// Recording adapter with scripted per-kind behavior.
///
/// Clones share state, so tests can keep a handle for assertions after
/// registering a clone with the orchestrator.
#[derive(Debug, Clone)]
pub struct FakeAdapter {
    inner: Arc<FakeInner>,
}

impl FakeAdapter {
    /// Handles every command kind, succeeding by default.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FakeInner {
                kinds: None,
                default_behavior: Mutex::new(Behavior::Succeed),
                behaviors: Mutex::new(HashMap::new()),
                handled: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Handles only the given kinds.
    pub fn for_kinds(kinds: impl IntoIterator<Item = CommandKind>) -> Self {
        Self {
            inner: Arc::new(FakeInner {
                kinds: Some(kinds.into_iter().collect()),
                default_behavior: Mutex::new(Behavior::Succeed),
                behaviors: Mutex::new(HashMap::new()),
                handled: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Script the behavior for one command kind.
    pub fn behave(&self, kind: CommandKind, behavior: Behavior) {
        self.inner.behaviors.lock().insert(kind, behavior);
    }

    /// Script the behavior for kinds without a specific script.
    pub fn behave_default(&self, behavior: Behavior) {
        *self.inner.default_behavior.lock() = behavior;
    }

    /// Commands handled so far, in order.
    pub fn handled(&self) -> Vec<Command> {
        self.inner.handled.lock().clone()
    }

    pub fn handled_kinds(&self) -> Vec<CommandKind> {
        self.inner.handled.lock().iter().map(Command::kind).collect()
    }

    fn behavior_for(&self, kind: CommandKind) -> Behavior {
        self.inner
            .behaviors
            .lock()
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| self.inner.default_behavior.lock().clone())
    }
}

impl Default for FakeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for FakeAdapter {
    fn name(&self) -> &str {
        "fake"
    }

    fn can_handle(&self, command: &Command) -> bool {
        match &self.inner.kinds {
            Some(kinds) => kinds.contains(&command.kind()),
            None => true,
        }
    }

    async fn handle(&self, command: &Command, ctx: &SessionContext) -> Result<(), AdapterError> {
        self.inner.handled.lock().push(command.clone());
        match self.behavior_for(command.kind()) {
            Behavior::Succeed => ctx.complete_success(),
            Behavior::Artifact(artifact) => {
                ctx.artifact(artifact);
                ctx.complete_success();
            }
            Behavior::Fail { message, code } => {
                ctx.complete_failure(message, code.as_deref());
            }
            Behavior::Conflict { details } => {
                ctx.conflict(details, None);
                ctx.complete_failure("conflict", Some("CONFLICT"));
            }
            Behavior::Stall { duration } => {
                tokio::select! {
                    _ = tokio::time::sleep(duration) => ctx.complete_success(),
                    _ = ctx.cancellation().cancelled() => {
                        ctx.complete_failure("cancelled", Some("CANCELLED"));
                    }
                }
            }
            Behavior::Hang => {
                ctx.cancellation().cancelled().await;
                ctx.complete_failure("cancelled", Some("CANCELLED"));
            }
            Behavior::NoCompletion => {}
            Behavior::Error(message) => return Err(AdapterError::Other(message)),
        }
        Ok(())
    }
}

/// [`crate::EventSink`] that records emissions for assertions.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(EventKind, Correlation)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(EventKind, Correlation)> {
        self.events.lock().clone()
    }

    pub fn kind_names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|(kind, _)| kind.name()).collect()
    }
}

impl crate::EventSink for RecordingSink {
    fn emit(&self, kind: EventKind, correlation: Correlation) {
        self.events.lock().push((kind, correlation));
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
