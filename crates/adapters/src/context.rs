// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-command handle adapters use to talk to the orchestrator.
//!
//! The context is the only surface an adapter gets: event emission
//! (correlated to the in-flight command), read access to the session's
//! config and workspace, a per-session tracing span, and a cancellation
//! token. Contexts are per-command and must not outlive `handle`.

use crate::EventSink;
use parking_lot::Mutex;
use sb_core::{
    Artifact, Command, Correlation, EventKind, LivePolicy, Outcome, PolicyProfile, RepoRef,
    SessionConfig, WorkItemRef,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct SessionContext {
    sink: Arc<dyn EventSink>,
    reply: Correlation,
    config: Arc<SessionConfig>,
    workspace_path: PathBuf,
    live: LivePolicy,
    span: tracing::Span,
    cancel: CancellationToken,
    terminal: Mutex<Option<Outcome>>,
}

impl SessionContext {
    pub fn new(
        sink: Arc<dyn EventSink>,
        config: Arc<SessionConfig>,
        workspace_path: PathBuf,
        live: LivePolicy,
        span: tracing::Span,
        cancel: CancellationToken,
        command: &Command,
    ) -> Self {
        Self {
            sink,
            reply: Correlation::reply_to(command),
            config,
            workspace_path,
            live,
            span,
            cancel,
            terminal: Mutex::new(None),
        }
    }

    /// Append an event to the session log, correlated to the in-flight
    /// command.
    pub fn emit(&self, kind: EventKind) {
        if let EventKind::CommandCompleted { outcome, .. } = &kind {
            *self.terminal.lock() = Some(*outcome);
        }
        self.sink.emit(kind, self.reply.clone());
    }

    pub fn complete_success(&self) {
        self.emit(EventKind::success());
    }

    pub fn complete_success_with(&self, message: impl Into<String>) {
        self.emit(EventKind::CommandCompleted {
            outcome: Outcome::Success,
            message: Some(message.into()),
            error_code: None,
        });
    }

    pub fn complete_failure(&self, message: impl Into<String>, error_code: Option<&str>) {
        self.emit(EventKind::CommandCompleted {
            outcome: Outcome::Failure,
            message: Some(message.into()),
            error_code: error_code.map(str::to_string),
        });
    }

    pub fn artifact(&self, artifact: Artifact) {
        self.emit(EventKind::ArtifactAvailable { artifact });
    }

    /// Report a merge/apply conflict against the session repository.
    pub fn conflict(&self, details: impl Into<String>, patch: Option<String>) {
        self.emit(EventKind::ConflictDetected {
            repo: self.repo().clone(),
            details: details.into(),
            patch,
        });
    }

    pub fn workspace_path(&self) -> &Path {
        &self.workspace_path
    }

    pub fn repo(&self) -> &RepoRef {
        &self.config.repo
    }

    pub fn work_item(&self) -> Option<&WorkItemRef> {
        self.config.work_item.as_ref()
    }

    pub fn policy(&self) -> &PolicyProfile {
        &self.config.policy
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn live(&self) -> &LivePolicy {
        &self.live
    }

    /// Per-session tracing span; enter it for handler-side logging.
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// Cancelled when the session aborts or the command's wall clock
    /// expires. Long-running handlers should select on it and complete
    /// with `failure, "cancelled"`.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether a terminal completion was emitted for this command.
    pub fn completed(&self) -> bool {
        self.terminal.lock().is_some()
    }

    /// The completion outcome, once one was emitted.
    pub fn outcome(&self) -> Option<Outcome> {
        *self.terminal.lock()
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
