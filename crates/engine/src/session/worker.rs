// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-session worker: gate, dispatch, emit.
//!
//! One worker per session serializes that session's command pipeline;
//! workers for different sessions run concurrently. No outcome of a
//! command ever propagates as an error to the publisher; everything lands
//! on the session log.

use crate::policy::{self, PolicyDecision};
use crate::rate_limit::{RateDecision, RateLimiter};
use crate::session::state::SessionShared;
use sb_adapters::{Adapter, EventSink, SessionContext};
use sb_core::{
    Clock, Command, CommandIntent, CommandKind, Correlation, EventKind, LivePolicy, Outcome,
    SessionStatus,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Instrument;

pub(crate) struct SessionWorker<C: Clock> {
    shared: Arc<SessionShared>,
    adapters: Arc<Vec<Arc<dyn Adapter>>>,
    limiter: Arc<RateLimiter<C>>,
    live: LivePolicy,
    wall_clock: Duration,
}

impl<C: Clock + 'static> SessionWorker<C> {
    pub(crate) fn new(
        shared: Arc<SessionShared>,
        adapters: Arc<Vec<Arc<dyn Adapter>>>,
        limiter: Arc<RateLimiter<C>>,
        live: LivePolicy,
        wall_clock: Duration,
    ) -> Self {
        Self { shared, adapters, limiter, live, wall_clock }
    }

    pub(crate) async fn run(self, mut rx: mpsc::Receiver<Command>) {
        let span = self.shared.span.clone();
        async {
            while let Some(command) = rx.recv().await {
                self.process(command).await;
            }
            tracing::debug!("session worker stopped");
        }
        .instrument(span)
        .await
    }

    async fn process(&self, command: Command) {
        let kind = command.kind();
        let reply = Correlation::reply_to(&command);
        let shared = &self.shared;

        // Only Running sessions accept commands.
        let status = shared.status();
        if status != SessionStatus::Running {
            shared.log.emit(
                EventKind::CommandRejected {
                    reason: "Session not accepting commands".to_string(),
                    policy_rule: Some(status.to_string()),
                },
                reply,
            );
            return;
        }

        match policy::enforce(&command, &shared.config.policy, shared.observed_history()) {
            PolicyDecision::Reject { reason, rule } => {
                tracing::info!(kind = %kind, rule, "command rejected by policy");
                shared.log.emit(
                    EventKind::CommandRejected {
                        reason: reason.to_string(),
                        policy_rule: Some(rule.to_string()),
                    },
                    reply,
                );
                return;
            }
            PolicyDecision::Allow => {}
        }

        match self.limiter.check(
            &shared.config.session_id,
            kind,
            shared.config.policy.limits.as_ref(),
        ) {
            RateDecision::Throttle { scope, retry_after } => {
                tracing::info!(kind = %kind, scope = ?scope, "command throttled");
                shared.log.emit(
                    EventKind::Throttled {
                        scope: scope.message().to_string(),
                        retry_after_ms: retry_after.map(|d| d.as_millis() as u64),
                    },
                    reply,
                );
                return;
            }
            RateDecision::Allow => {}
        }

        shared.log.emit(EventKind::CommandAccepted, reply.clone());

        // Artifact uploads target the session log itself; no adapter
        // involved.
        if let CommandIntent::UploadArtifact { artifact } = &command.intent {
            shared.log.emit(EventKind::ArtifactAvailable { artifact: artifact.clone() }, reply.clone());
            shared.log.emit(
                EventKind::CommandCompleted {
                    outcome: Outcome::Success,
                    message: Some("artifact recorded".to_string()),
                    error_code: None,
                },
                reply,
            );
            return;
        }

        // Approval requests are the orchestrator's own business, not an
        // adapter's.
        if let CommandIntent::RequestApproval { reason } = &command.intent {
            match shared.transition(SessionStatus::NeedsApproval, reason.clone()) {
                Ok(()) => shared.log.emit(
                    EventKind::CommandCompleted {
                        outcome: Outcome::Success,
                        message: Some("approval requested".to_string()),
                        error_code: None,
                    },
                    reply,
                ),
                Err(e) => shared.log.emit(EventKind::failure(e.to_string()), reply),
            }
            return;
        }

        let Some(adapter) = self.adapters.iter().find(|a| a.can_handle(&command)) else {
            shared.log.emit(EventKind::failure("no adapter"), reply);
            return;
        };

        let ctx = SessionContext::new(
            shared.log.clone() as Arc<dyn EventSink>,
            shared.config.clone(),
            shared.workspace_path.clone(),
            self.live,
            shared.span.clone(),
            shared.cancel.child_token(),
            &command,
        );

        match tokio::time::timeout(self.wall_clock, adapter.handle(&command, &ctx)).await {
            Err(_elapsed) => {
                // Wall clock expired with the handler still running. Stop
                // any stragglers it spawned, then report the timeout.
                ctx.cancellation().cancel();
                if !ctx.completed() {
                    ctx.complete_failure("timeout", Some("TIMEOUT"));
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(adapter = adapter.name(), kind = %kind, error = %e, "adapter error");
                if !ctx.completed() {
                    ctx.complete_failure(e.to_string(), Some(e.code()));
                }
            }
            Ok(Ok(())) => {
                // The adapter cannot complete after returning, so a
                // missing completion is already final.
                if !ctx.completed() {
                    ctx.complete_failure("timeout", Some("TIMEOUT"));
                }
            }
        }

        if ctx.outcome() == Some(Outcome::Success) {
            match kind {
                CommandKind::RunTests => shared.note_tests_passed(),
                CommandKind::Commit => shared.note_commit(),
                _ => {}
            }
        }
    }
}
