// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session manager: lifecycle, command pipeline, event subscription.

mod log;
mod state;
mod worker;

pub use log::{EventStream, SubscribeFrom};

use crate::claims::ClaimManager;
use crate::config::OrchestratorConfig;
use crate::error::OrchestratorError;
use crate::rate_limit::RateLimiter;
use crate::session::state::SessionShared;
use crate::session::worker::SessionWorker;
use crate::workspace::WorkspaceProvider;
use parking_lot::RwLock;
use sb_adapters::{Adapter, AdapterRegistry};
use sb_core::{Clock, Command, Event, SessionConfig, SessionId, SessionStatus, SystemClock};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Depth of each session's inbound command queue.
const COMMAND_QUEUE_DEPTH: usize = 64;

/// Background sweep cadence for expired claims.
const JANITOR_INTERVAL: Duration = Duration::from_secs(30);

struct SessionHandle {
    tx: mpsc::Sender<Command>,
    shared: Arc<SessionShared>,
}

/// The orchestrator: session registry, admission gates, adapter dispatch,
/// claim manager, and workspace provider under one roof.
///
/// One instance per process is the expected deployment; instances are
/// fully isolated, so tests run many side by side.
pub struct Orchestrator<C: Clock + 'static = SystemClock> {
    config: OrchestratorConfig,
    clock: C,
    adapters: Arc<Vec<Arc<dyn Adapter>>>,
    workspaces: WorkspaceProvider,
    limiter: Arc<RateLimiter<C>>,
    claims: Arc<ClaimManager<C>>,
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
    shutdown: CancellationToken,
    janitor_started: AtomicBool,
}

impl Orchestrator<SystemClock> {
    /// Orchestrator on the system clock. Adapters are registered here,
    /// once; their order defines dispatch priority.
    pub fn new(config: OrchestratorConfig, adapters: Vec<Arc<dyn Adapter>>) -> Self {
        Self::with_clock(config, adapters, SystemClock)
    }

    /// Resolve the config's adapter selection through a registry.
    pub fn from_registry(
        config: OrchestratorConfig,
        registry: &AdapterRegistry,
    ) -> Result<Self, OrchestratorError> {
        let adapters = registry
            .select(&config.adapters)
            .map_err(|e| OrchestratorError::Config(e.to_string()))?;
        Ok(Self::new(config, adapters))
    }
}

impl<C: Clock + 'static> Orchestrator<C> {
    pub fn with_clock(
        config: OrchestratorConfig,
        adapters: Vec<Arc<dyn Adapter>>,
        clock: C,
    ) -> Self {
        let workspaces = WorkspaceProvider::new(config.workspace_root.clone());
        let limiter = Arc::new(RateLimiter::new(&config.global_limits, clock.clone()));
        let claims = Arc::new(ClaimManager::new(config.claims.clone(), clock.clone()));
        Self {
            config,
            clock,
            adapters: Arc::new(adapters),
            workspaces,
            limiter,
            claims,
            sessions: RwLock::new(HashMap::new()),
            shutdown: CancellationToken::new(),
            janitor_started: AtomicBool::new(false),
        }
    }

    /// Registered adapter names in dispatch-priority order.
    pub fn adapters(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn claims(&self) -> &ClaimManager<C> {
        &self.claims
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Create a session: provision its workspace, start its worker, and
    /// emit `session-status-changed(Running)` as the first log event.
    pub async fn create_session(
        &self,
        config: SessionConfig,
    ) -> Result<SessionId, OrchestratorError> {
        let session_id = config.session_id;
        if self.sessions.read().contains_key(&session_id) {
            return Err(OrchestratorError::SessionExists(session_id));
        }

        let workspace_path = self.workspaces.provision(&config)?;
        let shared = Arc::new(SessionShared::new(Arc::new(config), workspace_path));
        shared.announce_running();

        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let worker = SessionWorker::new(
            shared.clone(),
            Arc::clone(&self.adapters),
            Arc::clone(&self.limiter),
            self.config.live,
            self.config.command_wall_clock(),
        );
        tokio::spawn(worker.run(rx));

        {
            let mut sessions = self.sessions.write();
            if sessions.contains_key(&session_id) {
                // Lost a create race; undo the provisioning.
                self.workspaces.release(&session_id);
                return Err(OrchestratorError::SessionExists(session_id));
            }
            sessions.insert(session_id, SessionHandle { tx, shared });
        }

        self.start_janitor();
        tracing::info!(session = %session_id, "session created");
        Ok(session_id)
    }

    /// Queue a command for its session. Commands for unknown sessions are
    /// dropped with a warning; they never reach an adapter and produce no
    /// events. All command outcomes surface on the session log.
    pub async fn publish_command(&self, command: Command) {
        let session_id = command.correlation.session_id;
        let tx = self.sessions.read().get(&session_id).map(|handle| handle.tx.clone());
        match tx {
            None => {
                tracing::warn!(
                    session = %session_id,
                    kind = %command.kind(),
                    "dropping command for unknown session"
                );
            }
            Some(tx) => {
                if tx.send(command).await.is_err() {
                    tracing::warn!(session = %session_id, "session worker gone");
                }
            }
        }
    }

    /// Subscribe from birth: replay the whole log, then stream live.
    pub fn subscribe(&self, session_id: &SessionId) -> Result<EventStream, OrchestratorError> {
        self.subscribe_from(session_id, SubscribeFrom::Birth)
    }

    pub fn subscribe_from(
        &self,
        session_id: &SessionId,
        from: SubscribeFrom,
    ) -> Result<EventStream, OrchestratorError> {
        let shared = self.session_shared(session_id)?;
        Ok(log::subscribe(shared.log.clone(), from, self.config.subscriber_buffer))
    }

    pub fn pause_session(&self, session_id: &SessionId) -> Result<(), OrchestratorError> {
        let shared = self.session_shared(session_id)?;
        shared.transition(SessionStatus::Paused, None)?;
        Ok(())
    }

    pub fn resume_session(&self, session_id: &SessionId) -> Result<(), OrchestratorError> {
        let shared = self.session_shared(session_id)?;
        shared.transition(SessionStatus::Running, None)?;
        Ok(())
    }

    /// Set the session's approval flag; a session parked in NeedsApproval
    /// returns to Running.
    pub fn approve_session(&self, session_id: &SessionId) -> Result<(), OrchestratorError> {
        let shared = self.session_shared(session_id)?;
        shared.set_approved();
        if shared.status() == SessionStatus::NeedsApproval {
            shared.transition(SessionStatus::Running, Some("approved".to_string()))?;
        }
        Ok(())
    }

    pub fn complete_session(&self, session_id: &SessionId) -> Result<(), OrchestratorError> {
        let shared = self.session_shared(session_id)?;
        shared.transition(SessionStatus::Completed, None)?;
        self.teardown(session_id);
        Ok(())
    }

    /// Abort: cancels in-flight adapter work via the session token, then
    /// tears down.
    pub fn abort_session(&self, session_id: &SessionId) -> Result<(), OrchestratorError> {
        let shared = self.session_shared(session_id)?;
        shared.transition(SessionStatus::Aborted, None)?;
        shared.cancel.cancel();
        self.teardown(session_id);
        Ok(())
    }

    pub fn session_status(&self, session_id: &SessionId) -> Result<SessionStatus, OrchestratorError> {
        Ok(self.session_shared(session_id)?.status())
    }

    /// Snapshot of the session's event log.
    pub fn session_events(&self, session_id: &SessionId) -> Result<Vec<Event>, OrchestratorError> {
        Ok(self.session_shared(session_id)?.log.snapshot())
    }

    pub fn workspace_path(&self, session_id: &SessionId) -> Option<PathBuf> {
        self.workspaces.path_for(session_id)
    }

    fn session_shared(
        &self,
        session_id: &SessionId,
    ) -> Result<Arc<SessionShared>, OrchestratorError> {
        self.sessions
            .read()
            .get(session_id)
            .map(|handle| Arc::clone(&handle.shared))
            .ok_or(OrchestratorError::SessionNotFound(*session_id))
    }

    /// Release the workspace and the session's claims. The log stays
    /// subscribable; later commands are rejected with the terminal status.
    fn teardown(&self, session_id: &SessionId) {
        self.workspaces.release(session_id);
        let released = self.claims.release_session(session_id);
        tracing::info!(session = %session_id, claims_released = released.len(), "session torn down");
    }

    fn start_janitor(&self) {
        if !self.config.claims.auto_release_on_inactivity {
            return;
        }
        if self.janitor_started.swap(true, Ordering::SeqCst) {
            return;
        }
        let claims = Arc::clone(&self.claims);
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(JANITOR_INTERVAL);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tick.tick() => {
                        for claim in claims.cleanup_expired() {
                            tracing::debug!(
                                work_item = %claim.work_item.id,
                                assignee = %claim.assignee,
                                "expired claim swept"
                            );
                        }
                    }
                }
            }
        });
    }
}

impl<C: Clock + 'static> Drop for Orchestrator<C> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
#[path = "../session_tests/mod.rs"]
mod tests;
