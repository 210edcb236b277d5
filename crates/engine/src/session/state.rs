// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared per-session runtime state.

use crate::policy::ObservedHistory;
use crate::session::log::SessionLog;
use parking_lot::Mutex;
use sb_adapters::EventSink;
use sb_core::{Correlation, EventKind, InvalidTransition, SessionConfig, SessionStatus};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// State shared between the orchestrator surface and the session worker.
pub(crate) struct SessionShared {
    pub(crate) config: Arc<SessionConfig>,
    pub(crate) workspace_path: PathBuf,
    pub(crate) log: Arc<SessionLog>,
    pub(crate) span: tracing::Span,
    pub(crate) cancel: CancellationToken,
    status: Mutex<SessionStatus>,
    tests_passed: Mutex<bool>,
    pending_approval: AtomicBool,
}

impl SessionShared {
    pub(crate) fn new(config: Arc<SessionConfig>, workspace_path: PathBuf) -> Self {
        let span = tracing::info_span!("session", id = %config.session_id);
        let log = Arc::new(SessionLog::new(config.session_id));
        Self {
            config,
            workspace_path,
            log,
            span,
            cancel: CancellationToken::new(),
            status: Mutex::new(SessionStatus::Running),
            tests_passed: Mutex::new(false),
            pending_approval: AtomicBool::new(false),
        }
    }

    pub(crate) fn status(&self) -> SessionStatus {
        *self.status.lock()
    }

    /// Apply a status transition and emit `session-status-changed`.
    ///
    /// The status lock is held across the append so transition order and
    /// log order agree.
    pub(crate) fn transition(
        &self,
        to: SessionStatus,
        reason: Option<String>,
    ) -> Result<(), InvalidTransition> {
        let mut status = self.status.lock();
        status.check_transition(to)?;
        *status = to;
        self.log.emit(
            EventKind::SessionStatusChanged { status: to, reason },
            Correlation::session(self.config.session_id),
        );
        Ok(())
    }

    /// Emit the initial `session-status-changed(Running)` announcement.
    pub(crate) fn announce_running(&self) {
        self.log.emit(
            EventKind::SessionStatusChanged { status: SessionStatus::Running, reason: None },
            Correlation::session(self.config.session_id),
        );
    }

    pub(crate) fn observed_history(&self) -> ObservedHistory {
        ObservedHistory {
            tests_passed_since_commit: *self.tests_passed.lock(),
            approved: self.pending_approval.load(Ordering::SeqCst),
        }
    }

    pub(crate) fn note_tests_passed(&self) {
        *self.tests_passed.lock() = true;
    }

    /// A landed commit invalidates earlier test evidence.
    pub(crate) fn note_commit(&self) {
        *self.tests_passed.lock() = false;
    }

    pub(crate) fn set_approved(&self) {
        self.pending_approval.store(true, Ordering::SeqCst);
    }
}
