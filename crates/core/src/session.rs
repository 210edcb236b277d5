// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identity, status machine, and configuration.
//!
//! A session is an isolated unit of work with its own workspace, policy,
//! event log, and subscribers. Its status gates command admission: only
//! `Running` sessions accept commands.

use crate::correlation::PlanNodeId;
use crate::policy::PolicyProfile;
use crate::refs::{RepoRef, WorkItemRef, WorkspaceRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

crate::define_id! {
    /// Unique identifier for an orchestrated session.
    pub struct SessionId("ses-");
}

/// Lifecycle status of a session.
///
/// `Completed` and `Aborted` are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Running,
    Paused,
    NeedsApproval,
    Error,
    Completed,
    Aborted,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Aborted)
    }

    /// Whether the status machine admits `self -> to`.
    pub fn can_transition(self, to: SessionStatus) -> bool {
        use SessionStatus::*;
        if self.is_terminal() || self == to {
            return false;
        }
        match (self, to) {
            (Running, Paused | NeedsApproval | Completed) => true,
            (Paused, Running | NeedsApproval) => true,
            (NeedsApproval, Running) => true,
            (_, Aborted) => true,
            (_, Error) => true,
            _ => false,
        }
    }

    pub fn check_transition(self, to: SessionStatus) -> Result<(), InvalidTransition> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(InvalidTransition { from: self, to })
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Running => "Running",
            SessionStatus::Paused => "Paused",
            SessionStatus::NeedsApproval => "NeedsApproval",
            SessionStatus::Error => "Error",
            SessionStatus::Completed => "Completed",
            SessionStatus::Aborted => "Aborted",
        };
        write!(f, "{name}")
    }
}

/// A status transition the machine does not admit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid session transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: SessionStatus,
    pub to: SessionStatus,
}

/// Everything needed to create a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_node_id: Option<PlanNodeId>,
    pub policy: PolicyProfile,
    pub repo: RepoRef,
    /// Blank path: the workspace provider allocates a fresh directory.
    #[serde(default)]
    pub workspace: WorkspaceRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_item: Option<WorkItemRef>,
    /// Name of the agent profile driving this session.
    pub agent_profile: String,
}

impl SessionConfig {
    pub fn new(policy: PolicyProfile, repo: RepoRef) -> Self {
        Self {
            session_id: SessionId::new(),
            parent_session_id: None,
            plan_node_id: None,
            policy,
            repo,
            workspace: WorkspaceRef::default(),
            work_item: None,
            agent_profile: "executor".to_string(),
        }
    }

    pub fn with_workspace(mut self, workspace: WorkspaceRef) -> Self {
        self.workspace = workspace;
        self
    }

    pub fn with_work_item(mut self, work_item: WorkItemRef) -> Self {
        self.work_item = Some(work_item);
        self
    }

    pub fn with_agent_profile(mut self, profile: impl Into<String>) -> Self {
        self.agent_profile = profile.into();
        self
    }

    pub fn with_parent(mut self, parent: SessionId) -> Self {
        self.parent_session_id = Some(parent);
        self
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
