// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events appended to a session's log.
//!
//! Events are immutable once emitted. Serializes with
//! `{"type": "command-accepted", ...fields}` alongside `id` and
//! `correlation`; enums render as strings, absent options are omitted.

use crate::artifact::Artifact;
use crate::correlation::{Correlation, PlanNodeId};
use crate::refs::{RepoRef, WorkItemDetails, WorkItemSummary};
use crate::session::SessionStatus;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for an emitted event.
    pub struct EventId("evt-");
}

/// An immutable record in a session's event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub correlation: Correlation,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn new(correlation: Correlation, kind: EventKind) -> Self {
        Self { id: EventId::new(), correlation, kind }
    }

    /// The wire tag of this event's kind.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Terminal outcome of a completed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Failure => write!(f, "failure"),
        }
    }
}

/// The closed set of event kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum EventKind {
    #[serde(rename = "command-accepted")]
    CommandAccepted,

    #[serde(rename = "command-rejected")]
    CommandRejected {
        reason: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        policy_rule: Option<String>,
    },

    #[serde(rename = "command-completed")]
    CommandCompleted {
        outcome: Outcome,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error_code: Option<String>,
    },

    #[serde(rename = "artifact-available")]
    ArtifactAvailable { artifact: Artifact },

    #[serde(rename = "throttled")]
    Throttled {
        scope: String,
        /// Milliseconds until a retry may be admitted; absent when the
        /// bucket never refills.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        retry_after_ms: Option<u64>,
    },

    #[serde(rename = "conflict-detected")]
    ConflictDetected {
        repo: RepoRef,
        details: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        patch: Option<String>,
    },

    #[serde(rename = "session-status-changed")]
    SessionStatusChanged {
        status: SessionStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    #[serde(rename = "plan-updated")]
    PlanUpdated { plan_node_id: PlanNodeId },

    #[serde(rename = "backlog-queried")]
    BacklogQueried { items: Vec<WorkItemSummary> },

    #[serde(rename = "work-item-queried")]
    WorkItemQueried { details: WorkItemDetails },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::CommandAccepted => "command-accepted",
            EventKind::CommandRejected { .. } => "command-rejected",
            EventKind::CommandCompleted { .. } => "command-completed",
            EventKind::ArtifactAvailable { .. } => "artifact-available",
            EventKind::Throttled { .. } => "throttled",
            EventKind::ConflictDetected { .. } => "conflict-detected",
            EventKind::SessionStatusChanged { .. } => "session-status-changed",
            EventKind::PlanUpdated { .. } => "plan-updated",
            EventKind::BacklogQueried { .. } => "backlog-queried",
            EventKind::WorkItemQueried { .. } => "work-item-queried",
        }
    }

    /// Shorthand for a successful completion without a message.
    pub fn success() -> Self {
        EventKind::CommandCompleted { outcome: Outcome::Success, message: None, error_code: None }
    }

    /// Shorthand for a failed completion.
    pub fn failure(message: impl Into<String>) -> Self {
        EventKind::CommandCompleted {
            outcome: Outcome::Failure,
            message: Some(message.into()),
            error_code: None,
        }
    }

    /// True for `command-completed`, `command-rejected`, and `throttled`,
    /// the kinds that end a command's lifecycle.
    pub fn is_terminal_for_command(&self) -> bool {
        matches!(
            self,
            EventKind::CommandCompleted { .. }
                | EventKind::CommandRejected { .. }
                | EventKind::Throttled { .. }
        )
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
