// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Intent commands submitted to the orchestrator.
//!
//! Commands form a closed set of typed intents. The orchestrator gates them
//! (policy, rate limits) and routes them to adapters; it never interprets
//! intent payloads beyond what gating needs.

use crate::artifact::Artifact;
use crate::correlation::{Correlation, PlanNodeId};
use crate::refs::{RepoRef, WorkItemRef};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a published command.
    pub struct CommandId("cmd-");
}

/// A typed intent with its provenance.
///
/// Serializes with `{"kind": "create-branch", ...fields}` alongside `id`
/// and `correlation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: CommandId,
    pub correlation: Correlation,
    #[serde(flatten)]
    pub intent: CommandIntent,
}

impl Command {
    /// Build a command with a fresh id. The correlation's `command_id` is
    /// set to the new id so derived events inherit it.
    pub fn new(correlation: Correlation, intent: CommandIntent) -> Self {
        let id = CommandId::new();
        let mut correlation = correlation;
        correlation.command_id = Some(id);
        Self { id, correlation, intent }
    }

    pub fn kind(&self) -> CommandKind {
        self.intent.kind()
    }

    /// Branch a branch-mutating intent targets, if any.
    pub fn target_branch(&self) -> Option<&str> {
        match &self.intent {
            CommandIntent::CreateBranch { branch, .. } => Some(branch),
            CommandIntent::Commit { branch, .. } => branch.as_deref(),
            CommandIntent::Push { branch, .. } => Some(branch),
            _ => None,
        }
    }

    /// Work item an intent addresses, if any.
    pub fn work_item(&self) -> Option<&WorkItemRef> {
        match &self.intent {
            CommandIntent::TransitionTicket { work_item, .. }
            | CommandIntent::Comment { work_item, .. }
            | CommandIntent::SetAssignee { work_item, .. }
            | CommandIntent::QueryWorkItem { work_item } => Some(work_item),
            _ => None,
        }
    }

    /// Command-carried execution timeout, if the intent has one.
    pub fn timeout_ms(&self) -> Option<u64> {
        match &self.intent {
            CommandIntent::RunTests { timeout_ms, .. }
            | CommandIntent::BuildProject { timeout_ms, .. } => *timeout_ms,
            _ => None,
        }
    }
}

/// The closed set of intents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum CommandIntent {
    #[serde(rename = "create-branch")]
    CreateBranch {
        repo: RepoRef,
        branch: String,
        /// Start point for the new branch; the current HEAD when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_point: Option<String>,
    },

    #[serde(rename = "apply-patch")]
    ApplyPatch {
        repo: RepoRef,
        /// Unified diff text.
        patch: String,
    },

    #[serde(rename = "run-tests")]
    RunTests {
        /// Test selector passed through to the runner.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },

    #[serde(rename = "build-project")]
    BuildProject {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },

    #[serde(rename = "commit")]
    Commit {
        repo: RepoRef,
        message: String,
        /// Paths staged for the commit; everything changed when empty.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        include_paths: Vec<String>,
        /// Branch the commit lands on; the checked-out branch when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
    },

    #[serde(rename = "push")]
    Push {
        repo: RepoRef,
        branch: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        set_upstream: bool,
    },

    #[serde(rename = "get-diff")]
    GetDiff {
        repo: RepoRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base: Option<String>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        staged: bool,
    },

    #[serde(rename = "transition-ticket")]
    TransitionTicket { work_item: WorkItemRef, to_state: String },

    #[serde(rename = "comment")]
    Comment { work_item: WorkItemRef, body: String },

    #[serde(rename = "set-assignee")]
    SetAssignee { work_item: WorkItemRef, assignee: String },

    #[serde(rename = "upload-artifact")]
    UploadArtifact { artifact: Artifact },

    #[serde(rename = "request-approval")]
    RequestApproval {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    #[serde(rename = "query-backlog")]
    QueryBacklog {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filter: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
    },

    #[serde(rename = "query-work-item")]
    QueryWorkItem { work_item: WorkItemRef },

    /// Reserved for plan-driven session spawning.
    #[serde(rename = "spawn-session")]
    SpawnSession {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        plan_node_id: Option<PlanNodeId>,
    },

    /// Reserved for linking work to a plan node.
    #[serde(rename = "link-plan-node")]
    LinkPlanNode { plan_node_id: PlanNodeId },
}

impl CommandIntent {
    pub fn kind(&self) -> CommandKind {
        match self {
            CommandIntent::CreateBranch { .. } => CommandKind::CreateBranch,
            CommandIntent::ApplyPatch { .. } => CommandKind::ApplyPatch,
            CommandIntent::RunTests { .. } => CommandKind::RunTests,
            CommandIntent::BuildProject { .. } => CommandKind::BuildProject,
            CommandIntent::Commit { .. } => CommandKind::Commit,
            CommandIntent::Push { .. } => CommandKind::Push,
            CommandIntent::GetDiff { .. } => CommandKind::GetDiff,
            CommandIntent::TransitionTicket { .. } => CommandKind::TransitionTicket,
            CommandIntent::Comment { .. } => CommandKind::Comment,
            CommandIntent::SetAssignee { .. } => CommandKind::SetAssignee,
            CommandIntent::UploadArtifact { .. } => CommandKind::UploadArtifact,
            CommandIntent::RequestApproval { .. } => CommandKind::RequestApproval,
            CommandIntent::QueryBacklog { .. } => CommandKind::QueryBacklog,
            CommandIntent::QueryWorkItem { .. } => CommandKind::QueryWorkItem,
            CommandIntent::SpawnSession { .. } => CommandKind::SpawnSession,
            CommandIntent::LinkPlanNode { .. } => CommandKind::LinkPlanNode,
        }
    }
}

/// Fieldless mirror of [`CommandIntent`], used by policy lists and
/// per-command rate caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    #[serde(rename = "create-branch")]
    CreateBranch,
    #[serde(rename = "apply-patch")]
    ApplyPatch,
    #[serde(rename = "run-tests")]
    RunTests,
    #[serde(rename = "build-project")]
    BuildProject,
    #[serde(rename = "commit")]
    Commit,
    #[serde(rename = "push")]
    Push,
    #[serde(rename = "get-diff")]
    GetDiff,
    #[serde(rename = "transition-ticket")]
    TransitionTicket,
    #[serde(rename = "comment")]
    Comment,
    #[serde(rename = "set-assignee")]
    SetAssignee,
    #[serde(rename = "upload-artifact")]
    UploadArtifact,
    #[serde(rename = "request-approval")]
    RequestApproval,
    #[serde(rename = "query-backlog")]
    QueryBacklog,
    #[serde(rename = "query-work-item")]
    QueryWorkItem,
    #[serde(rename = "spawn-session")]
    SpawnSession,
    #[serde(rename = "link-plan-node")]
    LinkPlanNode,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::CreateBranch => "create-branch",
            CommandKind::ApplyPatch => "apply-patch",
            CommandKind::RunTests => "run-tests",
            CommandKind::BuildProject => "build-project",
            CommandKind::Commit => "commit",
            CommandKind::Push => "push",
            CommandKind::GetDiff => "get-diff",
            CommandKind::TransitionTicket => "transition-ticket",
            CommandKind::Comment => "comment",
            CommandKind::SetAssignee => "set-assignee",
            CommandKind::UploadArtifact => "upload-artifact",
            CommandKind::RequestApproval => "request-approval",
            CommandKind::QueryBacklog => "query-backlog",
            CommandKind::QueryWorkItem => "query-work-item",
            CommandKind::SpawnSession => "spawn-session",
            CommandKind::LinkPlanNode => "link-plan-node",
        }
    }

    /// Kinds that mutate branches and are subject to protected-branch rules.
    pub fn mutates_branch(self) -> bool {
        matches!(self, CommandKind::CreateBranch | CommandKind::Commit | CommandKind::Push)
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
