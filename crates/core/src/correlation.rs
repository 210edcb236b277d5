// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provenance attached to every command and event.
//!
//! A [`Correlation`] ties a command or event back to the session it belongs
//! to, the command it answers, the plan node it realizes, and the agent that
//! issued it, so subscribers can reconstruct the flow from the event stream
//! alone.

use crate::command::{Command, CommandId};
use crate::session::SessionId;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

crate::define_id! {
    /// Identifier of a node in an agent's plan graph.
    pub struct PlanNodeId("pln-");
}

/// Identity of the agent that issued a command (planner, executor,
/// reviewer). Supplied by the caller, never generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for AgentId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for AgentId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for AgentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The provenance tuple carried by every command and event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlation {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_id: Option<CommandId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_command_id: Option<CommandId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_node_id: Option<PlanNodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_agent_id: Option<AgentId>,
}

impl Correlation {
    /// Session-scoped correlation with no command provenance. Used for
    /// broad events such as status changes.
    pub fn session(session_id: SessionId) -> Self {
        Self {
            session_id,
            command_id: None,
            parent_command_id: None,
            plan_node_id: None,
            issuer_agent_id: None,
        }
    }

    /// Correlation for an event answering `command`: carries the command's
    /// id and the original issuer so subscribers can route replies.
    pub fn reply_to(command: &Command) -> Self {
        Self {
            session_id: command.correlation.session_id,
            command_id: Some(command.id),
            parent_command_id: command.correlation.parent_command_id,
            plan_node_id: command.correlation.plan_node_id,
            issuer_agent_id: command.correlation.issuer_agent_id.clone(),
        }
    }

    pub fn with_issuer(mut self, agent: impl Into<AgentId>) -> Self {
        self.issuer_agent_id = Some(agent.into());
        self
    }

    pub fn with_parent(mut self, parent: CommandId) -> Self {
        self.parent_command_id = Some(parent);
        self
    }

    pub fn with_plan_node(mut self, node: PlanNodeId) -> Self {
        self.plan_node_id = Some(node);
        self
    }
}

#[cfg(test)]
#[path = "correlation_tests.rs"]
mod tests;
