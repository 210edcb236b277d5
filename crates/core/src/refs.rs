// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! References to repositories, workspaces, and tracked work items.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Reference to a work item in an external tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemRef {
    pub id: String,
    /// Which tracker the id belongs to, when the deployment has several.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_hint: Option<String>,
}

impl WorkItemRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), provider_hint: None }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider_hint = Some(provider.into());
        self
    }
}

/// Reference to a version-controlled repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoRef {
    pub name: String,
    pub path: PathBuf,
}

impl RepoRef {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), path: path.into() }
    }
}

/// Reference to a session workspace directory.
///
/// A blank path asks the workspace provider to allocate a fresh per-session
/// directory; a non-blank path is adopted as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceRef {
    pub path: PathBuf,
}

impl WorkspaceRef {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn is_blank(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

/// Backlog listing entry returned by `query-backlog`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemSummary {
    pub id: String,
    pub title: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

/// Full work-item view returned by `query-work-item`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemDetails {
    pub id: String,
    pub title: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl WorkItemDetails {
    pub fn new(id: impl Into<String>, title: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            state: state.into(),
            assignee: None,
            description: None,
            comments: Vec::new(),
        }
    }

    pub fn summary(&self) -> WorkItemSummary {
        WorkItemSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            state: self.state.clone(),
            assignee: self.assignee.clone(),
        }
    }
}

#[cfg(test)]
#[path = "refs_tests.rs"]
mod tests;
