// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifacts produced by command handling.
//!
//! An artifact is a typed blob addressed either inline, by URI, or by a path
//! under the session workspace. Producers set exactly one carrier; consumers
//! tolerate absence.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

crate::define_id! {
    /// Unique identifier for an artifact.
    pub struct ArtifactId("art-");
}

/// What an artifact contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    #[serde(rename = "diff")]
    Diff,
    #[serde(rename = "patch")]
    Patch,
    #[serde(rename = "test-results")]
    TestResults,
    #[serde(rename = "build-log")]
    BuildLog,
    #[serde(rename = "log")]
    Log,
    #[serde(rename = "plan")]
    Plan,
    #[serde(rename = "error-report")]
    ErrorReport,
    #[serde(rename = "conflict")]
    Conflict,
}

/// A typed blob produced by a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: ArtifactId,
    pub kind: ArtifactKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_hint: Option<PathBuf>,
}

/// Where an artifact's payload lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSource<'a> {
    Inline(&'a str),
    Uri(&'a str),
    Path(&'a Path),
}

impl Artifact {
    /// Artifact carried inline as text.
    pub fn inline(kind: ArtifactKind, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: ArtifactId::new(),
            kind,
            name: name.into(),
            content_type: None,
            inline_text: Some(text.into()),
            download_uri: None,
            path_hint: None,
        }
    }

    /// Artifact referenced by a path under the session workspace.
    pub fn at_path(kind: ArtifactKind, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: ArtifactId::new(),
            kind,
            name: name.into(),
            content_type: None,
            inline_text: None,
            download_uri: None,
            path_hint: Some(path.into()),
        }
    }

    /// Artifact referenced by a download URI.
    pub fn at_uri(kind: ArtifactKind, name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: ArtifactId::new(),
            kind,
            name: name.into(),
            content_type: None,
            inline_text: None,
            download_uri: Some(uri.into()),
            path_hint: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The payload carrier, preferring inline text, then URI, then path.
    /// `None` when the producer attached no carrier at all.
    pub fn source(&self) -> Option<ArtifactSource<'_>> {
        if let Some(text) = &self.inline_text {
            return Some(ArtifactSource::Inline(text));
        }
        if let Some(uri) = &self.download_uri {
            return Some(ArtifactSource::Uri(uri));
        }
        self.path_hint.as_deref().map(ArtifactSource::Path)
    }
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
