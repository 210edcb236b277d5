// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator API errors.
//!
//! Only the programmatic surface (session lifecycle, configuration)
//! returns these. Command outcomes never do; they travel as events.

use sb_core::{InvalidTransition, SessionId};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("session already exists: {0}")]
    SessionExists(SessionId),

    #[error(transparent)]
    Transition(#[from] InvalidTransition),

    #[error("workspace path already in use: {}", .0.display())]
    WorkspacePathInUse(PathBuf),

    #[error("workspace io error at {}: {source}", .path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown policy profile: {0}")]
    UnknownProfile(String),

    #[error("config error: {0}")]
    Config(String),
}
