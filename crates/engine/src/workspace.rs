// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session workspace provisioning.
//!
//! Each live session owns exactly one directory. A blank workspace ref in
//! the session config gets a fresh directory under the provider root,
//! removed again at teardown; a caller-supplied path is adopted (and
//! created if missing) but never removed.

use crate::error::OrchestratorError;
use parking_lot::Mutex;
use sb_core::{SessionConfig, SessionId};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone)]
struct Provisioned {
    path: PathBuf,
    owned: bool,
}

pub struct WorkspaceProvider {
    root: PathBuf,
    live: Mutex<HashMap<SessionId, Provisioned>>,
}

impl WorkspaceProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), live: Mutex::new(HashMap::new()) }
    }

    /// Provider rooted in the OS temp dir.
    pub fn in_temp() -> Self {
        Self::new(std::env::temp_dir().join("switchboard"))
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Assign the session its workspace directory. The directory exists
    /// when this returns.
    pub fn provision(&self, config: &SessionConfig) -> Result<PathBuf, OrchestratorError> {
        let mut live = self.live.lock();
        let (path, owned) = if config.workspace.is_blank() {
            (self.root.join(format!("ws-{}", config.session_id.suffix())), true)
        } else {
            (config.workspace.path.clone(), false)
        };

        if live.values().any(|p| p.path == path) {
            return Err(OrchestratorError::WorkspacePathInUse(path));
        }

        std::fs::create_dir_all(&path)
            .map_err(|source| OrchestratorError::Workspace { path: path.clone(), source })?;

        live.insert(config.session_id, Provisioned { path: path.clone(), owned });
        tracing::debug!(session = %config.session_id, path = %path.display(), owned, "workspace provisioned");
        Ok(path)
    }

    /// Forget the session's workspace; directories this provider created
    /// are removed best-effort.
    pub fn release(&self, session_id: &SessionId) {
        let Some(provisioned) = self.live.lock().remove(session_id) else {
            return;
        };
        if !provisioned.owned {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&provisioned.path) {
            tracing::warn!(
                session = %session_id,
                path = %provisioned.path.display(),
                error = %e,
                "workspace cleanup failed"
            );
        }
    }

    pub fn path_for(&self, session_id: &SessionId) -> Option<PathBuf> {
        self.live.lock().get(session_id).map(|p| p.path.clone())
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
