// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sb_core::{PolicyProfile, RepoRef, WorkspaceRef};

fn config() -> SessionConfig {
    SessionConfig::new(PolicyProfile::named("p"), RepoRef::new("demo", "/tmp/demo"))
}

#[test]
fn blank_ref_allocates_a_fresh_directory_under_root() {
    let root = tempfile::tempdir().unwrap();
    let provider = WorkspaceProvider::new(root.path());
    let config = config();

    let path = provider.provision(&config).unwrap();

    assert!(path.starts_with(root.path()));
    assert!(path.is_dir());
    assert_eq!(provider.path_for(&config.session_id), Some(path));
}

#[test]
fn supplied_path_is_adopted_and_created() {
    let root = tempfile::tempdir().unwrap();
    let target = root.path().join("custom-ws");
    let provider = WorkspaceProvider::new(root.path().join("unused"));
    let config = config().with_workspace(WorkspaceRef::at(&target));

    let path = provider.provision(&config).unwrap();

    assert_eq!(path, target);
    assert!(target.is_dir());
}

#[test]
fn two_live_sessions_never_share_a_path() {
    let root = tempfile::tempdir().unwrap();
    let target = root.path().join("shared");
    let provider = WorkspaceProvider::new(root.path());

    let first = config().with_workspace(WorkspaceRef::at(&target));
    let second = config().with_workspace(WorkspaceRef::at(&target));

    provider.provision(&first).unwrap();
    let err = provider.provision(&second).unwrap_err();
    assert!(matches!(err, OrchestratorError::WorkspacePathInUse(p) if p == target));
}

#[test]
fn release_removes_only_provider_created_directories() {
    let root = tempfile::tempdir().unwrap();
    let provider = WorkspaceProvider::new(root.path());

    let fresh = config();
    let fresh_path = provider.provision(&fresh).unwrap();
    provider.release(&fresh.session_id);
    assert!(!fresh_path.exists());

    let adopted_dir = root.path().join("adopted");
    let adopted = config().with_workspace(WorkspaceRef::at(&adopted_dir));
    provider.provision(&adopted).unwrap();
    provider.release(&adopted.session_id);
    assert!(adopted_dir.exists(), "adopted directories must survive teardown");
}

#[test]
fn released_path_becomes_available_again() {
    let root = tempfile::tempdir().unwrap();
    let target = root.path().join("reused");
    let provider = WorkspaceProvider::new(root.path());

    let first = config().with_workspace(WorkspaceRef::at(&target));
    provider.provision(&first).unwrap();
    provider.release(&first.session_id);

    let second = config().with_workspace(WorkspaceRef::at(&target));
    assert!(provider.provision(&second).is_ok());
}

#[test]
fn release_of_unknown_session_is_a_no_op() {
    let provider = WorkspaceProvider::in_temp();
    provider.release(&sb_core::SessionId::new());
}
