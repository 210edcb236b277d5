// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Isolation specs: concurrent sessions never leak events or workspaces.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test]
async fn two_concurrent_sessions_keep_separate_logs() {
    let world = world();
    let a = world.orch.create_session(session(open_profile())).await.expect("create a");
    let b = world.orch.create_session(session(open_profile())).await.expect("create b");

    let mut stream_a = world.orch.subscribe(&a).expect("subscribe a");
    let mut stream_b = world.orch.subscribe(&b).expect("subscribe b");

    tokio::join!(
        world.orch.publish_command(create_branch(a, "feature/a")),
        world.orch.publish_command(create_branch(b, "feature/b")),
    );

    let events_a = stream_a.take(3, WAIT).await;
    let events_b = stream_b.take(3, WAIT).await;

    let expected = vec!["session-status-changed", "command-accepted", "command-completed"];
    assert_eq!(kinds(&events_a), expected.clone());
    assert_eq!(kinds(&events_b), expected);

    for event in &events_a {
        assert_eq!(event.correlation.session_id, a);
    }
    for event in &events_b {
        assert_eq!(event.correlation.session_id, b);
    }
}

#[tokio::test]
async fn sessions_get_distinct_workspaces() {
    let world = world();
    let a = world.orch.create_session(session(open_profile())).await.expect("create a");
    let b = world.orch.create_session(session(open_profile())).await.expect("create b");

    let ws_a = world.orch.workspace_path(&a).expect("workspace a");
    let ws_b = world.orch.workspace_path(&b).expect("workspace b");
    assert_ne!(ws_a, ws_b);
    assert!(ws_a.is_dir());
    assert!(ws_b.is_dir());
}
