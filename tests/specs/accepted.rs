// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Accepted-path specs: the three-event pattern of a successful command.

use crate::prelude::*;
use sb_core::{EventKind, Outcome};
use similar_asserts::assert_eq;

#[tokio::test]
async fn accepted_command_produces_status_accept_complete() {
    let world = world();
    let session = world.orch.create_session(session(open_profile())).await.expect("create");
    let mut stream = world.orch.subscribe(&session).expect("subscribe");

    world.orch.publish_command(create_branch(session, "feature/x")).await;

    let events = stream.take(3, WAIT).await;
    assert_eq!(
        kinds(&events),
        vec!["session-status-changed", "command-accepted", "command-completed"]
    );
    match &events[2].kind {
        EventKind::CommandCompleted { outcome, .. } => assert_eq!(*outcome, Outcome::Success),
        other => panic!("unexpected terminal event: {:?}", other),
    }
}

#[tokio::test]
async fn events_serialize_with_wire_tags_and_correlation() {
    let world = world();
    let session = world.orch.create_session(session(open_profile())).await.expect("create");
    let mut stream = world.orch.subscribe(&session).expect("subscribe");

    world.orch.publish_command(create_branch(session, "feature/x")).await;
    let events = stream.take(3, WAIT).await;

    let json = serde_json::to_value(&events[1]).expect("serialize");
    assert_eq!(json["type"], "command-accepted");
    assert_eq!(json["correlation"]["sessionId"], session.as_str());
    assert_eq!(json["correlation"]["issuerAgentId"], "executor");
}
