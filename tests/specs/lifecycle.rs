// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle specs: pause/resume/abort interleaved with commands.

use crate::prelude::*;
use sb_core::{EventKind, SessionStatus};
use similar_asserts::assert_eq;

#[tokio::test]
async fn pause_resume_abort_sequence_is_fully_ordered() {
    let world = world();
    let session = world.orch.create_session(session(open_profile())).await.expect("create");
    let mut stream = world.orch.subscribe(&session).expect("subscribe");
    stream.take(1, WAIT).await; // birth

    // cmd1 succeeds.
    world.orch.publish_command(create_branch(session, "feature/a")).await;
    let events = stream.take(2, WAIT).await;
    assert_eq!(kinds(&events), vec!["command-accepted", "command-completed"]);

    // pause; cmd2 is rejected with the paused status as rule.
    world.orch.pause_session(&session).expect("pause");
    let events = stream.take(1, WAIT).await;
    assert_eq!(kinds(&events), vec!["session-status-changed"]);

    world.orch.publish_command(create_branch(session, "feature/b")).await;
    let events = stream.take(1, WAIT).await;
    match &events[0].kind {
        EventKind::CommandRejected { policy_rule, .. } => {
            assert_eq!(policy_rule.as_deref(), Some("Paused"));
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // resume; cmd3 succeeds.
    world.orch.resume_session(&session).expect("resume");
    stream.take(1, WAIT).await;
    world.orch.publish_command(create_branch(session, "feature/c")).await;
    let events = stream.take(2, WAIT).await;
    assert_eq!(kinds(&events), vec!["command-accepted", "command-completed"]);

    // abort is terminal.
    world.orch.abort_session(&session).expect("abort");
    let events = stream.take(1, WAIT).await;
    match &events[0].kind {
        EventKind::SessionStatusChanged { status, .. } => {
            assert_eq!(*status, SessionStatus::Aborted);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(world.orch.session_status(&session).expect("status"), SessionStatus::Aborted);
}
