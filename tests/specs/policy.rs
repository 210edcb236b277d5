// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Policy specs: rejections carry the rule and never reach adapters.

use crate::prelude::*;
use sb_core::{CommandKind, EventKind, PolicyProfile};
use similar_asserts::assert_eq;
use std::time::Duration;

#[tokio::test]
async fn blacklisted_command_is_rejected_without_accept_or_complete() {
    let world = world();
    let profile = PolicyProfile {
        command_blacklist: Some(vec![CommandKind::CreateBranch]),
        ..open_profile()
    };
    let session = world.orch.create_session(session(profile)).await.expect("create");
    let mut stream = world.orch.subscribe(&session).expect("subscribe");

    world.orch.publish_command(create_branch(session, "feature/x")).await;

    let events = stream.take(2, WAIT).await;
    assert_eq!(kinds(&events), vec!["session-status-changed", "command-rejected"]);
    match &events[1].kind {
        EventKind::CommandRejected { reason, policy_rule } => {
            assert_eq!(reason, "Policy violation");
            assert_eq!(policy_rule.as_deref(), Some("Command in blacklist"));
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // Nothing further arrives: no accept, no completion, no dispatch.
    assert!(stream.next_timeout(Duration::from_millis(150)).await.is_none());
    assert!(world.fake.handled().is_empty());
}

#[tokio::test]
async fn protected_branch_rejection_names_the_rule() {
    let world = world();
    let session = world.orch.create_session(session(open_profile())).await.expect("create");
    let mut stream = world.orch.subscribe(&session).expect("subscribe");

    world.orch.publish_command(create_branch(session, "main")).await;

    let events = stream.take(2, WAIT).await;
    match &events[1].kind {
        EventKind::CommandRejected { reason, policy_rule } => {
            assert_eq!(reason, "Protected branch");
            assert_eq!(policy_rule.as_deref(), Some("Protected branch"));
        }
        other => panic!("unexpected event: {:?}", other),
    }
}
