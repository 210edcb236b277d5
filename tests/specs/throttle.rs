// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rate-limit specs: throttles are terminal and carry a retry hint.

use crate::prelude::*;
use sb_core::{EventKind, RateLimits};
use similar_asserts::assert_eq;

#[tokio::test]
async fn second_command_within_the_window_is_throttled() {
    let world = world();
    let profile = open_profile().with_limits(RateLimits::per_minute(1, 1));
    let session = world.orch.create_session(session(profile)).await.expect("create");
    let mut stream = world.orch.subscribe(&session).expect("subscribe");

    world.orch.publish_command(create_branch(session, "feature/a")).await;
    world.orch.publish_command(create_branch(session, "feature/b")).await;

    let events = stream.take(4, WAIT).await;
    assert_eq!(
        kinds(&events),
        vec!["session-status-changed", "command-accepted", "command-completed", "throttled"]
    );
    match &events[3].kind {
        EventKind::Throttled { scope, retry_after_ms } => {
            assert_eq!(scope, "Rate limit exceeded");
            assert!(retry_after_ms.expect("finite retry") > 0);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // Only the first command reached the adapter.
    assert_eq!(world.fake.handled().len(), 1);
}

#[tokio::test]
async fn refill_restores_admission_after_the_window() {
    let world = world();
    let profile = open_profile().with_limits(RateLimits::per_minute(60, 1));
    let session = world.orch.create_session(session(profile)).await.expect("create");
    let mut stream = world.orch.subscribe(&session).expect("subscribe");
    stream.take(1, WAIT).await;

    world.orch.publish_command(create_branch(session, "feature/a")).await;
    stream.take(2, WAIT).await;

    world.orch.publish_command(create_branch(session, "feature/b")).await;
    let events = stream.take(1, WAIT).await;
    assert_eq!(kinds(&events), vec!["throttled"]);

    world.clock.advance(std::time::Duration::from_secs(2));
    world.orch.publish_command(create_branch(session, "feature/c")).await;
    let events = stream.take(2, WAIT).await;
    assert_eq!(kinds(&events), vec!["command-accepted", "command-completed"]);
}

#[tokio::test]
async fn zero_rate_zero_burst_throttles_forever() {
    let world = world();
    let profile = open_profile().with_limits(RateLimits::per_minute(0, 0));
    let session = world.orch.create_session(session(profile)).await.expect("create");
    let mut stream = world.orch.subscribe(&session).expect("subscribe");

    world.orch.publish_command(create_branch(session, "feature/a")).await;

    let events = stream.take(2, WAIT).await;
    match &events[1].kind {
        EventKind::Throttled { retry_after_ms, .. } => {
            assert_eq!(*retry_after_ms, None, "a bucket that never refills has no retry time");
        }
        other => panic!("unexpected event: {:?}", other),
    }
}
