// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn from_birth_replays_history_then_streams_live() {
    let fx = fixture();
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();

    fx.orch.publish_command(create_branch(session, "feature/a")).await;
    // Wait for the first command to land in the log.
    while fx.orch.session_events(&session).unwrap().len() < 3 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let mut stream = fx.orch.subscribe(&session).unwrap();
    let replayed = stream.take(3, WAIT).await;
    assert_eq!(
        kind_names(&replayed),
        vec!["session-status-changed", "command-accepted", "command-completed"]
    );

    fx.orch.publish_command(create_branch(session, "feature/b")).await;
    let live = stream.take(2, WAIT).await;
    assert_eq!(kind_names(&live), vec!["command-accepted", "command-completed"]);
}

#[tokio::test]
async fn from_now_skips_history() {
    let fx = fixture();
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();

    fx.orch.publish_command(create_branch(session, "feature/a")).await;
    while fx.orch.session_events(&session).unwrap().len() < 3 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let mut stream = fx.orch.subscribe_from(&session, SubscribeFrom::Now).unwrap();
    fx.orch.publish_command(create_branch(session, "feature/b")).await;

    let events = stream.take(2, WAIT).await;
    assert_eq!(kind_names(&events), vec!["command-accepted", "command-completed"]);
}

#[tokio::test]
async fn subscribers_observe_identical_order() {
    let fx = fixture();
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();
    let mut first = fx.orch.subscribe(&session).unwrap();
    let mut second = fx.orch.subscribe(&session).unwrap();

    for n in 0..4 {
        fx.orch.publish_command(create_branch(session, &format!("feature/{n}"))).await;
    }

    let seen_first = first.take(9, WAIT).await;
    let seen_second = second.take(9, WAIT).await;

    let ids_first: Vec<String> = seen_first.iter().map(|e| e.id.to_string()).collect();
    let ids_second: Vec<String> = seen_second.iter().map(|e| e.id.to_string()).collect();
    assert_eq!(ids_first, ids_second);
}

#[tokio::test]
async fn slow_subscriber_blocks_only_itself() {
    let fx = fixture_with(|config| config.with_subscriber_buffer(2));
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();

    let mut slow = fx.orch.subscribe(&session).unwrap();
    let mut fast = fx.orch.subscribe(&session).unwrap();

    // 1 birth event + 3 commands * 2 events = 7, well past the slow
    // subscriber's buffer of 2.
    for n in 0..3 {
        fx.orch.publish_command(create_branch(session, &format!("feature/{n}"))).await;
    }

    let seen_fast = fast.take(7, WAIT).await;
    assert_eq!(seen_fast.len(), 7, "a stalled peer must not hold the fast subscriber back");

    // The slow subscriber still gets the full ordered history once it
    // starts reading.
    let seen_slow = slow.take(7, WAIT).await;
    assert_eq!(kind_names(&seen_slow), kind_names(&seen_fast));
}

#[tokio::test]
async fn dropping_a_stream_unsubscribes() {
    let fx = fixture();
    let session = fx.orch.create_session(session_config(PolicyProfile::named("open"))).await.unwrap();

    let stream = fx.orch.subscribe(&session).unwrap();
    drop(stream);

    // Events keep flowing for remaining subscribers.
    let mut live = fx.orch.subscribe(&session).unwrap();
    fx.orch.publish_command(create_branch(session, "feature/x")).await;
    let events = live.take(3, WAIT).await;
    assert_eq!(events.len(), 3);
}

#[tokio::test]
async fn subscribing_to_an_unknown_session_errors() {
    let fx = fixture();
    let err = fx.orch.subscribe(&SessionId::new()).unwrap_err();
    assert!(matches!(err, crate::OrchestratorError::SessionNotFound(_)));
}
