// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Claim specs: exclusivity under contention and per-agent caps.

use crate::prelude::*;
use sb_core::{AgentId, ClaimConfig, SessionId, WorkItemRef};
use sb_engine::ClaimResult;
use similar_asserts::assert_eq;

#[tokio::test]
async fn ten_contenders_one_winner() {
    let world = world();
    let claims = world.orch.claims();
    let item = WorkItemRef::new("contested");

    let results: Vec<ClaimResult> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..10)
            .map(|n| {
                let item = item.clone();
                scope.spawn(move || {
                    claims.try_claim(
                        &item,
                        &AgentId::new(format!("agent-{n}")),
                        &SessionId::new(),
                        None,
                    )
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap_or(ClaimResult::Rejected)).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_success()).count(), 1);
    assert_eq!(results.iter().filter(|r| **r == ClaimResult::AlreadyClaimed).count(), 9);
    assert_eq!(claims.active_claims().len(), 1);
}

#[tokio::test]
async fn per_agent_cap_blocks_until_release() {
    let world = world_with(|mut config| {
        config.claims = ClaimConfig { max_concurrent_claims_per_agent: 2, ..ClaimConfig::default() };
        config
    });
    let claims = world.orch.claims();
    let agent = AgentId::new("agent-a");

    assert!(claims.try_claim(&WorkItemRef::new("w1"), &agent, &SessionId::new(), None).is_success());
    assert!(claims.try_claim(&WorkItemRef::new("w2"), &agent, &SessionId::new(), None).is_success());
    assert_eq!(
        claims.try_claim(&WorkItemRef::new("w3"), &agent, &SessionId::new(), None),
        ClaimResult::Rejected
    );

    assert!(claims.release("w1", &agent).is_success());
    assert!(claims.try_claim(&WorkItemRef::new("w3"), &agent, &SessionId::new(), None).is_success());
}
