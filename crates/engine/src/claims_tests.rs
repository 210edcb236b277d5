// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sb_core::FakeClock;
use std::sync::Arc;

fn manager(clock: &FakeClock) -> ClaimManager<FakeClock> {
    ClaimManager::new(ClaimConfig::default(), clock.clone())
}

fn manager_with(config: ClaimConfig, clock: &FakeClock) -> ClaimManager<FakeClock> {
    ClaimManager::new(config, clock.clone())
}

fn item(id: &str) -> WorkItemRef {
    WorkItemRef::new(id)
}

fn agent(name: &str) -> AgentId {
    AgentId::new(name)
}

#[test]
fn fresh_claim_succeeds_and_expires_after_default_timeout() {
    let clock = FakeClock::new();
    let manager = manager(&clock);
    let session = SessionId::new();

    assert!(manager.try_claim(&item("w1"), &agent("a"), &session, None).is_success());

    let claims = manager.active_claims();
    assert_eq!(claims.len(), 1);
    assert_eq!(
        claims[0].expires_at_ms - claims[0].claimed_at_ms,
        ClaimConfig::default().default_claim_timeout_ms
    );
}

#[test]
fn foreign_unexpired_claim_blocks() {
    let clock = FakeClock::new();
    let manager = manager(&clock);
    let session = SessionId::new();

    assert!(manager.try_claim(&item("w1"), &agent("a"), &session, None).is_success());
    assert_eq!(
        manager.try_claim(&item("w1"), &agent("b"), &session, None),
        ClaimResult::AlreadyClaimed
    );
    assert_eq!(manager.active_claims().len(), 1);
}

#[test]
fn same_assignee_reclaim_refreshes_without_raising_count() {
    let clock = FakeClock::new();
    let manager = manager(&clock);
    let session = SessionId::new();
    let a = agent("a");

    assert!(manager
        .try_claim(&item("w1"), &a, &session, Some(Duration::from_secs(10)))
        .is_success());
    clock.advance(Duration::from_secs(5));
    assert!(manager
        .try_claim(&item("w1"), &a, &session, Some(Duration::from_secs(10)))
        .is_success());

    let claims = manager.claims_for_assignee(&a);
    assert_eq!(claims.len(), 1);
    // Expiry moved forward with the re-claim.
    assert_eq!(claims[0].expires_at_ms, clock.epoch_ms() + 10_000);
}

#[test]
fn expired_foreign_claim_is_replaceable() {
    let clock = FakeClock::new();
    let manager = manager(&clock);
    let session = SessionId::new();

    assert!(manager
        .try_claim(&item("w1"), &agent("a"), &session, Some(Duration::from_secs(1)))
        .is_success());
    clock.advance(Duration::from_secs(2));
    assert!(manager.try_claim(&item("w1"), &agent("b"), &session, None).is_success());

    let claims = manager.active_claims();
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].assignee, agent("b"));
}

#[test]
fn per_agent_cap_rejects_then_admits_after_release() {
    let clock = FakeClock::new();
    let config = ClaimConfig { max_concurrent_claims_per_agent: 2, ..ClaimConfig::default() };
    let manager = manager_with(config, &clock);
    let a = agent("a");

    let s1 = SessionId::new();
    let s2 = SessionId::new();
    let s3 = SessionId::new();
    assert!(manager.try_claim(&item("w1"), &a, &s1, None).is_success());
    assert!(manager.try_claim(&item("w2"), &a, &s2, None).is_success());
    assert_eq!(manager.try_claim(&item("w3"), &a, &s3, None), ClaimResult::Rejected);

    assert!(manager.release("w1", &a).is_success());
    assert!(manager.try_claim(&item("w3"), &a, &s3, None).is_success());
}

#[test]
fn per_session_cap_counts_all_assignees() {
    let clock = FakeClock::new();
    let config = ClaimConfig { max_concurrent_claims_per_session: 2, ..ClaimConfig::default() };
    let manager = manager_with(config, &clock);
    let session = SessionId::new();

    assert!(manager.try_claim(&item("w1"), &agent("a"), &session, None).is_success());
    assert!(manager.try_claim(&item("w2"), &agent("b"), &session, None).is_success());
    assert_eq!(
        manager.try_claim(&item("w3"), &agent("c"), &session, None),
        ClaimResult::Rejected
    );
}

#[test]
fn release_by_non_owner_is_rejected_and_changes_nothing() {
    let clock = FakeClock::new();
    let manager = manager(&clock);
    let session = SessionId::new();

    manager.try_claim(&item("w1"), &agent("a"), &session, None);
    assert_eq!(manager.release("w1", &agent("b")), ClaimResult::Rejected);
    assert_eq!(manager.active_claims().len(), 1);
}

#[test]
fn release_of_absent_claim_is_unknown() {
    let clock = FakeClock::new();
    let manager = manager(&clock);
    assert_eq!(manager.release("nope", &agent("a")), ClaimResult::UnknownClaim);
}

#[test]
fn renew_extends_matching_claims_only() {
    let clock = FakeClock::new();
    let manager = manager(&clock);
    let session = SessionId::new();
    let a = agent("a");

    manager.try_claim(&item("w1"), &a, &session, Some(Duration::from_secs(10)));
    clock.advance(Duration::from_secs(5));

    assert_eq!(manager.renew("w1", &agent("b"), None), ClaimResult::Rejected);
    assert!(manager.renew("w1", &a, Some(Duration::from_secs(30))).is_success());

    let claims = manager.active_claims();
    assert_eq!(claims[0].expires_at_ms, clock.epoch_ms() + 30_000);

    assert_eq!(manager.renew("other", &a, None), ClaimResult::UnknownClaim);
}

#[test]
fn renew_after_expiry_but_before_cleanup_succeeds() {
    let clock = FakeClock::new();
    let manager = manager(&clock);
    let session = SessionId::new();
    let a = agent("a");

    manager.try_claim(&item("w1"), &a, &session, Some(Duration::from_secs(1)));
    clock.advance(Duration::from_secs(5));

    assert!(manager.renew("w1", &a, Some(Duration::from_secs(10))).is_success());
    assert!(!manager.active_claims()[0].is_expired(clock.epoch_ms()));
}

#[test]
fn zero_timeout_claim_expires_immediately() {
    let clock = FakeClock::new();
    let manager = manager(&clock);
    let session = SessionId::new();

    manager.try_claim(&item("w1"), &agent("a"), &session, Some(Duration::ZERO));
    assert!(manager.active_claims()[0].is_expired(clock.epoch_ms()));

    let swept = manager.cleanup_expired();
    assert_eq!(swept.len(), 1);
    assert!(manager.active_claims().is_empty());
}

#[test]
fn cleanup_is_idempotent() {
    let clock = FakeClock::new();
    let manager = manager(&clock);
    let session = SessionId::new();

    manager.try_claim(&item("w1"), &agent("a"), &session, Some(Duration::from_secs(1)));
    manager.try_claim(&item("w2"), &agent("b"), &session, Some(Duration::from_secs(100)));
    clock.advance(Duration::from_secs(2));

    let first = manager.cleanup_expired();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].work_item.id, "w1");

    let second = manager.cleanup_expired();
    assert!(second.is_empty());
    assert_eq!(manager.active_claims().len(), 1);
}

#[test]
fn release_session_drops_only_that_sessions_claims() {
    let clock = FakeClock::new();
    let manager = manager(&clock);
    let mine = SessionId::new();
    let other = SessionId::new();

    manager.try_claim(&item("w1"), &agent("a"), &mine, None);
    manager.try_claim(&item("w2"), &agent("a"), &other, None);

    let released = manager.release_session(&mine);
    assert_eq!(released.len(), 1);
    assert_eq!(released[0].work_item.id, "w1");
    assert_eq!(manager.active_claims().len(), 1);
}

#[test]
fn renewal_window_snapshot() {
    let clock = FakeClock::new();
    let config = ClaimConfig { renewal_window_ms: 5_000, ..ClaimConfig::default() };
    let manager = manager_with(config, &clock);
    let session = SessionId::new();

    manager.try_claim(&item("soon"), &agent("a"), &session, Some(Duration::from_secs(4)));
    manager.try_claim(&item("later"), &agent("a"), &session, Some(Duration::from_secs(60)));

    let due: Vec<String> =
        manager.claims_needing_renewal().into_iter().map(|c| c.work_item.id).collect();
    assert_eq!(due, vec!["soon".to_string()]);
}

#[test]
fn concurrent_claims_grant_exactly_one_winner() {
    let clock = FakeClock::new();
    let manager = Arc::new(manager(&clock));
    let item_ref = item("contested");

    let handles: Vec<_> = (0..10)
        .map(|n| {
            let manager = Arc::clone(&manager);
            let item_ref = item_ref.clone();
            std::thread::spawn(move || {
                let session = SessionId::new();
                manager.try_claim(&item_ref, &AgentId::new(format!("agent-{n}")), &session, None)
            })
        })
        .collect();

    let results: Vec<ClaimResult> =
        handles.into_iter().map(|h| h.join().unwrap_or(ClaimResult::Rejected)).collect();

    let wins = results.iter().filter(|r| r.is_success()).count();
    let losses = results.iter().filter(|r| **r == ClaimResult::AlreadyClaimed).count();
    assert_eq!(wins, 1);
    assert_eq!(losses, 9);
    assert_eq!(manager.active_claims().len(), 1);
}

#[test]
fn concurrent_release_only_owner_wins() {
    let clock = FakeClock::new();
    let manager = Arc::new(manager(&clock));
    let session = SessionId::new();
    manager.try_claim(&item("w1"), &agent("owner"), &session, None);

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let manager = Arc::clone(&manager);
            std::thread::spawn(move || {
                let who = if n == 0 { "owner".to_string() } else { format!("intruder-{n}") };
                manager.release("w1", &AgentId::new(who))
            })
        })
        .collect();

    let results: Vec<ClaimResult> =
        handles.into_iter().map(|h| h.join().unwrap_or(ClaimResult::Rejected)).collect();

    assert_eq!(results.iter().filter(|r| r.is_success()).count(), 1);
    assert!(manager.active_claims().is_empty());
}
