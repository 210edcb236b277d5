// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive, expiring claims over work-item ids.
//!
//! One claim table for the whole process; at most one unexpired claim per
//! work-item id at any instant. All operations are linearizable per work
//! item because the table sits behind a single lock; snapshot views take
//! the same lock.

use parking_lot::Mutex;
use sb_core::{ActiveClaim, AgentId, ClaimConfig, Clock, SessionId, WorkItemRef};
use std::collections::HashMap;
use std::time::Duration;

/// Outcome of a claim operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimResult {
    /// The operation took effect.
    Success,
    /// A different assignee holds an unexpired claim.
    AlreadyClaimed,
    /// Caps exceeded, or the caller is not the claim's owner.
    Rejected,
    /// No claim exists for the work-item id.
    UnknownClaim,
}

impl ClaimResult {
    pub fn is_success(self) -> bool {
        matches!(self, ClaimResult::Success)
    }
}

pub struct ClaimManager<C: Clock> {
    clock: C,
    config: ClaimConfig,
    claims: Mutex<HashMap<String, ActiveClaim>>,
}

impl<C: Clock> ClaimManager<C> {
    pub fn new(config: ClaimConfig, clock: C) -> Self {
        Self { clock, config, claims: Mutex::new(HashMap::new()) }
    }

    pub fn config(&self) -> &ClaimConfig {
        &self.config
    }

    /// Claim a work item for `assignee` within `session_id`.
    ///
    /// A same-assignee re-claim refreshes the expiry without raising the
    /// assignee's claim count. An expired foreign claim is replaced. A
    /// zero timeout installs an immediately expired claim (the next sweep
    /// removes it).
    pub fn try_claim(
        &self,
        work_item: &WorkItemRef,
        assignee: &AgentId,
        session_id: &SessionId,
        timeout: Option<Duration>,
    ) -> ClaimResult {
        let now = self.clock.epoch_ms();
        let lifetime = timeout.unwrap_or_else(|| self.config.default_claim_timeout());
        let expires_at_ms = now.saturating_add(lifetime.as_millis() as u64);

        let mut claims = self.claims.lock();

        if let Some(existing) = claims.get(&work_item.id) {
            if existing.assignee != *assignee && !existing.is_expired(now) {
                return ClaimResult::AlreadyClaimed;
            }
        }

        let held_by_agent = claims
            .values()
            .filter(|c| c.work_item.id != work_item.id && c.assignee == *assignee && !c.is_expired(now))
            .count();
        if held_by_agent >= self.config.max_concurrent_claims_per_agent {
            return ClaimResult::Rejected;
        }

        let held_by_session = claims
            .values()
            .filter(|c| {
                c.work_item.id != work_item.id && c.session_id == *session_id && !c.is_expired(now)
            })
            .count();
        if held_by_session >= self.config.max_concurrent_claims_per_session {
            return ClaimResult::Rejected;
        }

        claims.insert(
            work_item.id.clone(),
            ActiveClaim {
                work_item: work_item.clone(),
                assignee: assignee.clone(),
                session_id: *session_id,
                claimed_at_ms: now,
                expires_at_ms,
            },
        );
        tracing::debug!(work_item = %work_item.id, %assignee, session = %session_id, "claim granted");
        ClaimResult::Success
    }

    /// Remove a claim; only its owner may.
    pub fn release(&self, work_item_id: &str, assignee: &AgentId) -> ClaimResult {
        let mut claims = self.claims.lock();
        match claims.get(work_item_id) {
            None => ClaimResult::UnknownClaim,
            Some(claim) if claim.assignee != *assignee => ClaimResult::Rejected,
            Some(_) => {
                claims.remove(work_item_id);
                ClaimResult::Success
            }
        }
    }

    /// Extend a claim's expiry. Renewal is allowed even after expiry as
    /// long as a sweep has not removed the claim yet.
    pub fn renew(
        &self,
        work_item_id: &str,
        assignee: &AgentId,
        extension: Option<Duration>,
    ) -> ClaimResult {
        let now = self.clock.epoch_ms();
        let lifetime = extension.unwrap_or_else(|| self.config.default_claim_timeout());

        let mut claims = self.claims.lock();
        match claims.get_mut(work_item_id) {
            None => ClaimResult::UnknownClaim,
            Some(claim) if claim.assignee != *assignee => ClaimResult::Rejected,
            Some(claim) => {
                claim.expires_at_ms = now.saturating_add(lifetime.as_millis() as u64);
                ClaimResult::Success
            }
        }
    }

    /// Remove and return every expired claim. Concurrent sweeps partition
    /// the expired set between them.
    pub fn cleanup_expired(&self) -> Vec<ActiveClaim> {
        let now = self.clock.epoch_ms();
        let mut claims = self.claims.lock();
        let expired_ids: Vec<String> = claims
            .values()
            .filter(|c| c.is_expired(now))
            .map(|c| c.work_item.id.clone())
            .collect();
        expired_ids.into_iter().filter_map(|id| claims.remove(&id)).collect()
    }

    /// Drop all claims held under a session (teardown hook).
    pub fn release_session(&self, session_id: &SessionId) -> Vec<ActiveClaim> {
        let mut claims = self.claims.lock();
        let ids: Vec<String> = claims
            .values()
            .filter(|c| c.session_id == *session_id)
            .map(|c| c.work_item.id.clone())
            .collect();
        ids.into_iter().filter_map(|id| claims.remove(&id)).collect()
    }

    pub fn claims_for_assignee(&self, assignee: &AgentId) -> Vec<ActiveClaim> {
        self.claims.lock().values().filter(|c| c.assignee == *assignee).cloned().collect()
    }

    pub fn active_claims(&self) -> Vec<ActiveClaim> {
        self.claims.lock().values().cloned().collect()
    }

    /// Claims inside the renewal window of their expiry.
    pub fn claims_needing_renewal(&self) -> Vec<ActiveClaim> {
        let now = self.clock.epoch_ms();
        let window = self.config.renewal_window();
        self.claims
            .lock()
            .values()
            .filter(|c| c.needs_renewal(now, window))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[path = "claims_tests.rs"]
mod tests;
