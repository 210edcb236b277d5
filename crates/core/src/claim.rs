// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work-item claims and claim-manager configuration.
//!
//! A claim is an exclusive, expiring, renewable reservation of a work-item
//! id by an assignee within a session. The engine's claim manager owns the
//! claim table; this module defines the records it hands out.

use crate::correlation::AgentId;
use crate::refs::WorkItemRef;
use crate::session::SessionId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A live reservation of a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveClaim {
    pub work_item: WorkItemRef,
    pub assignee: AgentId,
    pub session_id: SessionId,
    pub claimed_at_ms: u64,
    pub expires_at_ms: u64,
}

impl ActiveClaim {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at_ms <= now_ms
    }

    /// Whether the claim is inside `window` of expiring (or already
    /// expired) and should be renewed by its holder.
    pub fn needs_renewal(&self, now_ms: u64, window: Duration) -> bool {
        let window_ms = window.as_millis() as u64;
        self.expires_at_ms.saturating_sub(window_ms) <= now_ms
    }
}

/// Claim-manager tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimConfig {
    /// Lifetime of a claim when `try_claim` carries no timeout.
    #[serde(default = "default_claim_timeout_ms")]
    pub default_claim_timeout_ms: u64,
    #[serde(default = "default_max_per_agent")]
    pub max_concurrent_claims_per_agent: usize,
    #[serde(default = "default_max_per_session")]
    pub max_concurrent_claims_per_session: usize,
    /// How close to expiry a claim is flagged for renewal.
    #[serde(default = "default_renewal_window_ms")]
    pub renewal_window_ms: u64,
    /// Whether the orchestrator sweeps expired claims in the background.
    #[serde(default = "default_auto_release")]
    pub auto_release_on_inactivity: bool,
}

fn default_claim_timeout_ms() -> u64 {
    2 * 60 * 60 * 1000
}

fn default_max_per_agent() -> usize {
    3
}

fn default_max_per_session() -> usize {
    5
}

fn default_renewal_window_ms() -> u64 {
    30 * 60 * 1000
}

fn default_auto_release() -> bool {
    true
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            default_claim_timeout_ms: default_claim_timeout_ms(),
            max_concurrent_claims_per_agent: default_max_per_agent(),
            max_concurrent_claims_per_session: default_max_per_session(),
            renewal_window_ms: default_renewal_window_ms(),
            auto_release_on_inactivity: default_auto_release(),
        }
    }
}

impl ClaimConfig {
    pub fn default_claim_timeout(&self) -> Duration {
        Duration::from_millis(self.default_claim_timeout_ms)
    }

    pub fn renewal_window(&self) -> Duration {
        Duration::from_millis(self.renewal_window_ms)
    }
}

#[cfg(test)]
#[path = "claim_tests.rs"]
mod tests;
